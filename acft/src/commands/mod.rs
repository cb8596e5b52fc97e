//! CLI command implementations.
//!
//! Every `execute` returns `Ok(true)` on success and `Ok(false)` when a
//! report command completed but found failures; `main` maps that to exit 1.

pub mod close;
pub mod common;
pub mod events;
pub mod expand;
pub mod init;
pub mod log;
pub mod manifest;
pub mod new;
pub mod orient;
pub mod validate;
pub mod verify;
