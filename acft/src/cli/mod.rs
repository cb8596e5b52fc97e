//! Command-line definitions and dispatch for the `acft` binary.

pub mod dispatch;
pub mod types;
