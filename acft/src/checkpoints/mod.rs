//! Checkpoint document model
//!
//! This module provides:
//! - Naming, lifecycle and signal types
//! - The `CHECKPOINT.md` document (parse, mutate, render, derived views)
//! - The scaffold used by `acft new`

mod document;
mod template;
mod types;

pub use document::{Checkpoint, CheckpointDocument, REQUIRED_SECTIONS};
pub use template::scaffold;
pub use types::{
    CheckpointName, LedgerEntry, Lifecycle, LogEntry, Signal, ARTIFACTS_PREFIX,
};
