//! Log command - appends a LOG entry to a checkpoint

use anyhow::{bail, Result};

use super::common::emit_event;
use crate::config::AcftContext;
use crate::events::{EventEmitter, EventType};
use crate::fs::{load_checkpoint, write_checkpoint};

pub fn execute(ctx: &AcftContext, message: &str, path: Option<&str>) -> Result<bool> {
    if message.trim().is_empty() {
        bail!("Log message cannot be empty");
    }
    let mut checkpoint = load_checkpoint(ctx, path)?;
    let emitter = EventEmitter::new(ctx)?;

    checkpoint
        .document
        .append_log_entry(&ctx.timestamp(), message);
    write_checkpoint(&mut checkpoint)?;

    emit_event(
        &emitter,
        EventType::LogAppended,
        Some(&checkpoint.dir),
        serde_json::json!({ "MESSAGE": message }),
    )?;
    Ok(true)
}
