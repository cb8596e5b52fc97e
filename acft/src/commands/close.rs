//! Close command - records a VALID verdict on a checkpoint

use anyhow::{bail, Result};
use colored::Colorize;
use serde_json::json;

use super::common::emit_event;
use crate::checkpoints::{Checkpoint, Lifecycle, Signal};
use crate::config::AcftContext;
use crate::events::{EventEmitter, EventType};
use crate::fs::{load_checkpoint, write_checkpoint};
use crate::paths::RootedPrefix;

/// Set `VALID`, `SIGNAL` and `LIFECYCLE`, append a LOG entry and emit
/// `CHECKPOINT_VERIFIED` (plus `CHECKPOINT_CLOSED` when `valid`).
pub fn execute(
    ctx: &AcftContext,
    path: Option<&str>,
    valid: bool,
    signal: Option<Signal>,
    lifecycle: Option<Lifecycle>,
    message: Option<&str>,
) -> Result<bool> {
    let mut checkpoint = load_checkpoint(ctx, path)?;
    let emitter = EventEmitter::new(ctx)?;

    let lifecycle = match lifecycle {
        Some(lifecycle) => lifecycle,
        None => match checkpoint.document.frontmatter.get_str("LIFECYCLE") {
            Some(raw) => match raw.parse::<Lifecycle>() {
                Ok(lifecycle) => lifecycle,
                Err(_) => bail!("LIFECYCLE must be active, superseded, or archived."),
            },
            None => Lifecycle::Active,
        },
    };
    checkpoint.document.ensure_closable(valid, lifecycle)?;

    let signal = match signal {
        Some(signal) => signal.as_str().to_string(),
        None => checkpoint
            .document
            .signal()
            .unwrap_or(Signal::Pending.as_str())
            .to_string(),
    };

    let document = &mut checkpoint.document;
    document.set_field("VALID", valid);
    document.set_field("LIFECYCLE", lifecycle.as_str());
    document.set_field("SIGNAL", signal.as_str());

    let message = match message.map(str::trim).filter(|m| !m.is_empty()) {
        Some(message) => message.to_string(),
        None => format!("Status updated to VALID: {valid} (SIGNAL={signal})"),
    };
    document.append_log_entry(&ctx.timestamp(), &message);
    write_checkpoint(&mut checkpoint)?;

    let payload = json!({
        "VALID": valid,
        "SIGNAL": signal,
        "MESSAGE": message,
        "LIFECYCLE": lifecycle.as_str(),
    });
    emit_event(
        &emitter,
        EventType::CheckpointVerified,
        Some(&checkpoint.dir),
        &payload,
    )?;
    if valid {
        emit_event(
            &emitter,
            EventType::CheckpointClosed,
            Some(&checkpoint.dir),
            &payload,
        )?;
    }

    println!(
        "Updated {} -> VALID={valid}, SIGNAL={signal}, LIFECYCLE={lifecycle}",
        ctx.to_rooted(&checkpoint.dir)
    );

    if valid {
        for missing in missing_artifacts(&checkpoint) {
            eprintln!(
                "{} Ledger artifact not found on disk: {missing}",
                "⚠".yellow().bold()
            );
        }
    }
    Ok(true)
}

/// Ledger paths under `::THIS` that do not exist inside the checkpoint.
fn missing_artifacts(checkpoint: &Checkpoint) -> Vec<String> {
    checkpoint
        .document
        .manifest_ledger()
        .into_iter()
        .filter_map(|entry| match RootedPrefix::split(&entry.path) {
            Some((RootedPrefix::This, relative)) => {
                let relative = relative.trim_start_matches('/');
                (!checkpoint.dir.join(relative).exists()).then_some(entry.path)
            }
            _ => None,
        })
        .collect()
}
