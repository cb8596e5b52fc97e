//! Helpers shared across command implementations.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::events::{Event, EventEmitter, EventType};

/// Append an event to the log and echo its JSON line on stdout.
pub fn emit_event(
    emitter: &EventEmitter<'_>,
    event_type: EventType,
    checkpoint: Option<&Path>,
    payload: impl Serialize,
) -> Result<Event> {
    let event = emitter.emit(event_type, checkpoint, payload)?;
    println!("{}", event.to_json_line()?);
    Ok(event)
}

/// Pretty-print `value` as JSON with keys sorted at every level.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    let value = serde_json::to_value(value).context("Failed to serialize JSON output")?;
    let rendered =
        serde_json::to_string_pretty(&value).context("Failed to serialize JSON output")?;
    println!("{rendered}");
    Ok(())
}

/// Split repeatable, comma separated flag values into trimmed items.
pub fn split_list<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.as_ref().split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
