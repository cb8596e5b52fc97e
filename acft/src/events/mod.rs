//! Append-only event log
//!
//! Every state change appends one JSON object per line to
//! `<work root>/checkpoints_events.log`. Keys are sorted at every level so
//! lines are stable and diffable.

pub mod tail;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::AcftContext;
use crate::error::{AcftError, Result};

/// Event types emitted by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    CheckpointCreated,
    CheckpointVerified,
    CheckpointClosed,
    LogAppended,
    ManifestUpdated,
    HarnessExecuted,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::CheckpointCreated => "CHECKPOINT_CREATED",
            EventType::CheckpointVerified => "CHECKPOINT_VERIFIED",
            EventType::CheckpointClosed => "CHECKPOINT_CLOSED",
            EventType::LogAppended => "LOG_APPENDED",
            EventType::ManifestUpdated => "MANIFEST_UPDATED",
            EventType::HarnessExecuted => "HARNESS_EXECUTED",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable event record. Field order matches the sorted key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "ACTOR")]
    pub actor: String,
    #[serde(
        rename = "CHECKPOINT_PATH",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub checkpoint_path: Option<String>,
    #[serde(rename = "PAYLOAD", default)]
    pub payload: Value,
    #[serde(rename = "TIMESTAMP")]
    pub timestamp: String,
    #[serde(rename = "TYPE")]
    pub event_type: String,
}

impl Event {
    /// Compact single-line JSON.
    pub fn to_json_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| AcftError::tool(format!("Failed to serialize event: {e}")))
    }
}

/// Writes events for one context.
pub struct EventEmitter<'a> {
    ctx: &'a AcftContext,
    log_path: PathBuf,
}

impl<'a> EventEmitter<'a> {
    pub fn new(ctx: &'a AcftContext) -> Result<Self> {
        ctx.require_work("initialize event emitter")?;
        let log_path = ctx.event_log_path()?;
        Ok(Self { ctx, log_path })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Build, append and return an event.
    ///
    /// `payload` objects are re-keyed through `serde_json::Value`, so nested
    /// keys come out sorted.
    pub fn emit(
        &self,
        event_type: EventType,
        checkpoint: Option<&Path>,
        payload: impl Serialize,
    ) -> Result<Event> {
        let payload = serde_json::to_value(payload)
            .map_err(|e| AcftError::tool(format!("Failed to serialize event payload: {e}")))?;
        let payload = match payload {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        let event = Event {
            actor: self.ctx.actor.clone(),
            checkpoint_path: checkpoint.map(|dir| self.ctx.to_rooted(dir)),
            payload,
            timestamp: self.ctx.timestamp(),
            event_type: event_type.as_str().to_string(),
        };

        let mut line = event.to_json_line()?;
        line.push('\n');
        self.append(&line)?;

        debug!(event = %event_type, path = %self.log_path.display(), "emitted event");
        Ok(event)
    }

    fn append(&self, line: &str) -> Result<()> {
        let append_error = |e: std::io::Error| {
            AcftError::tool(format!(
                "Failed to append event log at {}: {e}",
                self.log_path.display()
            ))
        };

        if let Some(parent) = self.log_path.parent() {
            fs::create_dir_all(parent).map_err(append_error)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(append_error)?;
        file.write_all(line.as_bytes()).map_err(append_error)
    }
}
