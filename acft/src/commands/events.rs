//! Events command - tails the append-only event log

use std::fs::{self, OpenOptions};
use std::io;

use anyhow::{Context, Result};

use crate::config::AcftContext;
use crate::events::tail::{parse_since, tail, TailFilter};

/// Print matching events; with `follow`, keep polling for new lines.
pub fn tail_events(
    ctx: &AcftContext,
    since: Option<&str>,
    types: Option<&str>,
    follow: bool,
) -> Result<bool> {
    let log_path = ctx.event_log_path()?;
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open {}", log_path.display()))?;

    let mut filter = TailFilter::default();
    if let Some(raw) = types {
        filter = filter.with_types(raw);
    }
    if let Some(raw) = since {
        filter = filter.with_since(parse_since(raw, ctx.now())?);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    tail(&log_path, &filter, follow, &mut out)?;
    Ok(true)
}
