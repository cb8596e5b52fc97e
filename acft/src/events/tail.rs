//! Reading and following the event log.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::error::{AcftError, Result};

/// Poll interval while following.
pub const FOLLOW_INTERVAL: Duration = Duration::from_millis(500);

/// Convert `-10m` style tokens to a duration. Units: `s`, `m`, `h`, `d`.
pub fn relative_duration(value: &str) -> Result<chrono::Duration> {
    let shape_error =
        || AcftError::tool("Relative durations must look like -10m / -2h / -1d".to_string());

    let Some(body) = value.strip_prefix('-') else {
        return Err(shape_error());
    };
    let Some((split, _)) = body.char_indices().last() else {
        return Err(shape_error());
    };
    if split == 0 {
        return Err(shape_error());
    }
    let (amount, unit) = body.split_at(split);
    let amount: i64 = amount.parse().map_err(|_| shape_error())?;
    let seconds = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86_400,
        other => {
            return Err(AcftError::tool(format!(
                "Unsupported duration unit '{other}'"
            )))
        }
    };
    amount
        .checked_mul(seconds)
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(shape_error)
}

/// Parse an ISO-8601 timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Resolve a `--since` argument against `now`.
pub fn parse_since(value: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let parsed = if value.starts_with('-') {
        relative_duration(value).and_then(|delta| {
            now.checked_sub_signed(delta).ok_or_else(|| {
                AcftError::tool(format!("Relative duration out of range: {value}"))
            })
        })
    } else {
        parse_timestamp(value)
            .ok_or_else(|| AcftError::tool(format!("Invalid isoformat string: '{value}'")))
    };
    parsed.map_err(|e| AcftError::tool(format!("Invalid --since value: {e}")))
}

/// Which events `events tail` prints.
#[derive(Debug, Clone, Default)]
pub struct TailFilter {
    pub since: Option<DateTime<Utc>>,
    pub types: Option<BTreeSet<String>>,
}

impl TailFilter {
    /// Build the type filter from comma-separated values.
    pub fn with_types(mut self, raw: &str) -> Self {
        let types: BTreeSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        self.types = (!types.is_empty()).then_some(types);
        self
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn matches(&self, event: &Value) -> bool {
        if let Some(types) = &self.types {
            let event_type = event.get("TYPE").and_then(Value::as_str).unwrap_or("");
            if !types.contains(event_type) {
                return false;
            }
        }
        if let Some(since) = self.since {
            let timestamp = event
                .get("TIMESTAMP")
                .and_then(Value::as_str)
                .and_then(parse_timestamp);
            match timestamp {
                Some(ts) if ts >= since => {}
                _ => return false,
            }
        }
        true
    }
}

/// Print matching events from `path` to `out`, one JSON object per line.
///
/// Undecodable lines are skipped. With `follow`, keeps polling for new
/// lines and never returns unless an I/O error occurs.
pub fn tail(path: &Path, filter: &TailFilter, follow: bool, out: &mut impl Write) -> Result<()> {
    let file = File::open(path).map_err(|e| AcftError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut line = String::new();

    loop {
        let read = reader
            .read_line(&mut line)
            .map_err(|e| AcftError::io(path, e))?;

        let complete = line.ends_with('\n');
        if read == 0 || !complete {
            if follow {
                thread::sleep(FOLLOW_INTERVAL);
                continue;
            }
            if line.is_empty() {
                return Ok(());
            }
        }

        emit_line(line.trim(), filter, out).map_err(|e| AcftError::io(path, e))?;
        line.clear();
    }
}

fn emit_line(line: &str, filter: &TailFilter, out: &mut impl Write) -> std::io::Result<()> {
    if line.is_empty() {
        return Ok(());
    }
    let Ok(event) = serde_json::from_str::<Value>(line) else {
        return Ok(());
    };
    if filter.matches(&event) {
        writeln!(out, "{event}")?;
        out.flush()?;
    }
    Ok(())
}
