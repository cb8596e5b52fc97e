//! The `CHECKPOINT.md` document model.
//!
//! A document is an ordered frontmatter mapping plus ordered top-level
//! sections. Every mutation goes through the model and the whole file is
//! re-rendered from it, so a rendered document parses back to itself.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::types::{CheckpointName, LedgerEntry, Lifecycle, LogEntry};
use crate::error::{AcftError, Result};
use crate::parser::{Frontmatter, FrontmatterValue, Sections};
use crate::paths::CHECKPOINT_FILE;

/// Sections every checkpoint must open with, in this order.
pub const REQUIRED_SECTIONS: [&str; 5] = ["STATUS", "HARNESS", "CONTEXT", "MANIFEST", "LOG"];

static LOG_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- ([^ ]+) - (.*)$").expect("Invalid regex pattern"));
static ISO_TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2})$")
        .expect("Invalid regex pattern")
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckpointDocument {
    pub frontmatter: Frontmatter,
    pub sections: Sections,
}

impl CheckpointDocument {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim_start_matches('\u{feff}');
        if !text.starts_with("---") {
            return Err(AcftError::format(format!(
                "{CHECKPOINT_FILE} missing YAML frontmatter delimiter"
            )));
        }
        let closing = text[3..]
            .find("\n---")
            .map(|offset| offset + 3)
            .ok_or_else(|| {
                AcftError::format(format!("{CHECKPOINT_FILE} missing closing YAML delimiter"))
            })?;

        let frontmatter = Frontmatter::parse(&text[3..closing])?;
        let body = text[closing + 4..].trim_start_matches('\n');

        Ok(Self {
            frontmatter,
            sections: Sections::parse(body),
        })
    }

    pub fn render(&self) -> String {
        let mut out = String::from("---\n");
        out.push_str(&self.frontmatter.encode());
        out.push_str("\n---\n\n");
        for section in self.sections.iter() {
            out.push_str("# ");
            out.push_str(&section.title);
            out.push('\n');
            let body = section.content.trim();
            if !body.is_empty() {
                out.push_str(body);
                out.push('\n');
            }
            out.push('\n');
        }
        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out.push('\n');
        out
    }

    /// `VALID` under loose truthiness; absent counts as false.
    pub fn valid(&self) -> bool {
        self.frontmatter
            .get("VALID")
            .is_some_and(FrontmatterValue::is_truthy)
    }

    pub fn lifecycle(&self) -> Option<Lifecycle> {
        self.frontmatter.get_str("LIFECYCLE")?.parse().ok()
    }

    pub fn is_active(&self) -> bool {
        self.frontmatter.get_str("LIFECYCLE") == Some("active")
    }

    pub fn signal(&self) -> Option<&str> {
        self.frontmatter.get_str("SIGNAL")
    }

    pub fn delegate_of(&self) -> Option<&str> {
        self.frontmatter.get_str("DELEGATE_OF")
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<FrontmatterValue>) {
        self.frontmatter.set(key, value);
    }

    pub fn remove_field(&mut self, key: &str) -> Option<FrontmatterValue> {
        self.frontmatter.remove(key)
    }

    /// Body of a section, empty when absent.
    pub fn section(&self, name: &str) -> &str {
        self.sections.text(name)
    }

    /// Replace a section body wholesale. Unknown sections append to the end.
    pub fn set_section(&mut self, name: &str, body: &str) {
        self.sections.set(name.trim(), body.trim());
    }

    /// Append `- <timestamp> - <message>` to LOG, creating LOG if needed.
    ///
    /// Line breaks inside `message` are folded to single spaces.
    pub fn append_log_entry(&mut self, timestamp: &str, message: &str) {
        let message = message
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let entry = format!("- {timestamp} - {message}");
        let entry = entry.trim_end();

        let existing = self.section("LOG").trim_end();
        let log = if existing.is_empty() {
            entry.to_string()
        } else {
            format!("{existing}\n{entry}")
        };
        self.set_section("LOG", &log);
    }

    /// Entries of the `## MANIFEST LEDGER` block; empty when absent.
    pub fn manifest_ledger(&self) -> Vec<LedgerEntry> {
        let mut entries = Vec::new();
        let mut inside = false;

        for line in self.section("MANIFEST").lines() {
            if line.trim().to_uppercase().starts_with("## MANIFEST LEDGER") {
                inside = true;
                continue;
            }
            if !inside {
                continue;
            }
            if line.starts_with("## ") {
                break;
            }

            let stripped = line.trim();
            if stripped.is_empty() || stripped.starts_with('>') {
                continue;
            }
            let stripped = stripped.strip_prefix("- ").map_or(stripped, str::trim);
            let parts: Vec<&str> = stripped.split("->").map(str::trim).collect();
            if parts.len() >= 2 {
                entries.push(LedgerEntry {
                    name: parts[0].to_string(),
                    path: parts[1].to_string(),
                    purpose: parts[2..].join(" -> "),
                });
            }
        }

        entries
    }

    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.section("LOG")
            .lines()
            .map(str::trim)
            .filter_map(|line| LOG_LINE_RE.captures(line))
            .map(|caps| {
                let raw_timestamp = caps[1].to_string();
                let timestamp = parse_log_timestamp(&raw_timestamp);
                LogEntry {
                    timestamp,
                    raw_timestamp,
                    message: caps[2].trim().to_string(),
                }
            })
            .collect()
    }

    /// First sentence of STATUS (text before the first `.`).
    pub fn status_headline(&self) -> String {
        self.section("STATUS")
            .split('.')
            .next()
            .unwrap_or("")
            .trim()
            .to_string()
    }

    /// Check the closure contract for the requested `VALID` and lifecycle.
    pub fn ensure_closable(&self, valid: bool, lifecycle: Lifecycle) -> Result<()> {
        if !valid {
            return Ok(());
        }
        if lifecycle != Lifecycle::Active {
            return Err(AcftError::precondition(
                "Cannot set VALID: true when LIFECYCLE is not active.",
            ));
        }
        let ledger = self.manifest_ledger();
        if ledger.is_empty() {
            return Err(AcftError::precondition(
                "Cannot set VALID: true without MANIFEST LEDGER entries.",
            ));
        }
        if !ledger.iter().all(LedgerEntry::is_rooted_artifact) {
            return Err(AcftError::precondition(
                "All MANIFEST LEDGER entries must use ::THIS/ARTIFACTS paths before closure.",
            ));
        }
        Ok(())
    }
}

fn parse_log_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if !ISO_TIMESTAMP_RE.is_match(raw) {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// A loaded checkpoint: its directory, parsed document and raw text.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub dir: PathBuf,
    pub document: CheckpointDocument,
    pub source: String,
}

impl Checkpoint {
    /// Directory name, e.g. `auth_v1_01`.
    pub fn name(&self) -> &str {
        self.dir
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("")
    }

    pub fn parsed_name(&self) -> Option<CheckpointName> {
        CheckpointName::parse(self.name())
    }

    pub fn file_path(&self) -> PathBuf {
        self.dir.join(CHECKPOINT_FILE)
    }

    /// True when `dir` names this checkpoint's directory, however it is spelled.
    pub fn is_at(&self, dir: &Path) -> bool {
        self.dir == dir || crate::paths::same_location(&self.dir, dir)
    }
}
