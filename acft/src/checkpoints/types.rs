//! Value types shared by the checkpoint document model.
//!
//! A checkpoint directory is named `{branch}_v{version}_{step}` and carries a
//! `CHECKPOINT.md` whose frontmatter records `VALID`, `LIFECYCLE` and `SIGNAL`.

use std::cmp::Ordering;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

static CHECKPOINT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<branch>[a-z0-9_]+)_v(?P<version>\d+)_(?P<step>\d{2})$")
        .expect("Invalid regex pattern")
});

/// Lifecycle of a checkpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// Work in progress, or the current head of a branch
    Active,
    /// Replaced by a later checkpoint
    Superseded,
    /// Retained for history only
    Archived,
}

impl Lifecycle {
    pub const ALL: [Lifecycle; 3] = [Self::Active, Self::Superseded, Self::Archived];

    pub fn as_str(self) -> &'static str {
        match self {
            Lifecycle::Active => "active",
            Lifecycle::Superseded => "superseded",
            Lifecycle::Archived => "archived",
        }
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Lifecycle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Lifecycle::Active),
            "superseded" => Ok(Lifecycle::Superseded),
            "archived" => Ok(Lifecycle::Archived),
            _ => anyhow::bail!(
                "Invalid lifecycle: {s}. Valid values: active, superseded, archived"
            ),
        }
    }
}

/// Latest harness verdict
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Pass,
    Fail,
    Blocked,
    Pending,
}

impl Signal {
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Pass => "pass",
            Signal::Fail => "fail",
            Signal::Blocked => "blocked",
            Signal::Pending => "pending",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Signal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(Signal::Pass),
            "fail" => Ok(Signal::Fail),
            "blocked" => Ok(Signal::Blocked),
            "pending" => Ok(Signal::Pending),
            _ => anyhow::bail!("Invalid signal: {s}. Valid values: pass, fail, blocked, pending"),
        }
    }
}

/// Parsed `{branch}_v{version}_{step}` directory name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckpointName {
    pub branch: String,
    pub version: u64,
    pub step: u8,
}

impl CheckpointName {
    /// Returns `None` when the name does not follow the convention.
    pub fn parse(name: &str) -> Option<Self> {
        let caps = CHECKPOINT_NAME_RE.captures(name)?;
        Some(Self {
            branch: caps["branch"].to_string(),
            version: caps["version"].parse().ok()?,
            step: caps["step"].parse().ok()?,
        })
    }

    /// Same branch and version.
    pub fn same_line(&self, other: &CheckpointName) -> bool {
        self.branch == other.branch && self.version == other.version
    }

    /// Position along the branch, or `None` across different branches.
    pub fn compare_on_branch(&self, other: &CheckpointName) -> Option<Ordering> {
        if self.branch != other.branch {
            return None;
        }
        Some((self.version, self.step).cmp(&(other.version, other.step)))
    }
}

impl std::fmt::Display for CheckpointName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_v{}_{:02}", self.branch, self.version, self.step)
    }
}

/// One `Name -> Path -> Purpose` line of the MANIFEST LEDGER
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub name: String,
    pub path: String,
    pub purpose: String,
}

/// Prefix every ledger path must carry before a checkpoint can close.
pub const ARTIFACTS_PREFIX: &str = "::THIS/ARTIFACTS/";

impl LedgerEntry {
    pub fn is_rooted_artifact(&self) -> bool {
        self.path.starts_with(ARTIFACTS_PREFIX)
    }
}

/// One `- <timestamp> - <message>` line of the LOG section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Present only when the raw token is an ISO-8601 timestamp
    pub timestamp: Option<DateTime<Utc>>,
    pub raw_timestamp: String,
    pub message: String,
}
