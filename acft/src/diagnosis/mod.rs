//! Failure catalogue sweep.
//!
//! Each entry of the catalogue pairs a failure key with a pure detector. A
//! sweep runs every detector over the target checkpoint (`quick`) or over
//! every checkpoint under the work root (`full`) and collects the findings.

mod detectors;

use serde::Serialize;
use tracing::debug;

use crate::checkpoints::Checkpoint;
use crate::config::AcftContext;

/// Inspects one checkpoint against its universe and returns a detail string
/// when the failure is present.
pub type Detector = fn(&Checkpoint, &AcftContext, &[Checkpoint]) -> Option<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the failure catalogue
#[derive(Clone, Copy)]
pub struct FailureCheck {
    pub key: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub detector: Detector,
}

impl std::fmt::Debug for FailureCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureCheck")
            .field("key", &self.key)
            .field("severity", &self.severity)
            .finish()
    }
}

/// The full catalogue, in reporting order.
pub fn failure_checks() -> Vec<FailureCheck> {
    use detectors::*;

    vec![
        FailureCheck {
            key: "missing_harness",
            description: "MANIFEST lacks documented harness commands or LOG evidence.",
            severity: Severity::Error,
            detector: missing_harness,
        },
        FailureCheck {
            key: "stale_contract",
            description: "STATUS/HARNESS still contain TODOs while frontmatter reports VALID: true.",
            severity: Severity::Warning,
            detector: stale_contract,
        },
        FailureCheck {
            key: "missing_manifest_ledger",
            description:
                "VALID: true without a populated MANIFEST LEDGER using ::THIS/ARTIFACTS paths.",
            severity: Severity::Error,
            detector: missing_manifest_ledger,
        },
        FailureCheck {
            key: "unrooted_references",
            description: "Detected bare or relative paths inside CHECKPOINT.md.",
            severity: Severity::Warning,
            detector: unrooted_references,
        },
        FailureCheck {
            key: "relative_path_bleed",
            description: "Detected relative path bleed (../) to sibling checkpoints.",
            severity: Severity::Warning,
            detector: relative_path_bleed,
        },
        FailureCheck {
            key: "timeline_gaps",
            description: "LOG missing entries or lacks orientation note.",
            severity: Severity::Warning,
            detector: timeline_gaps,
        },
        FailureCheck {
            key: "orphaned_successors",
            description: "DELEGATE_OF references missing or successors not cross-linked.",
            severity: Severity::Error,
            detector: orphaned_successors,
        },
        FailureCheck {
            key: "version_drift",
            description: "Multiple active checkpoints share the same branch+version.",
            severity: Severity::Error,
            detector: version_drift,
        },
        FailureCheck {
            key: "scope_shock",
            description: "Scope change detected without cited directive.",
            severity: Severity::Warning,
            detector: scope_shock,
        },
        FailureCheck {
            key: "history_drift",
            description: "STATUS lacks a context recap for successors.",
            severity: Severity::Warning,
            detector: history_drift,
        },
        FailureCheck {
            key: "dependency_fog",
            description: "Dependencies section missing statuses or rooted links.",
            severity: Severity::Warning,
            detector: dependency_fog,
        },
        FailureCheck {
            key: "goal_fog",
            description: "Missing explicit success or exit criteria.",
            severity: Severity::Warning,
            detector: goal_fog,
        },
        FailureCheck {
            key: "validation_theater",
            description: "VALID: true without concrete harness execution evidence.",
            severity: Severity::Error,
            detector: validation_theater,
        },
    ]
}

/// A detector finding for one checkpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub checkpoint: String,
    pub failure: String,
    pub severity: Severity,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SweepMode {
    /// Only the target checkpoint
    #[default]
    Quick,
    /// Every checkpoint under the work root
    Full,
}

impl SweepMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SweepMode::Quick => "quick",
            SweepMode::Full => "full",
        }
    }
}

impl std::fmt::Display for SweepMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub issues: Vec<Issue>,
    pub mode: SweepMode,
    pub count: usize,
}

impl SweepReport {
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }

    /// Highest severity among the issues; `info` when there are none.
    pub fn severity(&self) -> Severity {
        self.issues
            .iter()
            .map(|issue| issue.severity)
            .max()
            .unwrap_or(Severity::Info)
    }
}

/// Run the catalogue over `target` (quick) or over all of `universe` (full).
pub fn sweep(
    ctx: &AcftContext,
    target: &Checkpoint,
    universe: &[Checkpoint],
    mode: SweepMode,
) -> SweepReport {
    let checks = failure_checks();
    let scope: Vec<&Checkpoint> = match mode {
        SweepMode::Quick => vec![target],
        SweepMode::Full => universe.iter().collect(),
    };

    let mut issues = Vec::new();
    for checkpoint in scope {
        let rooted = ctx.to_rooted(&checkpoint.dir);
        for check in &checks {
            if let Some(detail) = (check.detector)(checkpoint, ctx, universe) {
                debug!(checkpoint = %rooted, failure = check.key, "detector fired");
                issues.push(Issue {
                    checkpoint: rooted.clone(),
                    failure: check.key.to_string(),
                    severity: check.severity,
                    detail,
                });
            }
        }
    }

    let count = issues.len();
    SweepReport {
        issues,
        mode,
        count,
    }
}
