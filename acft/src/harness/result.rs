//! Result types for harness execution

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Result of executing a single harness command
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub command: String,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub duration: Duration,
    /// Whether the command was terminated due to timeout
    pub timed_out: bool,
}

impl CommandResult {
    /// Exit code as recorded in logs and events; killed processes report `-1`.
    pub fn recorded_exit_code(&self) -> i32 {
        self.exit_code.unwrap_or(-1)
    }

    /// Get a summary of the result
    pub fn summary(&self) -> String {
        let status = if self.timed_out {
            "TIMEOUT"
        } else if self.success {
            "PASSED"
        } else {
            "FAILED"
        };
        format!(
            "{} - {} ({}ms, exit code: {})",
            status,
            self.command,
            self.duration.as_millis(),
            self.recorded_exit_code()
        )
    }
}

/// `{command, exit_code}` pair recorded on `HARNESS_EXECUTED`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionRecord {
    pub command: String,
    pub exit_code: i32,
}

impl From<&CommandResult> for ExecutionRecord {
    fn from(result: &CommandResult) -> Self {
        Self {
            command: result.command.clone(),
            exit_code: result.recorded_exit_code(),
        }
    }
}

/// Outcome of one harness run
#[derive(Debug, Clone)]
pub struct HarnessReport {
    pub results: Vec<CommandResult>,
    pub log_path: PathBuf,
}

impl HarnessReport {
    /// True when every executed command succeeded.
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }

    pub fn status(&self) -> &'static str {
        if self.passed() {
            "pass"
        } else {
            "fail"
        }
    }

    pub fn records(&self) -> Vec<ExecutionRecord> {
        self.results.iter().map(ExecutionRecord::from).collect()
    }
}
