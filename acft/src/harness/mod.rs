//! Harness commands documented in a checkpoint's MANIFEST.
//!
//! Commands come from fenced `sh`/`shell`/`bash` blocks and from bullet items
//! wrapped in backticks, each tagged with the nearest heading above it.

pub mod executor;
pub mod result;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::checkpoints::Checkpoint;
use crate::config::AcftContext;
use crate::error::{AcftError, Result};

pub use executor::run_command;
pub use result::{CommandResult, ExecutionRecord, HarnessReport};

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#+)\s+(.*)").expect("Invalid regex pattern"));

const SHELL_FENCES: [&str; 3] = ["sh", "shell", "bash"];

/// A command and the (uppercased) heading it was found under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessCommand {
    pub section: String,
    pub command: String,
}

/// Whether a heading is selected by a `--section` filter.
pub fn heading_matches(heading: &str, filter: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(filter) => {
            heading == filter.to_uppercase()
                || heading.to_lowercase().contains(&filter.to_lowercase())
        }
    }
}

/// Extract harness commands from MANIFEST text.
///
/// Headings are recognised before fences, so a `# comment` line inside a
/// fence starts a new heading and closes the fence.
pub fn read_manifest_commands(manifest: &str, filter: Option<&str>) -> Vec<HarnessCommand> {
    let mut commands = Vec::new();
    let mut heading = "MANIFEST".to_string();
    let mut include = filter.is_none();
    let mut fence: Option<String> = None;
    let mut buffer: Vec<&str> = Vec::new();

    for line in manifest.lines() {
        let stripped = line.trim();

        if let Some(caps) = HEADING_RE.captures(stripped) {
            if fence.as_deref().is_some_and(is_shell_fence) {
                flush(&heading, &mut buffer, &mut commands);
            }
            buffer.clear();
            heading = caps[2].trim().to_uppercase();
            include = heading_matches(&heading, filter);
            fence = None;
            continue;
        }

        if stripped.starts_with("```") {
            match fence.take() {
                None => {
                    fence = Some(stripped.trim_start_matches('`').to_lowercase());
                    buffer.clear();
                }
                Some(lang) => {
                    if include && is_shell_fence(&lang) {
                        flush(&heading, &mut buffer, &mut commands);
                    }
                    buffer.clear();
                }
            }
            continue;
        }

        if fence.is_some() {
            if include {
                buffer.push(line);
            }
            continue;
        }

        if include {
            if let Some(token) = stripped.strip_prefix("- ").map(str::trim) {
                if token.len() >= 2 && token.starts_with('`') && token.ends_with('`') {
                    commands.push(HarnessCommand {
                        section: heading.clone(),
                        command: token[1..token.len() - 1].to_string(),
                    });
                }
            }
        }
    }

    commands
}

fn is_shell_fence(lang: &str) -> bool {
    SHELL_FENCES.contains(&lang)
}

fn flush(heading: &str, buffer: &mut Vec<&str>, commands: &mut Vec<HarnessCommand>) {
    for line in buffer.drain(..) {
        let command = line.trim();
        if !command.is_empty() {
            commands.push(HarnessCommand {
                section: heading.to_string(),
                command: command.to_string(),
            });
        }
    }
}

/// Run `commands` sequentially for `checkpoint`, stopping at the first failure.
///
/// Output is written to `<harness logs>/<name>/harness_<UTC stamp>.log` and
/// `ACFT_PROJECT`, `ACFT_WORK` and `ACFT_THIS` are exported to each command.
pub fn run_harness(
    ctx: &AcftContext,
    checkpoint: &Checkpoint,
    commands: &[String],
) -> Result<HarnessReport> {
    let log_dir = ctx.harness_log_dir(checkpoint.name())?;
    fs::create_dir_all(&log_dir).map_err(|e| AcftError::io(&log_dir, e))?;
    let stamp = ctx.now().format("%Y%m%dT%H%M%SZ");
    let log_path = log_dir.join(format!("harness_{stamp}.log"));

    let env = harness_env(ctx, &checkpoint.dir);
    let timeout = ctx.harness_timeout();
    let mut log = File::create(&log_path).map_err(|e| AcftError::io(&log_path, e))?;
    let mut results = Vec::with_capacity(commands.len());

    for command in commands {
        debug!(command = %command, "running harness command");
        let result = run_command(command, &ctx.cwd, &env, timeout)?;

        let entry = format!(
            "$ {command}\n{}{}[exit {}]\n\n",
            result.stdout,
            result.stderr,
            result.recorded_exit_code()
        );
        log.write_all(entry.as_bytes())
            .map_err(|e| AcftError::io(&log_path, e))?;

        let success = result.success;
        results.push(result);
        if !success {
            break;
        }
    }

    Ok(HarnessReport { results, log_path })
}

fn harness_env(ctx: &AcftContext, checkpoint_dir: &Path) -> Vec<(&'static str, PathBuf)> {
    let mut env = Vec::new();
    if let Some(project) = &ctx.roots.project {
        env.push(("ACFT_PROJECT", project.clone()));
    }
    if let Some(work) = &ctx.roots.work {
        env.push(("ACFT_WORK", work.clone()));
    }
    env.push(("ACFT_THIS", checkpoint_dir.to_path_buf()));
    env
}
