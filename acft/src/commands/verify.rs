//! Verify command - runs the harness commands documented in MANIFEST

use anyhow::{bail, Result};
use colored::Colorize;
use serde_json::json;

use super::common::emit_event;
use crate::config::AcftContext;
use crate::events::{EventEmitter, EventType};
use crate::fs::load_checkpoint;
use crate::harness::{read_manifest_commands, run_harness};
use crate::utils::truncate;

const STDERR_PREVIEW_CHARS: usize = 400;

/// Run the harness; `dry_run` only lists the commands.
pub fn execute(
    ctx: &AcftContext,
    path: Option<&str>,
    section: Option<&str>,
    dry_run: bool,
    record: bool,
) -> Result<bool> {
    let checkpoint = load_checkpoint(ctx, path)?;
    let commands: Vec<String> =
        read_manifest_commands(checkpoint.document.section("MANIFEST"), section)
            .into_iter()
            .map(|c| c.command)
            .collect();
    if commands.is_empty() {
        bail!("No harness commands found in MANIFEST.");
    }

    println!("Running harness for {}:", ctx.to_rooted(&checkpoint.dir));
    for command in &commands {
        println!("  $ {command}");
    }
    if dry_run {
        return Ok(true);
    }

    let report = run_harness(ctx, &checkpoint, &commands)?;
    for result in &report.results {
        if result.success {
            println!("{} {}", "✓".green().bold(), result.summary());
        } else {
            println!("{} {}", "✗".red().bold(), result.summary());
            let stderr = result.stderr.trim();
            if !stderr.is_empty() {
                println!("  {}", truncate(stderr, STDERR_PREVIEW_CHARS).dimmed());
            }
        }
    }

    let verdict = if report.passed() { "passed" } else { "failed" };
    println!("Harness {verdict} (log: {})", report.log_path.display());

    if record {
        let emitter = EventEmitter::new(ctx)?;
        emit_event(
            &emitter,
            EventType::HarnessExecuted,
            Some(&checkpoint.dir),
            json!({
                "STATUS": report.status(),
                "COMMANDS": report.records(),
                "LOG_PATH": ctx.to_rooted(&report.log_path),
            }),
        )?;
    }

    Ok(report.passed())
}
