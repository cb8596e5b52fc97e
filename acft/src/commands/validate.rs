//! Validate command - structural lint of a checkpoint

use anyhow::Result;
use serde::Serialize;

use super::common::print_json;
use crate::config::AcftContext;
use crate::fs::load_checkpoint;
use crate::validation::{lint_checkpoint, LintReport};

#[derive(Serialize)]
struct ValidationOutput<'a> {
    checkpoint: String,
    #[serde(flatten)]
    report: &'a LintReport,
}

/// Lint the checkpoint; warnings only fail the run when `strict`.
pub fn execute(ctx: &AcftContext, path: Option<&str>, strict: bool, json: bool) -> Result<bool> {
    let checkpoint = load_checkpoint(ctx, path)?;
    let report = lint_checkpoint(&checkpoint);
    let rooted = ctx.to_rooted(&checkpoint.dir);

    if json {
        print_json(&ValidationOutput {
            checkpoint: rooted,
            report: &report,
        })?;
    } else {
        println!("Validation report for {rooted}:");
        if report.is_clean() {
            println!("No structural issues detected.");
        }
        if !report.errors.is_empty() {
            println!("Errors:");
            for error in &report.errors {
                println!("  - {error}");
            }
        }
        if !report.warnings.is_empty() {
            println!("Warnings:");
            for warning in &report.warnings {
                println!("  - {warning}");
            }
        }
    }

    Ok(!report.fails(strict))
}
