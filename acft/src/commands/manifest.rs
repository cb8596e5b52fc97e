//! Manifest command - sweeps checkpoints against the failure catalogue

use anyhow::Result;
use serde_json::json;

use super::common::{emit_event, print_json};
use crate::config::AcftContext;
use crate::diagnosis::{sweep, SweepMode};
use crate::events::{EventEmitter, EventType};
use crate::fs::{load_checkpoint, scan_checkpoints};
use crate::utils::render_table;

pub fn execute(
    ctx: &AcftContext,
    path: Option<&str>,
    mode: SweepMode,
    json: bool,
    emit: bool,
) -> Result<bool> {
    let target = load_checkpoint(ctx, path)?;
    let universe = scan_checkpoints(ctx)?;
    let report = sweep(ctx, &target, &universe, mode);

    if json {
        print_json(&report)?;
    } else {
        println!("Manifest sweep ({mode})");
        if report.passed() {
            println!("No failure catalogue issues detected.");
        } else {
            let rows: Vec<Vec<String>> = report
                .issues
                .iter()
                .map(|issue| {
                    vec![
                        issue.checkpoint.clone(),
                        issue.failure.clone(),
                        issue.severity.to_string(),
                    ]
                })
                .collect();
            println!(
                "{}",
                render_table(&["CHECKPOINT", "FAILURE", "SEVERITY"], &rows)
            );
            println!();
            for issue in &report.issues {
                println!(
                    "- {} :: {} :: {}",
                    issue.checkpoint, issue.failure, issue.detail
                );
            }
        }
    }

    if emit {
        let emitter = EventEmitter::new(ctx)?;
        emit_event(
            &emitter,
            EventType::ManifestUpdated,
            Some(&target.dir),
            json!({
                "MODE": mode.as_str(),
                "ISSUES": &report.issues,
                "SEVERITY": report.severity().as_str(),
            }),
        )?;
    }

    Ok(report.passed())
}
