//! Lint, failure sweep and harness runs over checkpoints on disk

use acft::commands::{manifest, validate, verify};
use acft::diagnosis::{sweep, SweepMode};
use acft::fs::scan_checkpoints;
use acft::validation::{detect_unrooted_paths, lint_checkpoint};

use super::helpers::*;

#[test]
fn test_relative_path_is_reported_everywhere() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);
    project.set_section(
        "alpha_v1_01",
        "CONTEXT",
        "Notes live in ../relative/path for now.",
    );

    let checkpoint = project.load("alpha_v1_01");
    assert_eq!(
        detect_unrooted_paths(checkpoint.document.section("CONTEXT")),
        vec!["../".to_string()]
    );

    let report = lint_checkpoint(&checkpoint);
    assert!(!report.errors.is_empty());
    assert!(report.errors.iter().any(|e| e.contains("../")));

    let ctx = project.ctx();
    let universe = scan_checkpoints(&ctx).unwrap();
    let sweep = sweep(&ctx, &checkpoint, &universe, SweepMode::Quick);
    let failures: Vec<&str> = sweep.issues.iter().map(|i| i.failure.as_str()).collect();
    assert!(failures.contains(&"unrooted_references"));
    assert!(failures.contains(&"relative_path_bleed"));

    let passed = validate::execute(&ctx, Some("::WORK/alpha_v1_01"), false, true).unwrap();
    assert!(!passed);
}

#[test]
fn test_fresh_checkpoint_validates_without_errors() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);

    let report = lint_checkpoint(&project.load("alpha_v1_01"));
    assert!(report.errors.is_empty(), "errors: {:?}", report.errors);

    let ctx = project.ctx();
    assert!(validate::execute(&ctx, Some("::WORK/alpha_v1_01"), false, false).unwrap());
}

#[test]
fn test_manifest_emits_aggregated_severity() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);

    let passed = manifest::execute(
        &project.ctx(),
        Some("::WORK/alpha_v1_01"),
        SweepMode::Quick,
        true,
        true,
    )
    .unwrap();
    assert!(!passed);

    let events = project.events();
    let updated = events.last().unwrap();
    assert_eq!(updated["TYPE"], "MANIFEST_UPDATED");
    assert_eq!(updated["PAYLOAD"]["MODE"], "quick");
    assert_eq!(updated["PAYLOAD"]["SEVERITY"], "error");

    let issues = updated["PAYLOAD"]["ISSUES"].as_array().unwrap();
    assert!(!issues.is_empty());
    for issue in issues {
        assert_eq!(issue["checkpoint"], "::WORK/alpha_v1_01");
        assert!(issue["failure"].is_string());
        assert!(issue["detail"].is_string());
        assert!(matches!(
            issue["severity"].as_str(),
            Some("info") | Some("warning") | Some("error")
        ));
    }
}

#[test]
fn test_full_sweep_covers_every_checkpoint() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);
    project.create("beta_v1_01", None);

    let ctx = project.ctx();
    let universe = scan_checkpoints(&ctx).unwrap();
    let target = project.load("alpha_v1_01");
    let report = sweep(&ctx, &target, &universe, SweepMode::Full);
    assert!(report
        .issues
        .iter()
        .any(|issue| issue.checkpoint == "::WORK/beta_v1_01"));
    assert_eq!(report.count, report.issues.len());
}

#[test]
fn test_verify_records_passing_harness() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);
    project.set_section("alpha_v1_01", "MANIFEST", LEDGER_MANIFEST);

    let passed = verify::execute(
        &project.ctx(),
        Some("::WORK/alpha_v1_01"),
        None,
        false,
        true,
    )
    .unwrap();
    assert!(passed);

    let events = project.events();
    let executed = events.last().unwrap();
    assert_eq!(executed["TYPE"], "HARNESS_EXECUTED");
    assert_eq!(executed["PAYLOAD"]["STATUS"], "pass");
    assert_eq!(
        executed["PAYLOAD"]["COMMANDS"],
        serde_json::json!([{ "command": "true", "exit_code": 0 }])
    );
    let log_path = executed["PAYLOAD"]["LOG_PATH"].as_str().unwrap();
    assert!(log_path.starts_with("::WORK/logs/alpha_v1_01/harness_"));
    assert!(project.root.join(&log_path["::WORK/".len()..]).exists());
}

#[test]
fn test_verify_stops_at_first_failure() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);
    project.set_section(
        "alpha_v1_01",
        "MANIFEST",
        "## MANIFEST LEDGER\n- Report -> ::THIS/ARTIFACTS/report.md -> Final output\n\n## Harness\n```sh\nfalse\ntrue\n```",
    );

    let passed = verify::execute(
        &project.ctx(),
        Some("::WORK/alpha_v1_01"),
        Some("harness"),
        false,
        true,
    )
    .unwrap();
    assert!(!passed);

    let events = project.events();
    let executed = events.last().unwrap();
    assert_eq!(executed["PAYLOAD"]["STATUS"], "fail");
    assert_eq!(
        executed["PAYLOAD"]["COMMANDS"],
        serde_json::json!([{ "command": "false", "exit_code": 1 }])
    );
}

#[test]
fn test_verify_dry_run_and_missing_commands() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);
    let ctx = project.ctx();

    let err = verify::execute(&ctx, Some("::WORK/alpha_v1_01"), None, true, false).unwrap_err();
    assert_eq!(err.to_string(), "No harness commands found in MANIFEST.");

    project.set_section("alpha_v1_01", "MANIFEST", LEDGER_MANIFEST);
    assert!(verify::execute(&ctx, Some("::WORK/alpha_v1_01"), None, true, true).unwrap());
    assert!(!project.root.join("logs").exists());
    assert_eq!(project.event_types(), vec!["CHECKPOINT_CREATED"]);
}
