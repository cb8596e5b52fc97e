//! Drive the compiled `acft` binary

use super::helpers::*;

#[test]
fn test_init_creates_markers_once() {
    let project = TestProject::bare();

    let output = project.run(&["init"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Created: checkpoints_project.toml, checkpoints_work.toml"));
    assert!(project.root.join("checkpoints_project.toml").exists());
    assert!(project.root.join("checkpoints_work.toml").exists());

    let output = project.run(&["init"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Configuration files already exist"));
}

#[test]
fn test_path_error_exits_with_two() {
    let project = TestProject::bare();

    let output = project.run(&["orient"]);
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.starts_with("acft path error: Cannot expand ::THIS"));
    assert!(err.contains("Tip: Run 'acft init' to create the required configuration files."));
}

#[test]
fn test_new_prints_event_then_summary() {
    let project = TestProject::new();

    let output = project.run(&["new", "alpha_v1_01", "--tags", "auth,api"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    let mut lines = out.lines();

    let event: serde_json::Value = serde_json::from_str(lines.next().unwrap()).unwrap();
    assert_eq!(event["TYPE"], "CHECKPOINT_CREATED");
    assert_eq!(event["ACTOR"], "cli-tester");
    assert_eq!(event["PAYLOAD"]["TAGS"], serde_json::json!(["auth", "api"]));
    assert_eq!(
        lines.next(),
        Some("Created checkpoint at ::WORK/alpha_v1_01")
    );
}

#[test]
fn test_new_rejects_invalid_name_at_parse_time() {
    let project = TestProject::new();

    let output = project.run(&["new", "NotValid"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!project.root.join("NotValid").exists());
}

#[test]
fn test_orient_json_inside_checkpoint() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);
    let dir = project.create("alpha_v1_02", None);

    let output = project.run_in(&dir, &["orient", "--json", "--sections", "status,log"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let data: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(data["checkpoint"], "::WORK/alpha_v1_02");
    assert_eq!(data["name"], "alpha_v1_02");
    assert_eq!(data["VALID"], false);
    assert_eq!(data["LIFECYCLE"], "active");
    assert_eq!(data["relationships"]["ancestry"][0]["checkpoint"], "::WORK/alpha_v1_01");
    assert_eq!(data["relationships"]["ancestry"][0]["distance"], 1);
    assert!(data["sections"]["STATUS"]
        .as_str()
        .unwrap()
        .contains("Context recap"));
    assert!(data["latest_log"].is_string());
}

#[test]
fn test_orient_text_report() {
    let project = TestProject::new();
    let dir = project.create("alpha_v1_01", None);

    let output = project.run_in(&dir, &["orient"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Checkpoint: ::WORK/alpha_v1_01"));
    assert!(out.contains("VALID: false  LIFECYCLE: active  SIGNAL: pending"));
    assert!(out.contains("MANIFEST LEDGER:\n- Placeholder -> ::THIS/ARTIFACTS/stub"));
    assert!(out.contains("Ancestry:\n  ∅"));
}

#[test]
fn test_expand_requires_existing_paths_unless_future() {
    let project = TestProject::new();

    let output = project.run(&["expand", "::WORK/later"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Expanded path does not exist"));
    assert!(err.contains("acft expand -f ::WORK/later"));

    let output = project.run(&["expand", "-f", "::WORK/later", "::PROJECT"]);
    assert!(output.status.success());
    let expected = format!(
        "{}\n{}\n",
        project.root.join("later").display(),
        project.root.display()
    );
    assert_eq!(stdout(&output), expected);
}

#[test]
fn test_validate_json_report() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);

    let output = project.run(&["validate", "::WORK/alpha_v1_01", "--json"]);
    assert!(output.status.success(), "stdout: {}", stdout(&output));
    let data: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(data["checkpoint"], "::WORK/alpha_v1_01");
    assert_eq!(data["errors"], serde_json::json!([]));
    assert!(data["warnings"].is_array());
}

#[test]
fn test_close_warns_about_missing_artifacts() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);

    let output = project.run(&[
        "close",
        "--path",
        "::WORK/alpha_v1_01",
        "--status",
        "true",
        "--signal",
        "pass",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output)
        .contains("Updated ::WORK/alpha_v1_01 -> VALID=true, SIGNAL=pass, LIFECYCLE=active"));
    assert!(stderr(&output).contains("::THIS/ARTIFACTS/stub"));
}

#[test]
fn test_manifest_exit_code_reflects_issues() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);

    let output = project.run(&["manifest", "::WORK/alpha_v1_01"]);
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.starts_with("Manifest sweep (quick)"));
    assert!(out.contains("CHECKPOINT"));
    assert!(out.contains("- ::WORK/alpha_v1_01 :: missing_harness :: "));
}

#[test]
fn test_events_tail_filters_types() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);
    project.run(&["log", "checked in", "--path", "::WORK/alpha_v1_01"]);

    let output = project.run(&["events", "tail", "--types", "LOG_APPENDED", "--since", "-1h"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let lines: Vec<serde_json::Value> = stdout(&output)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["PAYLOAD"]["MESSAGE"], "checked in");
}

#[test]
fn test_events_without_subcommand_fails() {
    let project = TestProject::new();
    let output = project.run(&["events"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_completions_script() {
    let project = TestProject::bare();
    let output = project.run(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("acft"));

    let output = project.run(&["completions", "powershell"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Unknown shell"));
}
