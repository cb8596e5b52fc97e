//! Create, log and close checkpoints through the command layer

use acft::checkpoints::{Lifecycle, Signal, REQUIRED_SECTIONS};
use acft::commands::{close, log, new};
use acft::error::AcftError;

use super::helpers::*;

#[test]
fn test_new_checkpoint_defaults() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);

    let checkpoint = project.load("alpha_v1_01");
    let document = &checkpoint.document;
    assert!(!document.valid());
    assert_eq!(document.lifecycle(), Some(Lifecycle::Active));
    assert_eq!(document.signal(), Some("pending"));
    assert_eq!(
        &document.sections.titles()[..REQUIRED_SECTIONS.len()],
        REQUIRED_SECTIONS.as_slice()
    );

    let entries = document.log_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "CHECKPOINT scaffolding created");
    assert!(entries[0].timestamp.is_some());

    let events = project.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["TYPE"], "CHECKPOINT_CREATED");
    assert_eq!(events[0]["ACTOR"], "tester");
    assert_eq!(events[0]["CHECKPOINT_PATH"], "::WORK/alpha_v1_01");
    assert_eq!(events[0]["PAYLOAD"], serde_json::json!({}));
}

#[test]
fn test_new_records_delegate_and_tags() {
    let project = TestProject::new();
    project.create("root_v1_01", None);

    let tags = vec!["auth, api".to_string()];
    new::execute(
        &project.ctx(),
        "child_v1_01",
        Some("::WORK/root_v1_01"),
        &tags,
        true,
    )
    .unwrap();

    let checkpoint = project.load("child_v1_01");
    assert_eq!(checkpoint.document.delegate_of(), Some("::WORK/root_v1_01"));
    assert!(checkpoint.document.log_entries().is_empty());
    assert!(project.read_text("child_v1_01").contains("TAGS:\n  - auth\n  - api"));

    let events = project.events();
    let payload = &events.last().unwrap()["PAYLOAD"];
    assert_eq!(payload["DELEGATE_OF"], "::WORK/root_v1_01");
    assert_eq!(payload["TAGS"], serde_json::json!(["auth", "api"]));
}

#[test]
fn test_new_rejects_existing_directory_and_bad_delegate() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);

    let err = new::execute(&project.ctx(), "alpha_v1_01", None, &[], false).unwrap_err();
    assert!(err.to_string().contains("Checkpoint directory already exists"));

    let err = new::execute(
        &project.ctx(),
        "beta_v1_01",
        Some("::WORK/missing_v1_01"),
        &[],
        false,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Delegate path does not contain CHECKPOINT.md");
    assert!(!project.checkpoint_dir("beta_v1_01").exists());
}

#[test]
fn test_new_rejects_bad_name() {
    let project = TestProject::new();
    let err = new::execute(&project.ctx(), "Alpha", None, &[], false).unwrap_err();
    assert!(err.to_string().contains("{branch}_v{version}_{step}"));
}

#[test]
fn test_log_appends_in_order() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);
    let ctx = project.ctx();

    log::execute(&ctx, "first note", Some("::WORK/alpha_v1_01")).unwrap();
    log::execute(&ctx, "second note", Some("::WORK/alpha_v1_01")).unwrap();

    let messages: Vec<String> = project
        .load("alpha_v1_01")
        .document
        .log_entries()
        .into_iter()
        .map(|entry| entry.message)
        .collect();
    assert_eq!(
        messages,
        vec!["CHECKPOINT scaffolding created", "first note", "second note"]
    );
    assert_eq!(
        project.event_types(),
        vec!["CHECKPOINT_CREATED", "LOG_APPENDED", "LOG_APPENDED"]
    );
}

#[test]
fn test_log_defaults_to_this_inside_checkpoint() {
    let project = TestProject::new();
    let dir = project.create("alpha_v1_01", None);

    log::execute(&project.ctx_in(&dir), "from inside", None).unwrap();
    let entries = project.load("alpha_v1_01").document.log_entries();
    assert_eq!(entries.last().unwrap().message, "from inside");
}

#[test]
fn test_rewrite_is_idempotent() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);
    let before = project.read_text("alpha_v1_01");

    let mut checkpoint = project.load("alpha_v1_01");
    acft::fs::write_checkpoint(&mut checkpoint).unwrap();
    assert_eq!(project.read_text("alpha_v1_01"), before);
}

#[test]
fn test_close_with_rooted_ledger() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);
    project.set_section("alpha_v1_01", "MANIFEST", LEDGER_MANIFEST);
    project.write_artifact("alpha_v1_01", "ARTIFACTS/report.md", "# Report\n");

    let passed = close::execute(
        &project.ctx(),
        Some("::WORK/alpha_v1_01"),
        true,
        None,
        None,
        None,
    )
    .unwrap();
    assert!(passed);

    let checkpoint = project.load("alpha_v1_01");
    assert!(checkpoint.document.valid());
    assert_eq!(checkpoint.document.signal(), Some("pending"));
    let closing_lines = checkpoint
        .document
        .section("LOG")
        .lines()
        .filter(|line| line.contains("VALID: true"))
        .count();
    assert_eq!(closing_lines, 1);

    let types = project.event_types();
    assert_eq!(
        types,
        vec![
            "CHECKPOINT_CREATED",
            "CHECKPOINT_VERIFIED",
            "CHECKPOINT_CLOSED"
        ]
    );
    let events = project.events();
    assert_eq!(events[1]["PAYLOAD"]["VALID"], true);
    assert_eq!(events[1]["PAYLOAD"]["LIFECYCLE"], "active");
    assert_eq!(
        events[1]["PAYLOAD"]["MESSAGE"],
        "Status updated to VALID: true (SIGNAL=pending)"
    );
}

#[test]
fn test_close_refuses_unrooted_or_empty_ledger() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);

    project.set_section(
        "alpha_v1_01",
        "MANIFEST",
        "## MANIFEST LEDGER\n- Report -> ARTIFACTS/report.md -> Final output",
    );
    let err = close::execute(&project.ctx(), Some("::WORK/alpha_v1_01"), true, None, None, None)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AcftError>(),
        Some(AcftError::Precondition(_))
    ));

    project.set_section("alpha_v1_01", "MANIFEST", "## MANIFEST LEDGER\n");
    let err = close::execute(&project.ctx(), Some("::WORK/alpha_v1_01"), true, None, None, None)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot set VALID: true without MANIFEST LEDGER entries."
    );

    assert!(!project.load("alpha_v1_01").document.valid());
    assert_eq!(project.event_types(), vec!["CHECKPOINT_CREATED"]);
}

#[test]
fn test_close_false_overrides_signal_and_lifecycle() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);

    close::execute(
        &project.ctx(),
        Some("::WORK/alpha_v1_01"),
        false,
        Some(Signal::Blocked),
        Some(Lifecycle::Superseded),
        Some("Replaced by alpha_v1_02"),
    )
    .unwrap();

    let checkpoint = project.load("alpha_v1_01");
    assert!(!checkpoint.document.valid());
    assert_eq!(checkpoint.document.signal(), Some("blocked"));
    assert_eq!(checkpoint.document.lifecycle(), Some(Lifecycle::Superseded));
    assert_eq!(
        checkpoint.document.log_entries().last().unwrap().message,
        "Replaced by alpha_v1_02"
    );
    assert_eq!(
        project.event_types(),
        vec!["CHECKPOINT_CREATED", "CHECKPOINT_VERIFIED"]
    );
}

#[test]
fn test_close_valid_requires_active_lifecycle() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);
    project.set_section("alpha_v1_01", "MANIFEST", LEDGER_MANIFEST);

    let err = close::execute(
        &project.ctx(),
        Some("::WORK/alpha_v1_01"),
        true,
        None,
        Some(Lifecycle::Archived),
        None,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot set VALID: true when LIFECYCLE is not active."
    );
}
