//! Detectors of the failure catalogue.
//!
//! Every detector is pure: it reads the checkpoint (and, for cross-checkpoint
//! rules, the universe) and never touches the event log.

use std::collections::BTreeSet;

use crate::checkpoints::{Checkpoint, CheckpointName};
use crate::config::AcftContext;
use crate::harness::read_manifest_commands;
use crate::paths::CHECKPOINT_FILE;
use crate::validation::detect_unrooted_paths;

const STALE_TOKENS: [&str; 4] = ["todo", "tbd", "pending", "stub"];

fn log_mentions(checkpoint: &Checkpoint, needle: &str) -> bool {
    checkpoint
        .document
        .log_entries()
        .iter()
        .any(|entry| entry.message.to_lowercase().contains(needle))
}

/// Other checkpoints on the same branch+version that are still active.
fn active_line_members<'a>(
    name: &CheckpointName,
    universe: &'a [Checkpoint],
) -> impl Iterator<Item = &'a Checkpoint> + 'a {
    let name = name.clone();
    universe.iter().filter(move |cp| {
        cp.document.is_active() && cp.parsed_name().is_some_and(|other| other.same_line(&name))
    })
}

pub(super) fn missing_harness(
    checkpoint: &Checkpoint,
    _ctx: &AcftContext,
    _universe: &[Checkpoint],
) -> Option<String> {
    let manifest = checkpoint.document.section("MANIFEST");
    if !read_manifest_commands(manifest, None).is_empty() || log_mentions(checkpoint, "harness") {
        return None;
    }
    Some(
        "MANIFEST does not record executable harness commands and LOG lacks harness evidence."
            .to_string(),
    )
}

pub(super) fn stale_contract(
    checkpoint: &Checkpoint,
    _ctx: &AcftContext,
    _universe: &[Checkpoint],
) -> Option<String> {
    let document = &checkpoint.document;
    if !document.valid() {
        return None;
    }
    let status = document.section("STATUS").to_lowercase();
    let harness = document.section("HARNESS").to_lowercase();
    if STALE_TOKENS
        .iter()
        .any(|token| status.contains(token) || harness.contains(token))
    {
        return Some("VALID: true but STATUS/HARNESS still contain TODO placeholders.".to_string());
    }
    if document.section("MANIFEST").to_lowercase().contains("placeholder") {
        return Some("MANIFEST LEDGER still marked as placeholder while VALID: true.".to_string());
    }
    None
}

pub(super) fn missing_manifest_ledger(
    checkpoint: &Checkpoint,
    _ctx: &AcftContext,
    _universe: &[Checkpoint],
) -> Option<String> {
    if !checkpoint.document.valid() {
        return None;
    }
    let ledger = checkpoint.document.manifest_ledger();
    if ledger.is_empty() {
        return Some("No MANIFEST LEDGER entries found.".to_string());
    }
    let unrooted: Vec<&str> = ledger
        .iter()
        .filter(|entry| !entry.is_rooted_artifact())
        .map(|entry| entry.path.as_str())
        .collect();
    if unrooted.is_empty() {
        return None;
    }
    Some(format!(
        "Ledger entries must reference ::THIS/ARTIFACTS paths (found {}).",
        unrooted.join(", ")
    ))
}

pub(super) fn unrooted_references(
    checkpoint: &Checkpoint,
    _ctx: &AcftContext,
    _universe: &[Checkpoint],
) -> Option<String> {
    let matches: BTreeSet<String> = detect_unrooted_paths(&checkpoint.source)
        .into_iter()
        .collect();
    if matches.is_empty() {
        return None;
    }
    let listed: Vec<String> = matches.into_iter().collect();
    Some(format!("Found unrooted references like {}", listed.join(", ")))
}

pub(super) fn relative_path_bleed(
    checkpoint: &Checkpoint,
    _ctx: &AcftContext,
    _universe: &[Checkpoint],
) -> Option<String> {
    checkpoint
        .source
        .contains("../")
        .then(|| "Found '../' references that risk leaking relative paths.".to_string())
}

pub(super) fn timeline_gaps(
    checkpoint: &Checkpoint,
    _ctx: &AcftContext,
    _universe: &[Checkpoint],
) -> Option<String> {
    let entries = checkpoint.document.log_entries();
    let Some(first) = entries.first() else {
        return Some("# LOG is empty.".to_string());
    };
    if first.message.is_empty() || !first.message.to_lowercase().contains("created") {
        return Some("No orienting LOG entry recorded.".to_string());
    }
    None
}

pub(super) fn orphaned_successors(
    checkpoint: &Checkpoint,
    ctx: &AcftContext,
    universe: &[Checkpoint],
) -> Option<String> {
    if let Some(delegate) = checkpoint.document.delegate_of() {
        let Ok(target) = ctx.expand(delegate) else {
            return Some(format!("DELEGATE_OF references unknown path: {delegate}"));
        };
        if !target.join(CHECKPOINT_FILE).exists() {
            return Some(format!("DELEGATE_OF target missing CHECKPOINT.md: {delegate}"));
        }
    }

    let name = checkpoint.parsed_name()?;
    if !checkpoint.document.is_active() {
        return None;
    }
    let conflicts: Vec<&str> = active_line_members(&name, universe)
        .filter(|cp| !cp.is_at(&checkpoint.dir))
        .map(Checkpoint::name)
        .collect();
    if conflicts.is_empty() {
        return None;
    }
    Some(format!(
        "Branch {} v{} has multiple active checkpoints: {}",
        name.branch,
        name.version,
        conflicts.join(", ")
    ))
}

pub(super) fn version_drift(
    checkpoint: &Checkpoint,
    _ctx: &AcftContext,
    universe: &[Checkpoint],
) -> Option<String> {
    let name = checkpoint.parsed_name()?;
    let active: Vec<&Checkpoint> = active_line_members(&name, universe).collect();
    if active.len() <= 1 {
        return None;
    }
    let others: Vec<&str> = active
        .iter()
        .filter(|cp| !cp.is_at(&checkpoint.dir))
        .map(|cp| cp.name())
        .collect();
    Some(format!(
        "Multiple active checkpoints share {} v{}: {}",
        name.branch,
        name.version,
        others.join(", ")
    ))
}

pub(super) fn scope_shock(
    checkpoint: &Checkpoint,
    _ctx: &AcftContext,
    _universe: &[Checkpoint],
) -> Option<String> {
    checkpoint
        .document
        .log_entries()
        .iter()
        .any(|entry| entry.message.to_lowercase().contains("scope") && !entry.message.contains("::"))
        .then(|| "Scope change mentioned in LOG without rooted directive reference.".to_string())
}

pub(super) fn history_drift(
    checkpoint: &Checkpoint,
    _ctx: &AcftContext,
    _universe: &[Checkpoint],
) -> Option<String> {
    (!checkpoint.document.section("STATUS").contains("Context recap"))
        .then(|| "STATUS missing 'Context recap' bullet.".to_string())
}

/// Bullet items following `## Dependencies`, up to `## MANIFEST LEDGER`.
///
/// Other `## ` headings inside the block are skipped without ending it.
fn dependency_items(manifest: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut capture = false;

    for line in manifest.lines() {
        let stripped = line.trim();
        if stripped.starts_with("## MANIFEST LEDGER") {
            capture = false;
        }
        if stripped.starts_with("## Dependencies") {
            capture = true;
            continue;
        }
        if !capture || line.starts_with("## ") {
            continue;
        }
        if let Some(item) = stripped.strip_prefix("- ") {
            items.push(item);
        }
    }

    items
}

pub(super) fn dependency_fog(
    checkpoint: &Checkpoint,
    _ctx: &AcftContext,
    _universe: &[Checkpoint],
) -> Option<String> {
    let manifest = checkpoint.document.section("MANIFEST");
    if !manifest.contains("## Dependencies") {
        return None;
    }
    let items = dependency_items(manifest);
    if items.is_empty() {
        return Some("Dependencies heading present but no items documented.".to_string());
    }

    let unannotated: Vec<&str> = items
        .iter()
        .copied()
        .filter(|item| !item.contains('(') && !item.to_uppercase().contains("VALID"))
        .collect();
    if !unannotated.is_empty() {
        return Some(format!(
            "Dependencies missing status annotations: {}",
            unannotated.join(", ")
        ));
    }
    if items.iter().any(|item| !item.contains("::")) {
        return Some("Dependencies should use rooted paths (::THIS/ or ::WORK/).".to_string());
    }
    None
}

pub(super) fn goal_fog(
    checkpoint: &Checkpoint,
    _ctx: &AcftContext,
    _universe: &[Checkpoint],
) -> Option<String> {
    let status = checkpoint.document.section("STATUS");
    (!status.contains("Success criteria") || !status.contains("Exit criteria"))
        .then(|| "STATUS must capture success and exit criteria.".to_string())
}

pub(super) fn validation_theater(
    checkpoint: &Checkpoint,
    _ctx: &AcftContext,
    _universe: &[Checkpoint],
) -> Option<String> {
    if !checkpoint.document.valid() {
        return None;
    }
    let manifest = checkpoint.document.section("MANIFEST").to_lowercase();
    if manifest.contains("placeholder") || manifest.contains("# add verification commands here") {
        return Some("MANIFEST still contains placeholder harness after VALID: true.".to_string());
    }
    if !log_mentions(checkpoint, "harness") {
        return Some("No LOG entry referencing harness execution despite VALID: true.".to_string());
    }
    None
}
