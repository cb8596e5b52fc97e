//! Input validation and structural lint for checkpoints.
//!
//! Name checks run before a checkpoint directory is created; the lint runs
//! over an existing `CHECKPOINT.md` and backs `acft validate`.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use anyhow::{bail, Result};
use regex::Regex;
use serde::Serialize;

use crate::checkpoints::{Checkpoint, CheckpointName, Lifecycle, REQUIRED_SECTIONS};
use crate::parser::FrontmatterValue;

static UNROOTED_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [r"\.\./", r"\./ARTIFACTS", r"\sARTIFACTS/"]
        .map(|pattern| Regex::new(pattern).expect("Invalid regex pattern"))
});

/// Directory holding work-in-progress files that must be empty once VALID.
pub const STAGE_DIR: &str = "STAGE";

/// Sections that should never be left blank.
const NON_EMPTY_SECTIONS: [&str; 4] = ["STATUS", "HARNESS", "CONTEXT", "MANIFEST"];

/// Validates a checkpoint directory name against `{branch}_v{version}_{step}`.
///
/// # Examples
///
/// ```
/// use acft::validation::validate_checkpoint_name;
///
/// assert!(validate_checkpoint_name("auth_v1_01").is_ok());
/// assert!(validate_checkpoint_name("auth-v1").is_err());
/// ```
pub fn validate_checkpoint_name(name: &str) -> Result<()> {
    if CheckpointName::parse(name).is_none() {
        bail!("Checkpoint names must follow {{branch}}_v{{version}}_{{step}} (e.g., auth_v1_01).");
    }
    Ok(())
}

/// Clap value parser for checkpoint name arguments.
///
/// ```ignore
/// #[arg(value_parser = clap_checkpoint_name_validator)]
/// name: String,
/// ```
pub fn clap_checkpoint_name_validator(s: &str) -> Result<String, String> {
    validate_checkpoint_name(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}

/// Every bare or relative path fragment in `text`, in pattern order.
///
/// Matches `../`, `./ARTIFACTS`, and `ARTIFACTS/` preceded by whitespace.
pub fn detect_unrooted_paths(text: &str) -> Vec<String> {
    UNROOTED_PATTERNS
        .iter()
        .flat_map(|pattern| pattern.find_iter(text).map(|m| m.as_str().to_string()))
        .collect()
}

/// Errors for a section order that does not open with the required sections.
pub fn validate_section_order(titles: &[&str]) -> Vec<String> {
    let mut errors = Vec::new();
    let prefix_matches = titles.len() >= REQUIRED_SECTIONS.len()
        && titles[..REQUIRED_SECTIONS.len()] == REQUIRED_SECTIONS;
    if !prefix_matches {
        errors.push(format!(
            "Sections must start with {} (in that order).",
            REQUIRED_SECTIONS.join(", ")
        ));
    }

    let missing: Vec<&str> = REQUIRED_SECTIONS
        .iter()
        .copied()
        .filter(|required| !titles.contains(required))
        .collect();
    if !missing.is_empty() {
        errors.push(format!("Missing required sections: {}", missing.join(", ")));
    }
    errors
}

/// Result of linting one checkpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LintReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Whether the report fails, counting warnings only when `strict`.
    pub fn fails(&self, strict: bool) -> bool {
        !self.errors.is_empty() || (strict && !self.warnings.is_empty())
    }
}

/// Structural lint of a loaded checkpoint.
pub fn lint_checkpoint(checkpoint: &Checkpoint) -> LintReport {
    let mut report = LintReport::default();
    let document = &checkpoint.document;
    let frontmatter = &document.frontmatter;

    let name = checkpoint.name();
    if CheckpointName::parse(name).is_none() {
        report.errors.push(format!(
            "Directory name '{name}' must match {{branch}}_v{{version}}_{{step}}."
        ));
    }

    if !frontmatter.contains_key("VALID") || !frontmatter.contains_key("LIFECYCLE") {
        report
            .errors
            .push("Frontmatter must declare VALID and LIFECYCLE keys.".to_string());
    } else {
        let lifecycle = frontmatter.get_str("LIFECYCLE");
        if lifecycle.and_then(|l| l.parse::<Lifecycle>().ok()).is_none() {
            report
                .errors
                .push("LIFECYCLE must be active, superseded, or archived.".to_string());
        }
        let valid_false = matches!(
            frontmatter.get("VALID"),
            Some(FrontmatterValue::Bool(false))
        ) || frontmatter.get_str("VALID") == Some("false");
        if lifecycle != Some(Lifecycle::Active.as_str()) && !valid_false {
            report
                .errors
                .push("LIFECYCLE != active requires VALID: false.".to_string());
        }
    }

    let titles = document.sections.titles();
    report.errors.extend(validate_section_order(&titles));

    let combined = titles
        .iter()
        .map(|title| document.section(title))
        .collect::<Vec<_>>()
        .join("\n");
    let unrooted: BTreeSet<String> = detect_unrooted_paths(&combined).into_iter().collect();
    if !unrooted.is_empty() {
        let listed: Vec<String> = unrooted.into_iter().collect();
        report.errors.push(format!(
            "Detected unrooted or relative paths: {}",
            listed.join(", ")
        ));
    }

    let stage = checkpoint.dir.join(STAGE_DIR);
    let stage_has_files = std::fs::read_dir(&stage)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);
    if stage_has_files && document.valid() {
        report
            .warnings
            .push(format!("{STAGE_DIR}/ contains files while VALID: true."));
    }

    for section in NON_EMPTY_SECTIONS {
        if document.section(section).trim().is_empty() {
            report.warnings.push(format!("{section} section is empty."));
        }
    }

    let status = document.section("STATUS");
    if !status.contains("Context recap") {
        report
            .warnings
            .push("STATUS should include a 'Context recap'.".to_string());
    }
    if !status.contains("Success criteria") || !status.contains("Exit criteria") {
        report
            .warnings
            .push("STATUS should list success and exit criteria.".to_string());
    }
    if !document.section("MANIFEST").contains("## MANIFEST LEDGER") {
        report
            .warnings
            .push("MANIFEST should begin with ## MANIFEST LEDGER.".to_string());
    }

    report
}
