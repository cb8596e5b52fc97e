//! Project and work root marker files.

use std::fs;
use std::path::Path;

use crate::error::{AcftError, Result};
use crate::paths::{search_upwards, PROJECT_MARKER, WORK_MARKER};

const PROJECT_MARKER_CONTENT: &str = "\
# Agent Checkpoints Framework - Project Root Marker
#
# This file serves as a marker to identify the project root directory
# for rooted path expansion (::PROJECT).
";

const WORK_MARKER_CONTENT: &str = "\
# Agent Checkpoints Framework - Work Root Marker
#
# This file marks the work root directory for rooted path expansion (::WORK).
# Optional settings:
#
# actor = \"ci-bot\"
# event_log = \"checkpoints_events.log\"
# harness_logs = \"logs\"
# harness_timeout_secs = 600
";

/// Write whichever markers are not already present in `dir` or an ancestor.
///
/// Returns the file names that were created.
pub fn init_markers(dir: &Path) -> Result<Vec<&'static str>> {
    let mut created = Vec::new();

    for (marker, content) in [
        (PROJECT_MARKER, PROJECT_MARKER_CONTENT),
        (WORK_MARKER, WORK_MARKER_CONTENT),
    ] {
        if search_upwards(dir, marker, None).is_some() {
            continue;
        }
        let path = dir.join(marker);
        fs::write(&path, content).map_err(|e| AcftError::io(&path, e))?;
        created.push(marker);
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_both_markers() {
        let temp = TempDir::new().unwrap();
        let created = init_markers(temp.path()).unwrap();
        assert_eq!(created, vec![PROJECT_MARKER, WORK_MARKER]);
        assert!(temp.path().join(PROJECT_MARKER).exists());
        assert!(temp.path().join(WORK_MARKER).exists());
    }

    #[test]
    fn test_init_is_noop_when_markers_exist_above() {
        let temp = TempDir::new().unwrap();
        init_markers(temp.path()).unwrap();
        let nested = temp.path().join("nested");
        fs::create_dir(&nested).unwrap();

        assert!(init_markers(&nested).unwrap().is_empty());
        assert!(!nested.join(WORK_MARKER).exists());
    }

    #[test]
    fn test_work_marker_template_parses_as_toml() {
        let temp = TempDir::new().unwrap();
        init_markers(temp.path()).unwrap();
        let config = crate::config::WorkConfig::load(temp.path());
        assert_eq!(config, crate::config::WorkConfig::default());
    }
}
