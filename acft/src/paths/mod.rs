//! Root discovery and rooted path resolution.
//!
//! Three anchors are recognised:
//! - `::PROJECT` - nearest ancestor holding `checkpoints_project.toml`
//! - `::WORK` - nearest ancestor holding `checkpoints_work.toml`, not above the project root
//! - `::THIS` - nearest ancestor holding `CHECKPOINT.md`, not above the work root

mod rooted;

pub use rooted::{normalize_lexically, resolve_lenient, RootedPrefix};

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AcftError, Result};

/// Marker file designating the project root.
pub const PROJECT_MARKER: &str = "checkpoints_project.toml";

/// Marker file designating the work root.
pub const WORK_MARKER: &str = "checkpoints_work.toml";

/// Document that makes a directory a checkpoint.
pub const CHECKPOINT_FILE: &str = "CHECKPOINT.md";

/// The three discovered anchors. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roots {
    pub project: Option<PathBuf>,
    pub work: Option<PathBuf>,
    pub checkpoint: Option<PathBuf>,
}

impl Roots {
    /// Walk upward from `start` looking for every marker.
    ///
    /// `start` is made absolute (without resolving symlinks) first, so the
    /// discovered roots keep whatever spelling the caller used.
    pub fn discover(start: &Path) -> Self {
        let start = std::path::absolute(start).unwrap_or_else(|_| start.to_path_buf());
        let project = search_upwards(&start, PROJECT_MARKER, None);
        let work = search_upwards(&start, WORK_MARKER, project.as_deref());
        let checkpoint = search_upwards(&start, CHECKPOINT_FILE, work.as_deref());

        debug!(
            start = %start.display(),
            project = ?project,
            work = ?work,
            checkpoint = ?checkpoint,
            "discovered roots"
        );

        Self {
            project,
            work,
            checkpoint,
        }
    }

    pub fn root_for(&self, prefix: RootedPrefix) -> Option<&Path> {
        match prefix {
            RootedPrefix::Project => self.project.as_deref(),
            RootedPrefix::Work => self.work.as_deref(),
            RootedPrefix::This => self.checkpoint.as_deref(),
        }
    }

    /// The work root, or a tool error naming the operation that needed it.
    pub fn require_work(&self, action: &str) -> Result<&Path> {
        self.work.as_deref().ok_or_else(|| {
            AcftError::tool(format!(
                "Cannot {action}: no {WORK_MARKER} found in ancestor directories"
            ))
        })
    }

    /// Expand a raw path token into an absolute path.
    ///
    /// Rooted tokens are joined onto their anchor; `~` expands to the home
    /// directory; anything else is taken relative to `cwd`. The result is
    /// lexically normalized, or fully resolved when `resolve_symlinks` is set.
    pub fn expand(&self, raw: &str, cwd: &Path, resolve_symlinks: bool) -> Result<PathBuf> {
        let candidate = match RootedPrefix::split(raw) {
            Some((prefix, tail)) => {
                let root = self
                    .root_for(prefix)
                    .ok_or_else(|| AcftError::path(prefix.missing_root_message()))?;
                if tail.is_empty() {
                    root.to_path_buf()
                } else {
                    root.join(tail)
                }
            }
            None if raw.starts_with("::") => {
                return Err(AcftError::path(format!(
                    "Unknown rooted prefix in path: {raw}"
                )));
            }
            None => {
                let path = expand_home(raw);
                if path.is_absolute() {
                    path
                } else {
                    cwd.join(path)
                }
            }
        };

        if resolve_symlinks {
            Ok(resolve_lenient(&candidate))
        } else {
            Ok(normalize_lexically(&candidate))
        }
    }

    /// Shortest rooted spelling of `target`: `::WORK` first, then
    /// `::PROJECT`, then the absolute path itself.
    pub fn to_rooted(&self, target: &Path) -> String {
        let target = resolve_lenient(target);
        let candidates = [
            (RootedPrefix::Work, self.work.as_deref()),
            (RootedPrefix::Project, self.project.as_deref()),
        ];

        for (prefix, root) in candidates {
            let Some(root) = root else { continue };
            let root = resolve_lenient(root);
            if let Ok(relative) = target.strip_prefix(&root) {
                return prefix.join(relative);
            }
        }

        target.display().to_string()
    }
}

/// The current directory as the user's shell presents it.
///
/// When `PWD` names an existing directory that resolves to the OS working
/// directory, the `PWD` spelling wins so symlinked checkouts keep their
/// symlinked paths.
pub fn symlink_aware_cwd() -> std::io::Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    if let Some(pwd) = std::env::var_os("PWD").map(PathBuf::from) {
        if pwd.is_absolute() && pwd.exists() && same_location(&pwd, &cwd) {
            return Ok(pwd);
        }
    }
    Ok(cwd)
}

/// Nearest ancestor-or-self of `start` containing `marker`.
///
/// The walk stops after examining `stop` (when given), or at the filesystem root.
pub fn search_upwards(start: &Path, marker: &str, stop: Option<&Path>) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(marker).exists() {
            return Some(current.to_path_buf());
        }
        if stop.is_some_and(|stop| same_location(current, stop)) {
            return None;
        }
        current = current.parent()?;
    }
}

/// Whether two paths name the same directory once symlinks are resolved.
pub fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}
