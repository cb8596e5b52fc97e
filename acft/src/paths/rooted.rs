//! Rooted prefix tokens and purely lexical path helpers.

use std::path::{Component, Path, PathBuf};

use super::{CHECKPOINT_FILE, PROJECT_MARKER, WORK_MARKER};

/// One of the three rooted anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootedPrefix {
    Project,
    Work,
    This,
}

impl RootedPrefix {
    pub const ALL: [RootedPrefix; 3] = [Self::Project, Self::Work, Self::This];

    pub fn token(self) -> &'static str {
        match self {
            Self::Project => "::PROJECT",
            Self::Work => "::WORK",
            Self::This => "::THIS",
        }
    }

    /// Split a raw token into its prefix and the tail with leading `/` removed.
    ///
    /// The prefix must be followed by the end of the token or a `/`, so
    /// `::WORKS` is not a `::WORK` path.
    pub fn split(raw: &str) -> Option<(Self, &str)> {
        Self::ALL.into_iter().find_map(|prefix| {
            let rest = raw.strip_prefix(prefix.token())?;
            if rest.is_empty() || rest.starts_with('/') {
                Some((prefix, rest.trim_start_matches('/')))
            } else {
                None
            }
        })
    }

    /// Render `relative` under this prefix using `/` separators.
    pub fn join(self, relative: &Path) -> String {
        let parts: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        if parts.is_empty() {
            self.token().to_string()
        } else {
            format!("{}/{}", self.token(), parts.join("/"))
        }
    }

    pub(super) fn missing_root_message(self) -> String {
        match self {
            Self::Project => format!(
                "Cannot expand ::PROJECT: no {PROJECT_MARKER} found in ancestor directories"
            ),
            Self::Work => {
                format!("Cannot expand ::WORK: no {WORK_MARKER} found in ancestor directories")
            }
            Self::This => format!(
                "Cannot expand ::THIS: no {CHECKPOINT_FILE} found in current or ancestor directories"
            ),
        }
    }
}

/// Collapse `.` and `..` segments and duplicate separators without touching
/// the filesystem. `..` at the root stays at the root.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// Resolve symlinks for a path that may not exist yet.
///
/// The longest existing ancestor is canonicalized and the remaining
/// components are appended after lexical normalization.
pub fn resolve_lenient(path: &Path) -> PathBuf {
    let normalized = normalize_lexically(path);
    if let Ok(resolved) = normalized.canonicalize() {
        return resolved;
    }

    let mut existing = normalized.as_path();
    let mut missing = Vec::new();
    while let Some(parent) = existing.parent() {
        if let Some(name) = existing.file_name() {
            missing.push(name.to_os_string());
        }
        existing = parent;
        if let Ok(mut resolved) = existing.canonicalize() {
            for name in missing.iter().rev() {
                resolved.push(name);
            }
            return resolved;
        }
    }

    normalized
}
