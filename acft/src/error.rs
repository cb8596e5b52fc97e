//! Error taxonomy shared by the resolver, the document model and the
//! commands built on top of them.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures raised by the acft core.
///
/// `PathResolution` and `CheckpointFormat` are structural failures raised as
/// soon as they are detected. `Precondition` covers command-level contract
/// violations such as closing a checkpoint without a ledger.
#[derive(Debug, Error)]
pub enum AcftError {
    /// A rooted prefix could not be expanded, or a path did not point at a checkpoint.
    #[error("{0}")]
    PathResolution(String),

    /// `CHECKPOINT.md` is malformed.
    #[error("{0}")]
    CheckpointFormat(String),

    /// A requested state change violates the checkpoint contract.
    #[error("{0}")]
    Precondition(String),

    /// Any other tool-level failure (missing work root, bad arguments, ...).
    #[error("{0}")]
    Tool(String),

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AcftError {
    pub fn path(message: impl Into<String>) -> Self {
        Self::PathResolution(message.into())
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::CheckpointFormat(message.into())
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    pub fn tool(message: impl Into<String>) -> Self {
        Self::Tool(message.into())
    }

    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_path_resolution(&self) -> bool {
        matches!(self, Self::PathResolution(_))
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Self::CheckpointFormat(_))
    }
}

pub type Result<T, E = AcftError> = std::result::Result<T, E>;
