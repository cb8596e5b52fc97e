//! Checkpoint file I/O operations
//!
//! Handles reading and writing `<work root>/<name>/CHECKPOINT.md` and
//! enumerating every checkpoint under the work root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::checkpoints::{Checkpoint, CheckpointDocument};
use crate::config::AcftContext;
use crate::error::{AcftError, Result};
use crate::paths::CHECKPOINT_FILE;

/// Read and parse the checkpoint stored in `dir`.
pub fn read_checkpoint(dir: &Path) -> Result<Checkpoint> {
    let path = dir.join(CHECKPOINT_FILE);
    if !path.exists() {
        return Err(AcftError::format(format!(
            "{} does not exist for checkpoint {}",
            path.display(),
            dir.display()
        )));
    }

    let source = fs::read_to_string(&path).map_err(|e| match e.kind() {
        io::ErrorKind::InvalidData => AcftError::format(format!(
            "{}: {CHECKPOINT_FILE} is not valid UTF-8",
            dir.display()
        )),
        _ => AcftError::io(&path, e),
    })?;
    let document = CheckpointDocument::parse(&source).map_err(|e| match e {
        AcftError::CheckpointFormat(message) => {
            AcftError::format(format!("{}: {message}", dir.display()))
        }
        other => other,
    })?;

    Ok(Checkpoint {
        dir: dir.to_path_buf(),
        document,
        source,
    })
}

/// Resolve a command argument (default `::THIS`) and load that checkpoint.
pub fn load_checkpoint(ctx: &AcftContext, raw: Option<&str>) -> Result<Checkpoint> {
    let dir = ctx.checkpoint_dir(raw)?;
    read_checkpoint(&dir)
}

/// Re-render the document and write it back, refreshing `source`.
pub fn write_checkpoint(checkpoint: &mut Checkpoint) -> Result<()> {
    let path = checkpoint.file_path();
    let rendered = checkpoint.document.render();
    fs::write(&path, &rendered).map_err(|e| AcftError::io(&path, e))?;
    checkpoint.source = rendered;
    Ok(())
}

/// Create `dir` (its parent must exist) and write `document` into it.
pub fn create_checkpoint(dir: &Path, document: CheckpointDocument) -> Result<Checkpoint> {
    if dir.exists() {
        return Err(AcftError::tool(format!(
            "Checkpoint directory already exists: {}",
            dir.display()
        )));
    }
    fs::create_dir(dir).map_err(|e| AcftError::io(dir, e))?;

    let mut checkpoint = Checkpoint {
        dir: dir.to_path_buf(),
        document,
        source: String::new(),
    };
    write_checkpoint(&mut checkpoint)?;
    Ok(checkpoint)
}

/// Every checkpoint directly under the work root, sorted by directory name.
///
/// Checkpoints whose document fails to parse are skipped.
pub fn scan_checkpoints(ctx: &AcftContext) -> Result<Vec<Checkpoint>> {
    let work = ctx.require_work("scan checkpoints")?;
    let entries = fs::read_dir(work).map_err(|e| AcftError::io(work, e))?;

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && path.join(CHECKPOINT_FILE).exists())
        .collect();
    dirs.sort();

    let mut checkpoints = Vec::with_capacity(dirs.len());
    for dir in dirs {
        match read_checkpoint(&dir) {
            Ok(checkpoint) => checkpoints.push(checkpoint),
            Err(e) if e.is_format() => {
                debug!(dir = %dir.display(), error = %e, "skipping malformed checkpoint");
            }
            Err(e) => return Err(e),
        }
    }

    debug!(count = checkpoints.len(), "scanned checkpoints");
    Ok(checkpoints)
}
