//! New command - scaffolds a checkpoint under the work root

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde_json::{json, Value};

use super::common::{emit_event, split_list};
use crate::checkpoints::scaffold;
use crate::config::AcftContext;
use crate::events::{EventEmitter, EventType};
use crate::fs::{create_checkpoint, write_checkpoint};
use crate::paths::CHECKPOINT_FILE;
use crate::validation::validate_checkpoint_name;

/// Create `<work root>/<name>/CHECKPOINT.md` from the template.
///
/// With `no_open` the scaffold is left without its opening LOG entry.
pub fn execute(
    ctx: &AcftContext,
    name: &str,
    delegate_of: Option<&str>,
    tags: &[String],
    no_open: bool,
) -> Result<bool> {
    let work = ctx.require_work("create checkpoint")?.to_path_buf();
    let name = name.trim();
    validate_checkpoint_name(name)?;

    let delegate = match delegate_of {
        Some(raw) => {
            let dir = ctx.expand(raw)?;
            if !dir.join(CHECKPOINT_FILE).exists() {
                bail!("Delegate path does not contain CHECKPOINT.md");
            }
            Some(ctx.to_rooted(&dir))
        }
        None => None,
    };
    let tags = split_list(tags);

    let emitter = EventEmitter::new(ctx)?;
    let mut checkpoint = create_checkpoint(&work.join(name), scaffold(delegate.as_deref(), &tags))?;
    if !no_open {
        checkpoint
            .document
            .append_log_entry(&ctx.timestamp(), "CHECKPOINT scaffolding created");
        write_checkpoint(&mut checkpoint)?;
    }

    let mut payload: BTreeMap<&str, Value> = BTreeMap::new();
    if let Some(delegate) = &delegate {
        payload.insert("DELEGATE_OF", json!(delegate));
    }
    if !tags.is_empty() {
        payload.insert("TAGS", json!(tags));
    }
    emit_event(
        &emitter,
        EventType::CheckpointCreated,
        Some(&checkpoint.dir),
        payload,
    )?;

    println!("Created checkpoint at {}", ctx.to_rooted(&checkpoint.dir));
    Ok(true)
}
