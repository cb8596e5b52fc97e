//! Orient command - summarises a checkpoint and its relationships

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use super::common::{print_json, split_list};
use crate::checkpoints::LedgerEntry;
use crate::config::AcftContext;
use crate::fs::{load_checkpoint, scan_checkpoints};
use crate::parser::FrontmatterValue;
use crate::relations::{gather_relationships, Relationship, Relationships};
use crate::utils::render_table;

const LEDGER_PREVIEW: usize = 5;

#[derive(Serialize)]
struct Orientation {
    checkpoint: String,
    name: String,
    #[serde(rename = "VALID")]
    valid: Option<FrontmatterValue>,
    #[serde(rename = "LIFECYCLE")]
    lifecycle: Option<FrontmatterValue>,
    #[serde(rename = "SIGNAL")]
    signal: Option<FrontmatterValue>,
    latest_log: Option<String>,
    status_headline: String,
    manifest_ledger: Vec<LedgerEntry>,
    relationships: Relationships,
    #[serde(skip_serializing_if = "Option::is_none")]
    sections: Option<BTreeMap<String, String>>,
}

pub fn execute(
    ctx: &AcftContext,
    path: Option<&str>,
    json: bool,
    sections: &[String],
    depth: usize,
) -> Result<bool> {
    let checkpoint = load_checkpoint(ctx, path)?;
    let universe = scan_checkpoints(ctx)?;
    let relationships = gather_relationships(ctx, &checkpoint, &universe, depth);

    let requested: Vec<String> = split_list(sections)
        .into_iter()
        .map(|name| name.to_uppercase())
        .collect();
    let document = &checkpoint.document;
    let field = |key: &str| document.frontmatter.get(key).cloned();

    let orientation = Orientation {
        checkpoint: ctx.to_rooted(&checkpoint.dir),
        name: checkpoint.name().to_string(),
        valid: field("VALID"),
        lifecycle: field("LIFECYCLE"),
        signal: field("SIGNAL"),
        latest_log: document
            .log_entries()
            .pop()
            .map(|entry| entry.raw_timestamp),
        status_headline: document.status_headline(),
        manifest_ledger: document.manifest_ledger(),
        relationships,
        sections: (!requested.is_empty()).then(|| {
            requested
                .iter()
                .map(|name| (name.clone(), document.section(name).to_string()))
                .collect()
        }),
    };

    if json {
        print_json(&orientation)?;
        return Ok(true);
    }

    println!("Checkpoint: {}", orientation.checkpoint);
    println!(
        "VALID: {}  LIFECYCLE: {}  SIGNAL: {}",
        display_field(&orientation.valid),
        display_field(&orientation.lifecycle),
        display_field(&orientation.signal)
    );
    println!(
        "Latest LOG: {}",
        orientation.latest_log.as_deref().unwrap_or("—")
    );
    let headline = orientation.status_headline.as_str();
    println!(
        "STATUS: {}",
        if headline.is_empty() { "∅" } else { headline }
    );

    let ledger = &orientation.manifest_ledger;
    if ledger.is_empty() {
        println!("MANIFEST LEDGER: ∅");
    } else {
        println!("MANIFEST LEDGER:");
        for entry in ledger.iter().take(LEDGER_PREVIEW) {
            if entry.purpose.is_empty() {
                println!("- {} -> {}", entry.name, entry.path);
            } else {
                println!("- {} -> {} -> {}", entry.name, entry.path, entry.purpose);
            }
        }
        if ledger.len() > LEDGER_PREVIEW {
            println!("... ({} more)", ledger.len() - LEDGER_PREVIEW);
        }
    }

    for (label, entries) in orientation.relationships.kinds() {
        println!("{label}:");
        if entries.is_empty() {
            println!("  ∅");
            continue;
        }
        for line in relationship_table(entries).lines() {
            println!("  {line}");
        }
    }

    if !requested.is_empty() {
        println!("\n---");
        for name in &requested {
            println!("# {name}");
            println!("{}", document.section(name).trim());
            println!();
        }
    }

    Ok(true)
}

fn display_field(value: &Option<FrontmatterValue>) -> String {
    value
        .as_ref()
        .map_or_else(|| "∅".to_string(), ToString::to_string)
}

fn relationship_table(entries: &[Relationship]) -> String {
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|rel| {
            vec![
                rel.checkpoint.clone(),
                display_field(&rel.valid),
                display_field(&rel.lifecycle),
                display_field(&rel.signal),
                rel.distance.to_string(),
            ]
        })
        .collect();
    render_table(&["CHECKPOINT", "VALID", "LIFE", "SIGNAL", "DIST"], &rows)
}
