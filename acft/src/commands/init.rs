//! Init command - creates the project and work root markers

use anyhow::Result;
use colored::Colorize;

use crate::config::AcftContext;
use crate::fs::init_markers;

/// Create whichever root markers are missing from the cwd and its ancestors.
pub fn execute(ctx: &AcftContext) -> Result<bool> {
    let created = init_markers(&ctx.cwd)?;

    if created.is_empty() {
        println!("Configuration files already exist in this directory or parent directories.");
    } else {
        println!("{} Created: {}", "✓".green().bold(), created.join(", "));
    }
    Ok(true)
}
