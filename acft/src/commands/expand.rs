//! Expand command - prints rooted paths as absolute paths

use anyhow::Result;

use crate::config::AcftContext;

/// Expand each path; unless `allow_future`, every result must exist.
pub fn execute(
    ctx: &AcftContext,
    paths: &[String],
    resolve_symlinks: bool,
    allow_future: bool,
) -> Result<bool> {
    let mut outputs = Vec::with_capacity(paths.len());

    for item in paths {
        let expanded = ctx.expand_with(item, resolve_symlinks)?;
        if !allow_future && !expanded.exists() {
            eprintln!(
                "acft path error: Expanded path does not exist: {}",
                expanded.display()
            );
            eprintln!("\nIf you want to expand a future path that doesn't exist yet, use:");
            eprintln!("  acft expand --allow-future {item}");
            eprintln!("  acft expand -f {item}");
            return Ok(false);
        }
        outputs.push(expanded.display().to_string());
    }

    println!("{}", outputs.join("\n"));
    Ok(true)
}
