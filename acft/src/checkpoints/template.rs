//! Scaffold for freshly created checkpoints.

use super::document::CheckpointDocument;
use crate::parser::{Frontmatter, FrontmatterValue, Sections};

const TEMPLATE_BODY: &str = "\
# STATUS
- Context recap: TODO
- Success criteria: TODO
- Exit criteria: TODO

# HARNESS
Summarise the current state, key deliverables, and risks. Cite rooted paths (e.g. ::THIS/ARTIFACTS/...).

# CONTEXT
Document the reasoning, evidence, and alternatives considered. Link to upstream/downstream checkpoints.

# MANIFEST
## MANIFEST LEDGER
- Placeholder -> ::THIS/ARTIFACTS/stub -> Replace once deliverables exist.

## Harness
```sh
# add verification commands here
```

## Dependencies
### CHECKPOINT DEPENDENCIES
- Owner ::WORK/example_v1_01 (active, VALID: false)

### SYSTEM DEPENDENCIES
- Dependency name - status / risk

# LOG
";

/// Build the initial document for a new checkpoint.
///
/// `delegate_of` must already be in rooted form. Empty `tags` are omitted.
pub fn scaffold(delegate_of: Option<&str>, tags: &[String]) -> CheckpointDocument {
    let mut frontmatter = Frontmatter::new();
    frontmatter.set("VALID", false);
    frontmatter.set("LIFECYCLE", "active");
    frontmatter.set("SIGNAL", "pending");
    if let Some(delegate_of) = delegate_of {
        frontmatter.set("DELEGATE_OF", delegate_of);
    }
    if !tags.is_empty() {
        frontmatter.set("TAGS", FrontmatterValue::from(tags.to_vec()));
    }

    CheckpointDocument {
        frontmatter,
        sections: Sections::parse(TEMPLATE_BODY),
    }
}
