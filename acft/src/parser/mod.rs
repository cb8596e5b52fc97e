//! Markdown and frontmatter parsing primitives.

pub mod frontmatter;
pub mod markdown;

pub use frontmatter::{Frontmatter, FrontmatterValue};
pub use markdown::{Section, Sections};
