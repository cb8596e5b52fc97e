//! Relationship resolution between checkpoints.
//!
//! Two independent signals relate checkpoints: `DELEGATE_OF` links and the
//! `{branch}_v{version}_{step}` naming convention. Either one is enough to
//! place a checkpoint in the target's ancestry, peers or children.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::checkpoints::{Checkpoint, CheckpointName};
use crate::config::AcftContext;
use crate::parser::FrontmatterValue;

/// One related checkpoint and its distance from the target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    #[serde(rename = "LIFECYCLE")]
    pub lifecycle: Option<FrontmatterValue>,
    #[serde(rename = "SIGNAL")]
    pub signal: Option<FrontmatterValue>,
    #[serde(rename = "VALID")]
    pub valid: Option<FrontmatterValue>,
    pub checkpoint: String,
    pub distance: usize,
    #[serde(skip)]
    pub dir: PathBuf,
}

impl Relationship {
    fn new(ctx: &AcftContext, checkpoint: &Checkpoint, distance: usize) -> Self {
        let field = |key: &str| checkpoint.document.frontmatter.get(key).cloned();
        Self {
            lifecycle: field("LIFECYCLE"),
            signal: field("SIGNAL"),
            valid: field("VALID"),
            checkpoint: ctx.to_rooted(&checkpoint.dir),
            distance,
            dir: checkpoint.dir.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Relationships {
    pub ancestry: Vec<Relationship>,
    pub peers: Vec<Relationship>,
    pub children: Vec<Relationship>,
}

impl Relationships {
    /// `(label, entries)` pairs in display order.
    pub fn kinds(&self) -> [(&'static str, &[Relationship]); 3] {
        [
            ("Ancestry", self.ancestry.as_slice()),
            ("Peers", self.peers.as_slice()),
            ("Children", self.children.as_slice()),
        ]
    }
}

/// Resolve a checkpoint's `DELEGATE_OF`, ignoring unresolvable values.
fn delegate_dir(ctx: &AcftContext, checkpoint: &Checkpoint) -> Option<PathBuf> {
    let raw = checkpoint.document.delegate_of()?;
    ctx.expand(raw).ok()
}

/// Whether `candidate` follows `node` on the same branch: a later version,
/// or the same version with a later step.
fn succeeds_on_branch(candidate: &Checkpoint, node: &Path) -> bool {
    let node_name = node
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(CheckpointName::parse);
    match (candidate.parsed_name(), node_name) {
        (Some(candidate), Some(node)) => {
            candidate.compare_on_branch(&node) == Some(Ordering::Greater)
        }
        _ => false,
    }
}

/// Collect ancestry, peers and children of `target` among `universe`.
///
/// With `depth > 1`, children are followed breadth-first until `depth` is
/// reached; every walked node is recorded with its distance from the target.
pub fn gather_relationships(
    ctx: &AcftContext,
    target: &Checkpoint,
    universe: &[Checkpoint],
    depth: usize,
) -> Relationships {
    let mut rel = Relationships::default();
    let target_delegate = target.document.delegate_of();
    let target_delegate_dir = delegate_dir(ctx, target);
    let target_name = target.parsed_name();

    for cp in universe.iter().filter(|cp| !cp.is_at(&target.dir)) {
        let cp_delegate_dir = delegate_dir(ctx, cp);

        if target_delegate_dir.as_deref() == Some(cp.dir.as_path()) {
            rel.ancestry.push(Relationship::new(ctx, cp, 1));
        } else if cp_delegate_dir.as_deref() == Some(target.dir.as_path()) {
            rel.children.push(Relationship::new(ctx, cp, 1));
        } else if target_delegate.is_some() && cp.document.delegate_of() == target_delegate {
            rel.peers.push(Relationship::new(ctx, cp, 1));
        }

        let order = match (&target_name, cp.parsed_name()) {
            (Some(target_name), Some(name)) => name.compare_on_branch(target_name),
            _ => None,
        };
        match order {
            Some(Ordering::Less) => rel.ancestry.push(Relationship::new(ctx, cp, 1)),
            Some(Ordering::Greater) => rel.children.push(Relationship::new(ctx, cp, 1)),
            _ => {}
        }
    }

    if depth > 1 {
        let descendants = walk_descendants(ctx, target, universe, &rel.children, depth);
        rel.children.extend(descendants);
    }

    rel.ancestry = dedupe_sorted(rel.ancestry);
    rel.peers = dedupe_sorted(rel.peers);
    rel.children = dedupe_sorted(rel.children);

    debug!(
        target = %target.name(),
        ancestry = rel.ancestry.len(),
        peers = rel.peers.len(),
        children = rel.children.len(),
        "gathered relationships"
    );
    rel
}

fn walk_descendants(
    ctx: &AcftContext,
    target: &Checkpoint,
    universe: &[Checkpoint],
    children: &[Relationship],
    depth: usize,
) -> Vec<Relationship> {
    let mut found = Vec::new();
    let mut visited: HashSet<PathBuf> = HashSet::from([target.dir.clone()]);
    visited.extend(children.iter().map(|child| child.dir.clone()));
    let mut queue: VecDeque<(PathBuf, usize)> = children
        .iter()
        .map(|child| (child.dir.clone(), child.distance))
        .collect();

    while let Some((node, distance)) = queue.pop_front() {
        if distance >= depth {
            continue;
        }
        for cp in universe {
            if visited.contains(&cp.dir) {
                continue;
            }
            let delegates_here = delegate_dir(ctx, cp).as_deref() == Some(node.as_path());
            if delegates_here || succeeds_on_branch(cp, &node) {
                visited.insert(cp.dir.clone());
                found.push(Relationship::new(ctx, cp, distance + 1));
                queue.push_back((cp.dir.clone(), distance + 1));
            }
        }
    }

    found
}

/// Keep the closest entry per path, ordered by `(distance, checkpoint)`.
fn dedupe_sorted(entries: Vec<Relationship>) -> Vec<Relationship> {
    let mut closest: BTreeMap<String, Relationship> = BTreeMap::new();
    for entry in entries {
        match closest.get(&entry.checkpoint) {
            Some(existing) if existing.distance <= entry.distance => {}
            _ => {
                closest.insert(entry.checkpoint.clone(), entry);
            }
        }
    }

    let mut sorted: Vec<Relationship> = closest.into_values().collect();
    sorted.sort_by(|a, b| {
        a.distance
            .cmp(&b.distance)
            .then_with(|| a.checkpoint.cmp(&b.checkpoint))
    });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoints::CheckpointDocument;
    use crate::paths::{CHECKPOINT_FILE, PROJECT_MARKER, WORK_MARKER};
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        ctx: AcftContext,
        universe: Vec<Checkpoint>,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let root = temp.path().canonicalize().unwrap();
            fs::write(root.join(PROJECT_MARKER), "").unwrap();
            fs::write(root.join(WORK_MARKER), "").unwrap();
            let ctx = AcftContext::discover(&root);
            Self {
                _temp: temp,
                ctx,
                universe: Vec::new(),
            }
        }

        fn add(&mut self, name: &str, delegate_of: Option<&str>) -> &mut Self {
            let mut frontmatter = "VALID: false\nLIFECYCLE: active\nSIGNAL: pending".to_string();
            if let Some(delegate) = delegate_of {
                frontmatter.push_str(&format!("\nDELEGATE_OF: {delegate}"));
            }
            let text = format!("---\n{frontmatter}\n---\n\n# STATUS\n");
            let dir = self.ctx.roots.work.clone().unwrap().join(name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(CHECKPOINT_FILE), &text).unwrap();
            self.universe.push(Checkpoint {
                dir,
                document: CheckpointDocument::parse(&text).unwrap(),
                source: text,
            });
            self
        }

        fn relations(&self, name: &str, depth: usize) -> Relationships {
            let target = self
                .universe
                .iter()
                .find(|cp| cp.name() == name)
                .unwrap();
            gather_relationships(&self.ctx, target, &self.universe, depth)
        }
    }

    fn names(entries: &[Relationship]) -> Vec<(&str, usize)> {
        entries
            .iter()
            .map(|e| (e.checkpoint.as_str(), e.distance))
            .collect()
    }

    #[test]
    fn test_naming_relationships() {
        let mut fx = Fixture::new();
        fx.add("alpha_v1_01", None)
            .add("alpha_v1_02", None)
            .add("alpha_v2_01", None)
            .add("beta_v1_01", None);

        let rel = fx.relations("alpha_v1_02", 1);
        assert_eq!(names(&rel.ancestry), vec![("::WORK/alpha_v1_01", 1)]);
        assert_eq!(names(&rel.children), vec![("::WORK/alpha_v2_01", 1)]);
        assert!(rel.peers.is_empty());
    }

    #[test]
    fn test_delegation_relationships() {
        let mut fx = Fixture::new();
        fx.add("plan_v1_01", None)
            .add("auth_v1_01", Some("::WORK/plan_v1_01"))
            .add("data_v1_01", Some("::WORK/plan_v1_01"));

        let auth = fx.relations("auth_v1_01", 1);
        assert_eq!(names(&auth.ancestry), vec![("::WORK/plan_v1_01", 1)]);
        assert_eq!(names(&auth.peers), vec![("::WORK/data_v1_01", 1)]);

        let plan = fx.relations("plan_v1_01", 1);
        assert_eq!(
            names(&plan.children),
            vec![("::WORK/auth_v1_01", 1), ("::WORK/data_v1_01", 1)]
        );
    }

    #[test]
    fn test_peer_symmetry() {
        let mut fx = Fixture::new();
        fx.add("root_v1_01", None)
            .add("left_v1_01", Some("::WORK/root_v1_01"))
            .add("right_v1_01", Some("::WORK/root_v1_01"));

        let left = fx.relations("left_v1_01", 1);
        let right = fx.relations("right_v1_01", 1);
        assert_eq!(names(&left.peers), vec![("::WORK/right_v1_01", 1)]);
        assert_eq!(names(&right.peers), vec![("::WORK/left_v1_01", 1)]);
    }

    #[test]
    fn test_both_signals_dedupe() {
        let mut fx = Fixture::new();
        fx.add("alpha_v1_01", None)
            .add("alpha_v1_02", Some("::WORK/alpha_v1_01"));

        let rel = fx.relations("alpha_v1_02", 1);
        assert_eq!(names(&rel.ancestry), vec![("::WORK/alpha_v1_01", 1)]);
    }

    #[test]
    fn test_depth_walk() {
        let mut fx = Fixture::new();
        fx.add("root_v1_01", None)
            .add("mid_v1_01", Some("::WORK/root_v1_01"))
            .add("leaf_v1_01", Some("::WORK/mid_v1_01"))
            .add("tip_v1_01", Some("::WORK/leaf_v1_01"));

        let shallow = fx.relations("root_v1_01", 1);
        assert_eq!(names(&shallow.children), vec![("::WORK/mid_v1_01", 1)]);

        let two = fx.relations("root_v1_01", 2);
        assert_eq!(
            names(&two.children),
            vec![("::WORK/mid_v1_01", 1), ("::WORK/leaf_v1_01", 2)]
        );

        let deep = fx.relations("root_v1_01", 5);
        assert_eq!(deep.children.len(), 3);
        assert_eq!(deep.children[2].distance, 3);
    }

    #[test]
    fn test_delegation_cycle_terminates() {
        let mut fx = Fixture::new();
        fx.add("a_v1_01", Some("::WORK/b_v1_01"))
            .add("b_v1_01", Some("::WORK/a_v1_01"));

        let rel = fx.relations("a_v1_01", 10);
        assert_eq!(names(&rel.ancestry), vec![("::WORK/b_v1_01", 1)]);
        assert!(rel.children.is_empty());
    }

    #[test]
    fn test_relationship_serialization() {
        let mut fx = Fixture::new();
        fx.add("alpha_v1_01", None).add("alpha_v1_02", None);

        let rel = fx.relations("alpha_v1_02", 1);
        let value = serde_json::to_value(&rel.ancestry[0]).unwrap();
        assert_eq!(value["VALID"], serde_json::json!(false));
        assert_eq!(value["LIFECYCLE"], "active");
        assert_eq!(value["distance"], 1);
        assert!(value.get("dir").is_none());
    }
}
