//! Relationship resolution over checkpoints created on disk

use acft::fs::scan_checkpoints;
use acft::relations::gather_relationships;

use super::helpers::*;

fn names(entries: &[acft::relations::Relationship]) -> Vec<(String, usize)> {
    entries
        .iter()
        .map(|rel| (rel.checkpoint.clone(), rel.distance))
        .collect()
}

#[test]
fn test_naming_convention_links_steps() {
    let project = TestProject::new();
    project.create("alpha_v1_01", None);
    project.create("alpha_v1_02", None);
    project.create("beta_v1_01", None);

    let ctx = project.ctx();
    let universe = scan_checkpoints(&ctx).unwrap();
    assert_eq!(universe.len(), 3);

    let target = project.load("alpha_v1_02");
    let rel = gather_relationships(&ctx, &target, &universe, 1);
    assert_eq!(
        names(&rel.ancestry),
        vec![("::WORK/alpha_v1_01".to_string(), 1)]
    );
    assert!(rel.peers.is_empty());
    assert!(rel.children.is_empty());

    let first = project.load("alpha_v1_01");
    let rel = gather_relationships(&ctx, &first, &universe, 1);
    assert_eq!(
        names(&rel.children),
        vec![("::WORK/alpha_v1_02".to_string(), 1)]
    );
}

#[test]
fn test_shared_delegate_makes_symmetric_peers() {
    let project = TestProject::new();
    project.create("root_v1_01", None);
    project.create("left_v1_01", Some("::WORK/root_v1_01"));
    project.create("right_v1_01", Some("::WORK/root_v1_01"));

    let ctx = project.ctx();
    let universe = scan_checkpoints(&ctx).unwrap();

    let left = gather_relationships(&ctx, &project.load("left_v1_01"), &universe, 1);
    let right = gather_relationships(&ctx, &project.load("right_v1_01"), &universe, 1);
    assert_eq!(names(&left.peers), vec![("::WORK/right_v1_01".to_string(), 1)]);
    assert_eq!(names(&right.peers), vec![("::WORK/left_v1_01".to_string(), 1)]);
    assert_eq!(names(&left.ancestry), vec![("::WORK/root_v1_01".to_string(), 1)]);

    let root = gather_relationships(&ctx, &project.load("root_v1_01"), &universe, 1);
    assert_eq!(
        names(&root.children),
        vec![
            ("::WORK/left_v1_01".to_string(), 1),
            ("::WORK/right_v1_01".to_string(), 1)
        ]
    );
}

#[test]
fn test_depth_walks_grandchildren() {
    let project = TestProject::new();
    project.create("root_v1_01", None);
    project.create("mid_v1_01", Some("::WORK/root_v1_01"));
    project.create("leaf_v1_01", Some("::WORK/mid_v1_01"));

    let ctx = project.ctx();
    let universe = scan_checkpoints(&ctx).unwrap();
    let root = project.load("root_v1_01");

    let shallow = gather_relationships(&ctx, &root, &universe, 1);
    assert_eq!(names(&shallow.children), vec![("::WORK/mid_v1_01".to_string(), 1)]);

    let deep = gather_relationships(&ctx, &root, &universe, 2);
    assert_eq!(
        names(&deep.children),
        vec![
            ("::WORK/mid_v1_01".to_string(), 1),
            ("::WORK/leaf_v1_01".to_string(), 2)
        ]
    );
}
