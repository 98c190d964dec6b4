//! Whole-pipeline checks over a handful of representative checklists.

use super::{DiagramLayout, LayoutConfig, SegmentKind, SlotAssignment, TreeLayout};
use crate::tree::{build_forest, ContainerTree, Side, TaskRecord, ROOT_ID};

fn record(container: &str, order: u64, depth: i64, completed: bool, text: &str) -> TaskRecord {
    TaskRecord::new(container, order, text)
        .at_depth(depth)
        .done(completed)
}

fn from_shape(container: &str, shape: &[(i64, bool)]) -> Vec<TaskRecord> {
    shape
        .iter()
        .enumerate()
        .map(|(i, &(depth, done))| record(container, i as u64, depth, done, &format!("t{i}")))
        .collect()
}

fn fixtures() -> Vec<Vec<TaskRecord>> {
    let mut mixed = from_shape(
        "projects/garden.md",
        &[
            (0, true),
            (1, true),
            (2, true),
            (1, true),
            (0, false),
            (1, true),
            (1, false),
            (3, false),
            (0, true),
        ],
    );
    mixed.extend(from_shape(
        "inbox.md",
        &[(2, false), (0, false), (1, false), (1, true), (0, true), (0, false)],
    ));
    mixed.extend(from_shape("notes/one.md", &[(0, false)]));

    vec![
        from_shape("a.md", &[(0, false)]),
        from_shape("a.md", &[(0, true), (1, true)]),
        from_shape("a.md", &[(0, false), (1, false), (2, true), (2, false), (0, false)]),
        from_shape("deep.md", &[(0, true), (1, true), (2, true), (3, true), (4, true)]),
        mixed,
    ]
}

fn diagram(records: &[TaskRecord]) -> DiagramLayout {
    DiagramLayout::from_records(records, &LayoutConfig::default()).unwrap()
}

#[test]
fn one_trunk_per_node_and_one_branch_per_task() {
    for records in fixtures() {
        let diagram = diagram(&records);
        assert_eq!(diagram.count(SegmentKind::Trunk), diagram.nodes.len());
        assert_eq!(
            diagram.count(SegmentKind::Branch),
            diagram.nodes.len() - diagram.containers.len()
        );
    }
}

#[test]
fn done_subtrees_are_done_all_the_way_down() {
    for records in fixtures() {
        for tree in build_forest(&records).unwrap() {
            for node in &tree.nodes {
                if !node.subtree_done {
                    continue;
                }
                assert!(node.completed, "{} done but not completed", node.id);
                for &child in tree.children_of(node.index) {
                    assert!(tree.nodes[child].subtree_done, "{} has open child", node.id);
                }
            }
        }
    }
}

#[test]
fn side_weights_stay_within_largest_top_level_subtree() {
    for records in fixtures() {
        for tree in build_forest(&records).unwrap() {
            let heaviest = tree
                .children_of(ROOT_ID)
                .iter()
                .map(|&k| tree.nodes[k].subtree_size)
                .max()
                .unwrap_or(0);
            assert!(tree.balance.imbalance() <= heaviest);

            let total: usize = tree
                .children_of(ROOT_ID)
                .iter()
                .map(|&k| tree.nodes[k].subtree_size)
                .sum();
            assert_eq!(tree.balance.left_weight + tree.balance.right_weight, total);
        }
    }
}

#[test]
fn sibling_slots_increase_in_document_order() {
    for records in fixtures() {
        for tree in build_forest(&records).unwrap() {
            let slots = SlotAssignment::compute(&tree);
            for node in &tree.nodes {
                let kids = tree.children_of(node.index);
                for side in [Side::Left, Side::Right] {
                    let centers: Vec<f64> = kids
                        .iter()
                        .filter(|&&k| tree.nodes[k].side == side)
                        .map(|&k| slots.center(k))
                        .collect();
                    assert!(
                        centers.windows(2).all(|pair| pair[0] < pair[1]),
                        "{:?} under {}",
                        centers,
                        node.id
                    );
                }
            }
        }
    }
}

#[test]
fn layout_is_deterministic() {
    for records in fixtures() {
        let first = diagram(&records);
        let second = diagram(&records);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

#[test]
fn nothing_crosses_container_boundaries() {
    for records in fixtures() {
        let diagram = diagram(&records);
        let container_of = |index: usize| diagram.nodes[index].container_id.as_str();

        for segment in &diagram.segments {
            if let Some(to) = segment.to_node {
                assert_eq!(container_of(segment.from_node), container_of(to));
            }
        }
        for node in &diagram.nodes {
            if let Some(parent) = node.parent {
                assert_eq!(container_of(parent), node.container_id);
            }
        }
        for span in &diagram.containers {
            let right_edge = span.x_offset + span.bounding_box.width;
            for node in diagram.container_nodes(span) {
                assert!(node.x >= span.x_offset && node.x <= right_edge);
            }
        }
    }
}

#[test]
fn single_open_task() {
    let records = vec![record("a.md", 0, 0, false, "A")];
    let tree = ContainerTree::from_records("a.md", &records).unwrap();
    let layout = TreeLayout::from_tree(&tree, &LayoutConfig::default());

    assert_eq!(tree.nodes.len(), 2);
    assert_eq!(tree.nodes[1].side, Side::Left);
    assert_eq!(layout.count(SegmentKind::Trunk), 2);
    assert_eq!(layout.count(SegmentKind::Branch), 1);
    assert_eq!(layout.count(SegmentKind::Merge), 0);
}

#[test]
fn completed_chain_merges_back_at_its_deepest_row() {
    let records = vec![
        record("a.md", 0, 0, true, "A"),
        record("a.md", 1, 1, true, "A1"),
    ];
    let tree = ContainerTree::from_records("a.md", &records).unwrap();
    let config = LayoutConfig::default();
    let layout = TreeLayout::from_tree(&tree, &config);

    assert!(tree.nodes[1].subtree_done);
    let deepest_row = config.row_y(1);

    let trunk_a = layout
        .segments
        .iter()
        .find(|s| s.kind == SegmentKind::Trunk && s.from_node == 1)
        .unwrap();
    assert_eq!(trunk_a.y2, deepest_row);

    let merges: Vec<_> = layout
        .segments
        .iter()
        .filter(|s| s.kind == SegmentKind::Merge)
        .collect();
    assert_eq!(merges.len(), 2);

    let a1_to_a = merges.iter().find(|s| s.from_node == 2).unwrap();
    assert_eq!(a1_to_a.to_node, Some(1));
    assert_eq!(a1_to_a.y1, deepest_row);
    assert_eq!(a1_to_a.x2, layout.nodes[1].x);

    let a_to_root = merges.iter().find(|s| s.from_node == 1).unwrap();
    assert_eq!(a_to_root.to_node, Some(ROOT_ID));
    assert_eq!(a_to_root.y1, deepest_row);
    assert_eq!(a_to_root.x2, layout.root_x);
}

#[test]
fn equal_siblings_split_left_then_right() {
    let records = vec![
        record("a.md", 0, 0, false, "A"),
        record("a.md", 1, 0, false, "B"),
    ];
    let tree = ContainerTree::from_records("a.md", &records).unwrap();
    assert_eq!(tree.nodes[1].side, Side::Left);
    assert_eq!(tree.nodes[2].side, Side::Right);
}

#[test]
fn skipped_level_attaches_under_root() {
    let records = vec![
        record("a.md", 0, 0, false, "A"),
        record("a.md", 1, 2, false, "deep"),
    ];
    let tree = ContainerTree::from_records("a.md", &records).unwrap();
    let layout = TreeLayout::from_tree(&tree, &LayoutConfig::default());

    assert_eq!(tree.nodes[2].parent, None);
    assert_eq!(tree.children_of(ROOT_ID), &[1, 2]);
    // Balanced as a second top-level task: A took the left side.
    assert_eq!(tree.nodes[2].side, Side::Right);

    let branch = layout
        .segments
        .iter()
        .find(|s| s.kind == SegmentKind::Branch && s.to_node == Some(2))
        .unwrap();
    assert_eq!(branch.from_node, ROOT_ID);
    assert_eq!(branch.y1, layout.nodes[2].y);
}
