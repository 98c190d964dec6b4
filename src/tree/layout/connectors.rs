use super::{ConnectorSegment, LayoutConfig, SegmentKind};
use crate::tree::{ContainerTree, Node};

/// Trunks for every node, then branch elbows for every task, then dashed
/// merge-backs for every completed subtree.
pub(super) fn derive(
    tree: &ContainerTree,
    positions: &[(f64, f64)],
    bottom_y: f64,
    config: &LayoutConfig,
) -> Vec<ConnectorSegment> {
    let mut segments = Vec::with_capacity(tree.nodes.len() * 3);

    for node in &tree.nodes {
        let (x, y) = positions[node.index];
        let end_y = if node.is_root() || !node.subtree_done {
            bottom_y
        } else {
            config.row_y(node.subtree_max_depth)
        };
        segments.push(ConnectorSegment {
            kind: SegmentKind::Trunk,
            from_node: node.index,
            to_node: None,
            x1: x,
            y1: y,
            x2: x,
            y2: end_y,
            dashed: false,
            color_index: config.color_index(node.depth),
        });
    }

    for node in &tree.nodes {
        let Some(parent) = node.attach_point() else {
            continue;
        };
        let (x, y) = positions[node.index];
        let (parent_x, _) = positions[parent];
        segments.push(ConnectorSegment {
            kind: SegmentKind::Branch,
            from_node: parent,
            to_node: Some(node.index),
            x1: parent_x,
            y1: y,
            x2: x,
            y2: y,
            dashed: false,
            color_index: config.color_index(tree.nodes[parent].depth),
        });
    }

    for node in tree.nodes.iter().filter(|node| merges_back(node)) {
        let Some(parent) = node.attach_point() else {
            continue;
        };
        let (x, _) = positions[node.index];
        let (parent_x, _) = positions[parent];
        let y = config.row_y(node.subtree_max_depth);
        segments.push(ConnectorSegment {
            kind: SegmentKind::Merge,
            from_node: node.index,
            to_node: Some(parent),
            x1: x,
            y1: y,
            x2: parent_x,
            y2: y,
            dashed: true,
            color_index: config.color_index(node.depth),
        });
    }

    segments
}

fn merges_back(node: &Node) -> bool {
    !node.is_root() && node.subtree_done
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::layout::TreeLayout;
    use crate::tree::TaskRecord;

    fn layout(tasks: &[(i64, bool)]) -> TreeLayout {
        let records: Vec<TaskRecord> = tasks
            .iter()
            .enumerate()
            .map(|(i, &(depth, completed))| {
                TaskRecord::new("doc", i as u64, format!("t{i}"))
                    .at_depth(depth)
                    .done(completed)
            })
            .collect();
        let tree = ContainerTree::from_records("doc", &records).unwrap();
        TreeLayout::from_tree(&tree, &LayoutConfig::default())
    }

    fn of_kind(layout: &TreeLayout, kind: SegmentKind) -> Vec<&ConnectorSegment> {
        layout.segments.iter().filter(|s| s.kind == kind).collect()
    }

    #[test]
    fn open_trunks_reach_the_bottom() {
        let layout = layout(&[(0, false), (1, true)]);
        let trunks = of_kind(&layout, SegmentKind::Trunk);

        assert_eq!(trunks.len(), 3);
        assert_eq!(trunks[0].y2, layout.bottom_y);
        assert_eq!(trunks[1].y2, layout.bottom_y);
        // The completed leaf stops on its own row.
        assert_eq!(trunks[2].y1, trunks[2].y2);
        assert!(trunks.iter().all(|t| t.x1 == t.x2 && !t.dashed));
    }

    #[test]
    fn root_trunk_ignores_completion() {
        let layout = layout(&[(0, true)]);
        let trunk = of_kind(&layout, SegmentKind::Trunk)[0];
        assert_eq!(trunk.from_node, 0);
        assert_eq!(trunk.y1, 0.0);
        assert_eq!(trunk.y2, layout.bottom_y);
    }

    #[test]
    fn branch_taps_parent_trunk_at_child_row() {
        let layout = layout(&[(0, false), (1, false)]);
        let branches = of_kind(&layout, SegmentKind::Branch);

        assert_eq!(branches.len(), 2);
        let elbow = branches[1];
        assert_eq!(elbow.from_node, 1);
        assert_eq!(elbow.to_node, Some(2));
        assert_eq!(elbow.x1, layout.nodes[1].x);
        assert_eq!(elbow.x2, layout.nodes[2].x);
        assert_eq!(elbow.y1, layout.nodes[2].y);
        assert_eq!(elbow.y2, layout.nodes[2].y);
        assert_eq!(elbow.color_index, layout.nodes[1].color_index);
    }

    #[test]
    fn merge_only_for_completed_subtrees() {
        let layout = layout(&[(0, true), (1, false), (0, true)]);
        let merges = of_kind(&layout, SegmentKind::Merge);

        assert_eq!(merges.len(), 1);
        assert_eq!(merges[0].from_node, 3);
        assert_eq!(merges[0].to_node, Some(0));
        assert!(merges[0].dashed);
        assert_eq!(merges[0].x2, layout.root_x);
    }

    #[test]
    fn orphan_connects_to_root_trunk() {
        let layout = layout(&[(0, false), (2, true)]);
        let branch = of_kind(&layout, SegmentKind::Branch)
            .into_iter()
            .find(|s| s.to_node == Some(2))
            .unwrap();
        assert_eq!(branch.from_node, 0);
        assert_eq!(branch.x1, layout.root_x);

        let merge = of_kind(&layout, SegmentKind::Merge)[0];
        assert_eq!(merge.from_node, 2);
        assert_eq!(merge.to_node, Some(0));
    }
}
