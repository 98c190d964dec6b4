use crate::tree::{ContainerTree, NodeId, Side, ROOT_ID};

/// Horizontal slot allocation for one container, local to each side.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotAssignment {
    /// Leaf-slots occupied by each subtree (1 for a leaf).
    pub widths: Vec<usize>,
    /// Centre of each node's span, measured outward from the root on its side.
    pub centers: Vec<f64>,
    pub left_slots: usize,
    pub right_slots: usize,
}

impl SlotAssignment {
    pub fn compute(tree: &ContainerTree) -> Self {
        let widths = subtree_widths(tree);
        let mut centers = vec![0.0; tree.nodes.len()];
        let mut left_slots = 0;
        let mut right_slots = 0;

        for &top in tree.children_of(ROOT_ID) {
            let cursor = match tree.nodes[top].side {
                Side::Left => &mut left_slots,
                _ => &mut right_slots,
            };
            assign_slots(tree, &widths, &mut centers, top, *cursor);
            *cursor += widths[top];
        }

        Self {
            widths,
            centers,
            left_slots,
            right_slots,
        }
    }

    pub fn center(&self, id: NodeId) -> f64 {
        self.centers.get(id).copied().unwrap_or(0.5)
    }
}

fn subtree_widths(tree: &ContainerTree) -> Vec<usize> {
    let mut widths = vec![1; tree.nodes.len()];
    for id in tree.children.post_order(ROOT_ID) {
        let kids = tree.children_of(id);
        if !kids.is_empty() {
            widths[id] = kids.iter().map(|&kid| widths[kid]).sum::<usize>().max(1);
        }
    }
    widths
}

/// Give `start_id` the span starting at `start` and lay its descendants out
/// left to right inside it.
fn assign_slots(
    tree: &ContainerTree,
    widths: &[usize],
    centers: &mut [f64],
    start_id: NodeId,
    start: usize,
) {
    let mut stack = vec![(start_id, start)];
    while let Some((id, start)) = stack.pop() {
        centers[id] = start as f64 + widths[id] as f64 / 2.0;

        let mut cursor = start;
        for &kid in tree.children_of(id) {
            stack.push((kid, cursor));
            cursor += widths[kid];
        }
    }
}
