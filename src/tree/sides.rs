use serde::Serialize;

use super::{ChildrenMap, Node, Side, ROOT_ID};

/// Total subtree weight placed on each side of the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideBalance {
    pub left_weight: usize,
    pub right_weight: usize,
}

impl SideBalance {
    #[allow(dead_code)]
    pub fn imbalance(&self) -> usize {
        self.left_weight.abs_diff(self.right_weight)
    }
}

/// Spread the root's direct children over the left and right side, then let
/// every descendant inherit its top-level ancestor's side.
///
/// Greedy: each child goes to the lighter side at the moment it is visited,
/// left winning ties. Only the first level is balanced.
pub fn assign_sides(nodes: &mut [Node], children: &ChildrenMap) -> SideBalance {
    let mut balance = SideBalance::default();
    let Some(root) = nodes.get_mut(ROOT_ID) else {
        return balance;
    };
    root.side = Side::Root;

    for &top in children.children(ROOT_ID) {
        let weight = nodes[top].subtree_size.max(1);
        let side = if balance.left_weight <= balance.right_weight {
            balance.left_weight += weight;
            Side::Left
        } else {
            balance.right_weight += weight;
            Side::Right
        };

        for id in children.pre_order(top) {
            nodes[id].side = side;
        }
    }

    balance
}
