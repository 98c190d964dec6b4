use log::debug;

use super::{Node, NodeId, ROOT_DEPTH};

/// Recover each node's parent from the indentation depths alone.
///
/// Single forward pass over a stack of `(depth, index)` entries. Entries at or
/// below the current depth are popped; the parent is the nearest remaining entry
/// exactly one level up. If no such entry exists the parent stays `None` and the
/// node is treated as a direct child of the container root downstream.
pub fn resolve_parents(nodes: &mut [Node]) {
    let mut stack: Vec<(i64, NodeId)> = Vec::with_capacity(nodes.len());

    for index in 0..nodes.len() {
        let depth = nodes[index].depth;

        if depth == ROOT_DEPTH {
            nodes[index].parent = None;
            stack.push((depth, index));
            continue;
        }

        while stack.last().is_some_and(|&(open, _)| open >= depth) {
            stack.pop();
        }

        let parent = stack
            .iter()
            .rev()
            .find(|&&(open, _)| open == depth - 1)
            .map(|&(_, candidate)| candidate);

        if parent.is_none() {
            debug!(
                "task {} at depth {} has no open task at depth {}; attaching under the container root",
                nodes[index].id,
                depth,
                depth - 1
            );
        }

        nodes[index].parent = parent;
        stack.push((depth, index));
    }
}

/// Parent index to ordered child indices, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildrenMap {
    children: Vec<Vec<NodeId>>,
}

impl ChildrenMap {
    /// Group nodes by the trunk they branch off. Orphans land under the root.
    pub fn build(nodes: &[Node]) -> Self {
        let mut children = vec![Vec::new(); nodes.len()];
        for node in nodes {
            if let Some(parent) = node.attach_point() {
                children[parent].push(node.index);
            }
        }
        Self { children }
    }

    pub fn children(&self, parent: NodeId) -> &[NodeId] {
        self.children.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Children before parents, siblings in document order.
    pub fn post_order(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.children.len());
        if start >= self.children.len() {
            return order;
        }

        let mut stack = vec![(start, 0usize)];
        while let Some((id, next)) = stack.pop() {
            let kids = self.children(id);
            if next < kids.len() {
                stack.push((id, next + 1));
                stack.push((kids[next], 0));
            } else {
                order.push(id);
            }
        }
        order
    }

    /// Parents before children, siblings in document order.
    pub fn pre_order(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.children.len());
        if start >= self.children.len() {
            return order;
        }

        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }
}
