use super::{ChildrenMap, Node, ROOT_ID};

/// Fill in size, completion, deepest depth and last descendant for every subtree.
///
/// Walks the children map bottom-up with an explicit stack, so arbitrarily deep
/// checklists never touch the call stack.
pub fn aggregate_subtrees(nodes: &mut [Node], children: &ChildrenMap) {
    if nodes.is_empty() {
        return;
    }

    for id in children.post_order(ROOT_ID) {
        let mut size = 1;
        let mut done = nodes[id].completed;
        let mut max_depth = nodes[id].depth;
        let mut end = id;

        for &child in children.children(id) {
            let child = &nodes[child];
            size += child.subtree_size;
            done = done && child.subtree_done;
            max_depth = max_depth.max(child.subtree_max_depth);
            end = end.max(child.subtree_end);
        }

        let node = &mut nodes[id];
        node.subtree_size = size;
        node.subtree_done = done;
        node.subtree_max_depth = max_depth;
        node.subtree_end = end;
    }
}
