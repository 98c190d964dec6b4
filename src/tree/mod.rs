use log::{debug, warn};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod aggregate;
pub mod layout;
pub mod sides;
pub mod topology;

pub use sides::SideBalance;
pub use topology::ChildrenMap;

/// Index of a node inside its container's node array.
pub type NodeId = usize;

/// Depth carried by the synthetic container root.
pub const ROOT_DEPTH: i64 = -1;

/// The container root always sits at index 0.
pub const ROOT_ID: NodeId = 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("container `{container}` has no task records")]
    EmptyContainer { container: String },
    #[error("container `{container}` does not start with a container root")]
    MissingRoot { container: String },
    #[error("container `{container}` has a second root at index {index}")]
    DuplicateRoot { container: String, index: NodeId },
    #[error("invalid layout setting `{field}`: {value}")]
    InvalidConfig { field: &'static str, value: String },
}

/// A checklist item as handed over by the extraction layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, deserialize_with = "lenient_depth")]
    pub depth: i64,
    #[serde(default)]
    pub source_order: u64,
    pub container_id: String,
}

#[allow(dead_code)]
impl TaskRecord {
    pub fn new(container_id: impl Into<String>, source_order: u64, text: impl Into<String>) -> Self {
        let container_id = container_id.into();
        Self {
            id: format!("{container_id}#{source_order}"),
            text: text.into(),
            completed: false,
            depth: 0,
            source_order,
            container_id,
        }
    }

    pub fn at_depth(mut self, depth: i64) -> Self {
        self.depth = depth;
        self
    }

    pub fn done(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// Maps an arbitrary numeric depth onto a usable one; anything that is not a
/// non-negative whole number becomes 0.
pub fn depth_from_f64(raw: f64) -> i64 {
    if raw.is_finite() && raw >= 0.0 && raw.fract() == 0.0 && raw <= i64::MAX as f64 {
        raw as i64
    } else {
        0
    }
}

/// Whatever the extraction layer put in `depth`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDepth {
    Number(f64),
    Other(IgnoredAny),
}

fn lenient_depth<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawDepth::deserialize(deserializer)? {
        RawDepth::Number(raw) => depth_from_f64(raw),
        RawDepth::Other(_) => 0,
    })
}

/// Left/right placement relative to the container root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Root,
    Right,
}

impl Side {
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Root => 0.0,
            Side::Right => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Root => "root",
            Side::Right => "right",
        }
    }
}

/// A task (or the synthetic container root) together with its subtree aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub index: NodeId,
    pub id: String,
    pub text: String,
    pub depth: i64,
    /// `None` for the root, and for orphans that attach under the root.
    pub parent: Option<NodeId>,
    pub completed: bool,
    pub subtree_end: NodeId,
    pub subtree_size: usize,
    pub subtree_done: bool,
    pub subtree_max_depth: i64,
    pub side: Side,
}

impl Node {
    pub fn container_root(container_id: &str) -> Self {
        let label = container_id
            .rsplit('/')
            .find(|part| !part.is_empty())
            .unwrap_or(container_id);
        Self::new(
            ROOT_ID,
            format!("container:{container_id}"),
            label.to_owned(),
            ROOT_DEPTH,
            false,
        )
    }

    pub fn from_record(index: NodeId, record: &TaskRecord) -> Self {
        Self::new(
            index,
            record.id.clone(),
            record.text.clone(),
            record.depth.max(0),
            record.completed,
        )
    }

    pub fn new(index: NodeId, id: String, text: String, depth: i64, completed: bool) -> Self {
        Self {
            index,
            id,
            text,
            depth,
            parent: None,
            completed,
            subtree_end: index,
            subtree_size: 1,
            subtree_done: false,
            subtree_max_depth: depth,
            side: Side::Root,
        }
    }

    pub fn is_root(&self) -> bool {
        self.depth == ROOT_DEPTH
    }

    /// The node whose trunk this node branches off: its parent, or the
    /// container root for orphans. `None` only for the root itself.
    pub fn attach_point(&self) -> Option<NodeId> {
        if self.is_root() {
            None
        } else {
            Some(self.parent.unwrap_or(ROOT_ID))
        }
    }
}

/// All nodes of one container, index-addressed, root first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerTree {
    pub container_id: String,
    pub nodes: Vec<Node>,
    pub children: ChildrenMap,
    pub balance: SideBalance,
}

impl ContainerTree {
    /// Prepend a container root to the records and run every tree pass.
    pub fn from_records(container_id: &str, records: &[TaskRecord]) -> Result<Self, LayoutError> {
        if records.is_empty() {
            return Err(LayoutError::EmptyContainer {
                container: container_id.to_owned(),
            });
        }

        let mut nodes = Vec::with_capacity(records.len() + 1);
        nodes.push(Node::container_root(container_id));
        for (offset, record) in records.iter().enumerate() {
            nodes.push(Node::from_record(offset + 1, record));
        }

        Self::from_nodes(container_id, nodes)
    }

    /// Build from an already materialised node array. The first node must be
    /// the only container root.
    pub fn from_nodes(container_id: &str, mut nodes: Vec<Node>) -> Result<Self, LayoutError> {
        match nodes.first() {
            Some(first) if first.is_root() => {}
            _ => {
                return Err(LayoutError::MissingRoot {
                    container: container_id.to_owned(),
                })
            }
        }
        if let Some(index) = nodes.iter().skip(1).position(Node::is_root) {
            return Err(LayoutError::DuplicateRoot {
                container: container_id.to_owned(),
                index: index + 1,
            });
        }

        for (index, node) in nodes.iter_mut().enumerate() {
            node.index = index;
            if !node.is_root() && node.depth < 0 {
                node.depth = 0;
            }
        }

        topology::resolve_parents(&mut nodes);
        let children = ChildrenMap::build(&nodes);
        aggregate::aggregate_subtrees(&mut nodes, &children);
        let balance = sides::assign_sides(&mut nodes, &children);

        debug!(
            "container {}: {} task(s), max depth {}, balance L{}/R{}",
            container_id,
            nodes.len() - 1,
            nodes.iter().map(|n| n.depth).max().unwrap_or(0),
            balance.left_weight,
            balance.right_weight
        );

        Ok(Self {
            container_id: container_id.to_owned(),
            nodes,
            children,
            balance,
        })
    }

    #[allow(dead_code)]
    pub fn root(&self) -> &Node {
        &self.nodes[ROOT_ID]
    }

    #[allow(dead_code)]
    pub fn task_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.children.children(id)
    }

    /// Deepest task depth, never below 0.
    pub fn max_depth(&self) -> i64 {
        self.nodes.iter().map(|node| node.depth).fold(0, i64::max)
    }
}

/// Split records into one tree per contiguous container run. A new run starts
/// whenever the container id changes, so no state crosses a boundary.
pub fn build_forest(records: &[TaskRecord]) -> Result<Vec<ContainerTree>, LayoutError> {
    let mut trees: Vec<ContainerTree> = Vec::new();

    for run in records.chunk_by(|a, b| a.container_id == b.container_id) {
        let container_id = &run[0].container_id;
        if trees.iter().any(|tree| &tree.container_id == container_id) {
            warn!(
                "container {} appears in more than one run; laying each run out separately",
                container_id
            );
        }
        trees.push(ContainerTree::from_records(container_id, run)?);
    }

    Ok(trees)
}
