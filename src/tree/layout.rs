use log::debug;
use serde::Serialize;

use super::{build_forest, ContainerTree, LayoutError, NodeId, Side, SideBalance, TaskRecord};

mod connectors;
mod slots;
#[cfg(test)]
mod test_properties;

pub use slots::SlotAssignment;

pub const DEFAULT_PALETTE: [&str; 6] = [
    "#e06c75", "#98c379", "#61afef", "#e5c07b", "#c678dd", "#56b6c2",
];

/// Spacing of the diagram in abstract units: x in slot widths, y in rows.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub row_height: f64,
    pub slot_width: f64,
    /// Gap between the root trunk and the first slot on either side.
    pub base_gap: f64,
    /// Room kept free beyond the outermost slot on each side for labels.
    pub label_margin: f64,
    /// Distance from the deepest row down to the bottom sentinel row.
    pub bottom_margin: f64,
    /// Horizontal gap between consecutive containers.
    pub container_gap: f64,
    pub palette: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_height: 1.0,
            slot_width: 1.0,
            base_gap: 0.8,
            label_margin: 1.5,
            bottom_margin: 1.5,
            container_gap: 1.0,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        positive("row_height", self.row_height)?;
        positive("slot_width", self.slot_width)?;
        non_negative("base_gap", self.base_gap)?;
        non_negative("label_margin", self.label_margin)?;
        non_negative("bottom_margin", self.bottom_margin)?;
        non_negative("container_gap", self.container_gap)?;
        if self.palette.is_empty() {
            return Err(LayoutError::InvalidConfig {
                field: "palette",
                value: "no colours".to_string(),
            });
        }
        Ok(())
    }

    pub fn palette_size(&self) -> usize {
        self.palette.len().max(1)
    }

    /// Row of a depth; the container root (depth -1) sits on row 0.
    pub fn row_y(&self, depth: i64) -> f64 {
        self.row_height * (depth as f64 + 1.0)
    }

    /// Depth-cyclic colour, independent of side.
    pub fn color_index(&self, depth: i64) -> usize {
        (depth.max(0) as usize + 1) % self.palette_size()
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), LayoutError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidConfig {
            field,
            value: value.to_string(),
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), LayoutError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidConfig {
            field,
            value: value.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SegmentKind {
    Trunk,
    Branch,
    Merge,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorSegment {
    pub kind: SegmentKind,
    pub from_node: NodeId,
    pub to_node: Option<NodeId>,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub dashed: bool,
    pub color_index: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoundingBox {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePlacement {
    pub id: String,
    pub container_id: String,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub depth: i64,
    pub completed: bool,
    pub color_index: usize,
    pub side: Side,
    /// Node whose trunk this node branches off.
    pub parent: Option<NodeId>,
}

/// Positions and connectors of a single container.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeLayout {
    pub container_id: String,
    pub nodes: Vec<NodePlacement>,
    pub segments: Vec<ConnectorSegment>,
    pub bounding_box: BoundingBox,
    pub root_x: f64,
    pub bottom_y: f64,
    pub balance: SideBalance,
}

impl TreeLayout {
    pub fn from_tree(tree: &ContainerTree, config: &LayoutConfig) -> Self {
        let slots = SlotAssignment::compute(tree);

        let left_span = config.base_gap + slots.left_slots as f64 * config.slot_width
            + config.label_margin;
        let right_span = config.base_gap + slots.right_slots as f64 * config.slot_width
            + config.label_margin;
        let root_x = left_span;
        let bottom_y = config.row_y(tree.max_depth()) + config.bottom_margin;

        let positions: Vec<(f64, f64)> = tree
            .nodes
            .iter()
            .map(|node| {
                let y = config.row_y(node.depth);
                if node.is_root() {
                    return (root_x, y);
                }
                let reach = config.base_gap + slots.center(node.index) * config.slot_width;
                (root_x + node.side.sign() * reach, y)
            })
            .collect();

        let segments = connectors::derive(tree, &positions, bottom_y, config);

        let nodes = tree
            .nodes
            .iter()
            .zip(&positions)
            .map(|(node, &(x, y))| NodePlacement {
                id: node.id.clone(),
                container_id: tree.container_id.clone(),
                text: node.text.clone(),
                x,
                y,
                depth: node.depth,
                completed: node.completed,
                color_index: config.color_index(node.depth),
                side: node.side,
                parent: node.attach_point(),
            })
            .collect();

        debug!(
            "container {}: {} slot(s) left, {} right, {} segment(s)",
            tree.container_id,
            slots.left_slots,
            slots.right_slots,
            segments.len()
        );

        Self {
            container_id: tree.container_id.clone(),
            nodes,
            segments,
            bounding_box: BoundingBox {
                width: left_span + right_span,
                height: bottom_y,
            },
            root_x,
            bottom_y,
            balance: tree.balance,
        }
    }

    #[allow(dead_code)]
    pub fn count(&self, kind: SegmentKind) -> usize {
        self.segments.iter().filter(|s| s.kind == kind).count()
    }

    /// Shift horizontally and renumber node references by `index_offset`.
    fn translate(&mut self, dx: f64, index_offset: usize) {
        for node in &mut self.nodes {
            node.x += dx;
            node.parent = node.parent.map(|p| p + index_offset);
        }
        for segment in &mut self.segments {
            segment.x1 += dx;
            segment.x2 += dx;
            segment.from_node += index_offset;
            segment.to_node = segment.to_node.map(|n| n + index_offset);
        }
        self.root_x += dx;
    }
}

/// Where one container ended up inside the composed diagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpan {
    pub container_id: String,
    pub first_node: NodeId,
    pub node_count: usize,
    pub x_offset: f64,
    pub root_x: f64,
    pub bounding_box: BoundingBox,
    #[serde(flatten)]
    pub balance: SideBalance,
}

/// Every container laid out side by side, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramLayout {
    pub nodes: Vec<NodePlacement>,
    pub segments: Vec<ConnectorSegment>,
    pub bounding_box: BoundingBox,
    pub containers: Vec<ContainerSpan>,
    pub palette: Vec<String>,
}

impl DiagramLayout {
    pub fn from_records(records: &[TaskRecord], config: &LayoutConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        let trees = build_forest(records)?;
        Ok(Self::from_trees(&trees, config))
    }

    pub fn from_trees(trees: &[ContainerTree], config: &LayoutConfig) -> Self {
        let mut diagram = DiagramLayout {
            palette: config.palette.clone(),
            ..Default::default()
        };

        let mut x_offset = 0.0;
        for (position, tree) in trees.iter().enumerate() {
            if position > 0 {
                x_offset += config.container_gap;
            }

            let mut layout = TreeLayout::from_tree(tree, config);
            let first_node = diagram.nodes.len();
            layout.translate(x_offset, first_node);

            diagram.containers.push(ContainerSpan {
                container_id: layout.container_id.clone(),
                first_node,
                node_count: layout.nodes.len(),
                x_offset,
                root_x: layout.root_x,
                bounding_box: layout.bounding_box,
                balance: layout.balance,
            });

            x_offset += layout.bounding_box.width;
            diagram.bounding_box.width = x_offset;
            diagram.bounding_box.height = diagram.bounding_box.height.max(layout.bounding_box.height);
            diagram.nodes.extend(layout.nodes);
            diagram.segments.extend(layout.segments);
        }

        diagram
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn task_count(&self) -> usize {
        self.nodes.len() - self.containers.len()
    }

    pub fn count(&self, kind: SegmentKind) -> usize {
        self.segments.iter().filter(|s| s.kind == kind).count()
    }

    /// Nodes and segments belonging to one container.
    pub fn container_nodes(&self, span: &ContainerSpan) -> &[NodePlacement] {
        &self.nodes[span.first_node..span.first_node + span.node_count]
    }
}
