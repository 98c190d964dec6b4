use std::fmt::Write;

use crate::tree::layout::{DiagramLayout, SegmentKind};

const PREVIEW_CONTAINERS: usize = 3;

/// Outline indentation stops growing past this depth.
const MAX_INDENT: i64 = 32;

pub fn render_preview(diagram: &DiagramLayout) {
    print!("{}", preview_text(diagram));
}

/// Plain-text summary of a layout: one block per container with an outline
/// of its tasks.
pub fn preview_text(diagram: &DiagramLayout) -> String {
    let mut out = String::new();

    if diagram.is_empty() {
        out.push_str("No tasks to lay out.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "Laid out {} task(s) in {} container(s): {} trunk(s), {} branch(es), {} merge(s), {:.2} x {:.2} units.",
        diagram.task_count(),
        diagram.containers.len(),
        diagram.count(SegmentKind::Trunk),
        diagram.count(SegmentKind::Branch),
        diagram.count(SegmentKind::Merge),
        diagram.bounding_box.width,
        diagram.bounding_box.height
    );

    for span in diagram.containers.iter().take(PREVIEW_CONTAINERS) {
        let nodes = diagram.container_nodes(span);
        let merges = diagram
            .segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Merge)
            .filter(|s| (span.first_node..span.first_node + span.node_count).contains(&s.from_node))
            .count();

        let _ = writeln!(
            out,
            "- {} => {} task(s), weight L{}/R{}, {} merge(s), {:.2} x {:.2} at x+{:.2}",
            span.container_id,
            span.node_count - 1,
            span.balance.left_weight,
            span.balance.right_weight,
            merges,
            span.bounding_box.width,
            span.bounding_box.height,
            span.x_offset
        );

        for node in nodes.iter().skip(1) {
            let indent = "  ".repeat(node.depth.clamp(0, MAX_INDENT) as usize + 1);
            let mark = if node.completed { 'x' } else { ' ' };
            let _ = writeln!(
                out,
                "  {}[{}] {} ({}, x={:.2}, y={:.2})",
                indent,
                mark,
                node.text,
                node.side.label(),
                node.x,
                node.y
            );
        }
    }

    if diagram.containers.len() > PREVIEW_CONTAINERS {
        let _ = writeln!(
            out,
            "... ({} more container(s) omitted)",
            diagram.containers.len() - PREVIEW_CONTAINERS
        );
    }

    out
}
