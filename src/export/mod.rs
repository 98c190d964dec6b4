use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::tree::layout::DiagramLayout;

pub fn render_json(diagram: &DiagramLayout, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(diagram)
    } else {
        serde_json::to_string(diagram)
    };
    json.context("failed to serialise layout")
}

pub fn write_json(diagram: &DiagramLayout, path: &Path, pretty: bool) -> Result<()> {
    let mut json = render_json(diagram, pretty)?;
    json.push('\n');
    fs::write(path, json).with_context(|| format!("failed to write layout: {}", path.display()))?;
    info!(
        "Wrote {} node(s) and {} segment(s) to {}",
        diagram.nodes.len(),
        diagram.segments.len(),
        path.display()
    );
    Ok(())
}
