use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{info, warn};

use crate::tree::layout::{DiagramLayout, LayoutConfig, DEFAULT_PALETTE};
use crate::tree::TaskRecord;
use crate::{export, io, ui};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "gitline",
    about = "Lays out nested checklists as a branching, git-style diagram."
)]
pub struct AppConfig {
    /// Task records as a JSON array or JSON Lines. Read from stdin when omitted.
    #[arg(value_name = "RECORDS_FILE")]
    pub records_path: Option<PathBuf>,

    /// Write the computed layout as JSON to this path.
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// What to print on stdout when no output path is given.
    #[arg(long, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,

    /// Only lay out the container with this id.
    #[arg(long, value_name = "CONTAINER_ID")]
    pub container: Option<String>,

    /// Emit single-line JSON.
    #[arg(long)]
    pub compact: bool,

    /// Height of one depth row.
    #[arg(long, default_value_t = 1.0)]
    pub row_height: f64,

    /// Width of one leaf slot.
    #[arg(long, default_value_t = 1.0)]
    pub slot_width: f64,

    /// Gap between the root trunk and the nearest slot on either side.
    #[arg(long, default_value_t = 0.8)]
    pub base_gap: f64,

    /// Space reserved for labels beyond the outermost slot on each side.
    #[arg(long, default_value_t = 1.5)]
    pub label_margin: f64,

    /// Distance from the deepest row to the bottom of open trunks.
    #[arg(long, default_value_t = 1.5)]
    pub bottom_margin: f64,

    /// Horizontal gap between containers.
    #[arg(long, default_value_t = 1.0)]
    pub container_gap: f64,

    /// Comma-separated colours, cycled by depth.
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_PALETTE.map(String::from))]
    pub palette: Vec<String>,
}

impl AppConfig {
    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            row_height: self.row_height,
            slot_width: self.slot_width,
            base_gap: self.base_gap,
            label_margin: self.label_margin,
            bottom_margin: self.bottom_margin,
            container_gap: self.container_gap,
            palette: self.palette.clone(),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Summary,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Summary => write!(f, "summary"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

pub struct GitLineApp;

impl GitLineApp {
    pub fn run(config: &AppConfig) -> Result<()> {
        let records = Self::load(config)?;
        let records = Self::select_container(records, config.container.as_deref());

        let diagram = DiagramLayout::from_records(&records, &config.layout_config())?;
        info!(
            "Laid out {} container(s) with {} node(s).",
            diagram.containers.len(),
            diagram.nodes.len()
        );

        match (&config.output, config.format) {
            (Some(dest), _) => export::write_json(&diagram, dest, !config.compact)?,
            (None, OutputFormat::Json) => {
                println!("{}", export::render_json(&diagram, !config.compact)?)
            }
            (None, OutputFormat::Summary) => ui::render_preview(&diagram),
        }

        Ok(())
    }

    fn load(config: &AppConfig) -> Result<Vec<TaskRecord>> {
        match &config.records_path {
            Some(path) => {
                info!("Loading task records from {}", path.display());
                io::load_records(path)
            }
            None => io::read_records(std::io::stdin().lock()),
        }
    }

    fn select_container(records: Vec<TaskRecord>, container: Option<&str>) -> Vec<TaskRecord> {
        let Some(container) = container else {
            return records;
        };

        let selected: Vec<TaskRecord> = records
            .into_iter()
            .filter(|record| record.container_id == container)
            .collect();
        if selected.is_empty() {
            warn!("No task records belong to container {container}.");
        }
        selected
    }
}
