use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;

use crate::tree::TaskRecord;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RecordFormat {
    JsonArray,
    JsonLines,
}

pub fn load_records(path: &Path) -> Result<Vec<TaskRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read task records: {}", path.display()))?;
    parse_records(&raw).with_context(|| format!("invalid task records in {}", path.display()))
}

pub fn read_records(mut reader: impl Read) -> Result<Vec<TaskRecord>> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .context("failed to read task records from stdin")?;
    parse_records(&raw)
}

/// Parse records and bring them into container-grouped, source order.
pub fn parse_records(raw: &str) -> Result<Vec<TaskRecord>> {
    let mut records = match detect_format(raw) {
        RecordFormat::JsonArray => parse_json_array(raw)?,
        RecordFormat::JsonLines => parse_json_lines(raw)?,
    };

    if normalise_order(&mut records) {
        warn!("task records were not grouped by container and source order; re-sorted them");
    }

    Ok(records)
}

fn detect_format(raw: &str) -> RecordFormat {
    match raw.trim_start().chars().next() {
        Some('[') => RecordFormat::JsonArray,
        _ => RecordFormat::JsonLines,
    }
}

fn parse_json_array(raw: &str) -> Result<Vec<TaskRecord>> {
    serde_json::from_str(raw).context("expected a JSON array of task records")
}

fn parse_json_lines(raw: &str) -> Result<Vec<TaskRecord>> {
    let mut records = Vec::new();

    for (number, line) in raw.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record = serde_json::from_str(trimmed)
            .with_context(|| format!("line {}: expected a task record object", number + 1))?;
        records.push(record);
    }

    Ok(records)
}

/// Stable-sort by (first appearance of the container, source order) unless the
/// records already are in that order. Returns whether anything moved.
pub fn normalise_order(records: &mut [TaskRecord]) -> bool {
    let mut rank: HashMap<&str, usize> = HashMap::new();
    for record in records.iter() {
        let next = rank.len();
        rank.entry(record.container_id.as_str()).or_insert(next);
    }

    let keys: Vec<(usize, u64)> = records
        .iter()
        .map(|r| (rank[r.container_id.as_str()], r.source_order))
        .collect();
    if keys.windows(2).all(|pair| pair[0] <= pair[1]) {
        return false;
    }

    let mut keyed: Vec<((usize, u64), TaskRecord)> = keys
        .into_iter()
        .zip(records.iter().cloned())
        .collect();
    keyed.sort_by_key(|(key, _)| *key);
    for (slot, (_, record)) in records.iter_mut().zip(keyed) {
        *slot = record;
    }
    true
}
