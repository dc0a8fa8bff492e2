mod parse;

use std::fs;

use anyhow::{Context, Result};

use crate::engine::model::{NodeSeed, RelationshipSeed};

/// Reads and validates a JSON graph description, producing the seeds the
/// engine builds its session graph from.
pub fn load_graph(path: &str) -> Result<(Vec<NodeSeed>, Vec<RelationshipSeed>)> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph description {path}"))?;
    parse::parse_graph_file(&raw).with_context(|| format!("failed to parse {path}"))
}
