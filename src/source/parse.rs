use std::collections::{BTreeMap, HashSet};

use anyhow::{Result, bail};
use serde::Deserialize;

use crate::engine::model::{NodeId, NodeSeed, RelationshipId, RelationshipSeed};

#[derive(Debug, Deserialize)]
struct GraphFile {
    #[serde(default)]
    nodes: Vec<NodeEntry>,
    #[serde(default)]
    relationships: Vec<RelationshipEntry>,
}

#[derive(Debug, Deserialize)]
struct NodeEntry {
    id: u64,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    properties: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RelationshipEntry {
    id: u64,
    source: u64,
    target: u64,
    #[serde(rename = "type")]
    rel_type: String,
    #[serde(default)]
    properties: BTreeMap<String, String>,
}

/// Initial loads are strict: unlike the incremental feed, which drops bad
/// relationships one by one, a malformed description file is rejected whole.
pub(super) fn parse_graph_file(raw: &str) -> Result<(Vec<NodeSeed>, Vec<RelationshipSeed>)> {
    let parsed: GraphFile = serde_json::from_str(raw)?;

    let mut node_ids = HashSet::with_capacity(parsed.nodes.len());
    for node in &parsed.nodes {
        if !node_ids.insert(node.id) {
            bail!("duplicate node id {}", node.id);
        }
    }

    let mut relationship_ids = HashSet::with_capacity(parsed.relationships.len());
    for rel in &parsed.relationships {
        if !relationship_ids.insert(rel.id) {
            bail!("duplicate relationship id {}", rel.id);
        }
        if !node_ids.contains(&rel.source) || !node_ids.contains(&rel.target) {
            bail!(
                "relationship {} references missing node ({} -> {})",
                rel.id,
                rel.source,
                rel.target
            );
        }
    }

    let nodes = parsed
        .nodes
        .into_iter()
        .map(|node| NodeSeed {
            id: NodeId(node.id),
            labels: node.labels,
            properties: node.properties.into_iter().collect(),
        })
        .collect();
    let relationships = parsed
        .relationships
        .into_iter()
        .map(|rel| RelationshipSeed {
            id: RelationshipId(rel.id),
            source: NodeId(rel.source),
            target: NodeId(rel.target),
            rel_type: rel.rel_type,
            properties: rel.properties.into_iter().collect(),
        })
        .collect();

    Ok((nodes, relationships))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "nodes": [
            { "id": 1, "labels": ["Person"], "properties": { "name": "Alice" } },
            { "id": 2, "labels": ["Movie"] }
        ],
        "relationships": [
            { "id": 10, "source": 1, "target": 2, "type": "ACTED_IN" }
        ]
    }"#;

    #[test]
    fn parses_a_well_formed_description() {
        let (nodes, relationships) = parse_graph_file(SAMPLE).expect("sample parses");
        assert_eq!(nodes.len(), 2);
        assert_eq!(relationships.len(), 1);
        assert_eq!(nodes[0].properties, vec![("name".to_owned(), "Alice".to_owned())]);
        assert_eq!(relationships[0].rel_type, "ACTED_IN");
    }

    #[test]
    fn rejects_duplicate_node_ids() {
        let raw = r#"{ "nodes": [ { "id": 1 }, { "id": 1 } ] }"#;
        let error = parse_graph_file(raw).expect_err("duplicate must fail");
        assert!(error.to_string().contains("duplicate node id 1"));
    }

    #[test]
    fn rejects_dangling_relationship_endpoints() {
        let raw = r#"{
            "nodes": [ { "id": 1 } ],
            "relationships": [ { "id": 10, "source": 1, "target": 9, "type": "KNOWS" } ]
        }"#;
        let error = parse_graph_file(raw).expect_err("dangling endpoint must fail");
        assert!(error.to_string().contains("missing node"));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(parse_graph_file("not json").is_err());
    }

    #[test]
    fn empty_description_yields_an_empty_graph() {
        let (nodes, relationships) = parse_graph_file("{}").expect("empty parses");
        assert!(nodes.is_empty());
        assert!(relationships.is_empty());
    }
}
