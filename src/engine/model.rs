use std::collections::{HashMap, HashSet};
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::util::{golden_direction, stable_pair};

/// Distance at which a newly arriving node is seeded away from the neighbor
/// it attaches to, so incremental loads grow the layout locally instead of
/// teleporting the camera.
const NEIGHBOR_SEED_DISTANCE: f32 = 72.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationshipId(pub u64);

/// Node as delivered by a data source, before the graph assigns a position.
#[derive(Clone, Debug)]
pub struct NodeSeed {
    pub id: NodeId,
    pub labels: Vec<String>,
    pub properties: Vec<(String, String)>,
}

#[derive(Clone, Debug)]
pub struct RelationshipSeed {
    pub id: RelationshipId,
    pub source: NodeId,
    pub target: NodeId,
    pub rel_type: String,
    pub properties: Vec<(String, String)>,
}

pub struct Node {
    pub id: NodeId,
    pub labels: Vec<String>,
    pub properties: Vec<(String, String)>,
    pub position: Vec2,
    pub velocity: Vec2,
    pub pinned: bool,
}

impl Node {
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

pub struct Relationship {
    pub id: RelationshipId,
    pub source: NodeId,
    pub target: NodeId,
    pub source_index: usize,
    pub target_index: usize,
    pub rel_type: String,
    pub properties: Vec<(String, String)>,
}

/// Dense node arena plus relationships referencing nodes by stable index.
/// Nodes are never removed during a session, so indices stay valid for the
/// lifetime of the graph and the solver can run over plain slices.
#[derive(Default)]
pub struct Graph {
    nodes: Vec<Node>,
    relationships: Vec<Relationship>,
    index_by_id: HashMap<NodeId, usize>,
    relationship_ids: HashSet<RelationshipId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the session graph from an initial data set. Nodes start on a
    /// ring with deterministic jitter so the solver never sees a fully
    /// degenerate (all-coincident) configuration.
    pub fn from_seeds(node_seeds: Vec<NodeSeed>, relationship_seeds: Vec<RelationshipSeed>) -> Self {
        let mut graph = Self::new();

        let count = node_seeds.len().max(1);
        let ring_radius = (count as f32).sqrt() * 120.0;
        for (index, seed) in node_seeds.into_iter().enumerate() {
            let angle = (index as f32 / count as f32) * TAU;
            let (jx, jy) = stable_pair(seed.id.0);
            let position = vec2(angle.cos(), angle.sin()) * ring_radius + vec2(jx, jy) * 60.0;
            graph.insert_node(seed, position);
        }

        for seed in relationship_seeds {
            graph.insert_relationship(seed);
        }

        graph
    }

    /// Incremental mutation: merges a batch of relationships and the nodes
    /// they introduce. Existing node positions are left untouched; a new node
    /// is seeded next to the first already-placed node the batch connects it
    /// to. Returns how many relationships were actually added.
    pub fn add_relationships(
        &mut self,
        node_seeds: Vec<NodeSeed>,
        relationship_seeds: Vec<RelationshipSeed>,
    ) -> usize {
        for seed in node_seeds {
            if self.index_by_id.contains_key(&seed.id) {
                log::warn!("ignoring duplicate node {:?} in incremental batch", seed.id);
                continue;
            }

            let position = self
                .seed_position_near_neighbor(seed.id, &relationship_seeds)
                .unwrap_or_else(|| {
                    let (jx, jy) = stable_pair(seed.id.0);
                    let spread = (self.nodes.len().max(1) as f32).sqrt() * 120.0;
                    vec2(jx, jy) * spread.max(NEIGHBOR_SEED_DISTANCE)
                });
            self.insert_node(seed, position);
        }

        let mut added = 0usize;
        for seed in relationship_seeds {
            if self.insert_relationship(seed) {
                added += 1;
            }
        }
        added
    }

    fn seed_position_near_neighbor(
        &self,
        id: NodeId,
        batch: &[RelationshipSeed],
    ) -> Option<Vec2> {
        for seed in batch {
            let neighbor = if seed.source == id {
                seed.target
            } else if seed.target == id {
                seed.source
            } else {
                continue;
            };

            if let Some(&index) = self.index_by_id.get(&neighbor) {
                let (jx, jy) = stable_pair(id.0);
                let mut direction = vec2(jx, jy);
                if direction.length_sq() <= 0.0001 {
                    direction = golden_direction(self.nodes.len());
                } else {
                    direction = direction.normalized();
                }
                return Some(self.nodes[index].position + direction * NEIGHBOR_SEED_DISTANCE);
            }
        }
        None
    }

    fn insert_node(&mut self, seed: NodeSeed, position: Vec2) {
        if self.index_by_id.contains_key(&seed.id) {
            log::warn!("ignoring duplicate node {:?}", seed.id);
            return;
        }

        let index = self.nodes.len();
        self.index_by_id.insert(seed.id, index);
        self.nodes.push(Node {
            id: seed.id,
            labels: seed.labels,
            properties: seed.properties,
            position,
            velocity: Vec2::ZERO,
            pinned: false,
        });
    }

    fn insert_relationship(&mut self, seed: RelationshipSeed) -> bool {
        if self.relationship_ids.contains(&seed.id) {
            log::warn!("ignoring duplicate relationship {:?}", seed.id);
            return false;
        }

        let (Some(&source_index), Some(&target_index)) = (
            self.index_by_id.get(&seed.source),
            self.index_by_id.get(&seed.target),
        ) else {
            log::warn!(
                "rejecting relationship {:?}: endpoint {:?} -> {:?} not present in graph",
                seed.id,
                seed.source,
                seed.target
            );
            return false;
        };

        self.relationship_ids.insert(seed.id);
        self.relationships.push(Relationship {
            id: seed.id,
            source: seed.source,
            target: seed.target,
            source_index,
            target_index,
            rel_type: seed.rel_type,
            properties: seed.properties,
        });
        true
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn node_index(&self, id: NodeId) -> Option<usize> {
        self.index_by_id.get(&id).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index(id).map(|index| &self.nodes[index])
    }

    pub fn relationship(&self, id: RelationshipId) -> Option<&Relationship> {
        self.relationships.iter().find(|rel| rel.id == id)
    }

    pub fn set_pinned(&mut self, id: NodeId, pinned: bool) {
        if let Some(index) = self.node_index(id) {
            self.nodes[index].pinned = pinned;
        }
    }
}
