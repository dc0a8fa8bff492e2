use eframe::egui::Vec2;

use super::model::Graph;
use crate::util::golden_direction;

const REPULSION: f32 = 22_000.0;
const SOFTENING: f32 = 500.0;
const SPRING: f32 = 0.05;
const SPRING_DAMPING: f32 = 0.2;
const CENTER_PULL: f32 = 0.0015;
/// Preferred relationship length before endpoint radii are added.
const LINK_DISTANCE: f32 = 60.0;
const FORCE_GAIN: f32 = 0.055;
const VELOCITY_DAMPING: f32 = 0.88;
const MAX_FORCE: f32 = 200.0;
const MAX_SPEED: f32 = 20.0;
const SLEEP_SPEED_SQ: f32 = 0.02 * 0.02;
const SLEEP_FORCE_SQ: f32 = 0.08 * 0.08;
const SETTLE_KINETIC: f32 = 2.5e-3;
const DEFAULT_RADIUS: f32 = 14.0;

pub const PRECOMPUTE_TICKS: usize = 400;

/// Iterative solver over the graph's dense node arena. Node positions and
/// velocities live in the `Graph`; the simulation only keeps the derived
/// per-index arrays (edge pairs, radii) and a force scratch buffer so the
/// inner loop stays allocation-free.
#[derive(Default)]
pub struct Simulation {
    edges: Vec<(usize, usize)>,
    radii: Vec<f32>,
    forces: Vec<Vec2>,
    settled: bool,
}

impl Simulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Reheats the solver without touching positions, e.g. after a style
    /// change or a user drag.
    pub fn restart(&mut self) {
        self.settled = false;
    }

    /// Re-seeds per-node state after the graph gained nodes. Positions and
    /// velocities of surviving nodes are untouched since they live in the
    /// graph itself.
    pub fn update_nodes(&mut self, graph: &Graph, radii: &[f32]) {
        self.radii.clear();
        if radii.len() == graph.node_count() {
            self.radii.extend_from_slice(radii);
        } else {
            self.radii.resize(graph.node_count(), DEFAULT_RADIUS);
        }
        self.settled = false;
    }

    pub fn update_relationships(&mut self, graph: &Graph) {
        self.edges.clear();
        self.edges.extend(
            graph
                .relationships()
                .iter()
                .map(|rel| (rel.source_index, rel.target_index)),
        );
        self.settled = false;
    }

    /// Runs a bounded number of synchronous steps so the first paint already
    /// shows a reasonable layout, then hands over to animated per-tick mode.
    /// `on_settled` fires once, when the energy threshold or the step cap is
    /// reached.
    pub fn precompute_and_start(&mut self, graph: &mut Graph, on_settled: impl FnOnce()) {
        self.settled = false;
        for _ in 0..PRECOMPUTE_TICKS {
            if !self.tick(graph, 1.0 / 60.0) {
                break;
            }
        }
        on_settled();
    }

    /// One simulation step. Returns whether anything still moves; once it
    /// returns `false` the solver stays at rest until `restart` or a data
    /// mutation.
    pub fn tick(&mut self, graph: &mut Graph, delta_seconds: f32) -> bool {
        let node_count = graph.node_count();
        if node_count == 0 || self.settled {
            self.settled = true;
            return false;
        }
        if self.radii.len() != node_count {
            self.radii.resize(node_count, DEFAULT_RADIUS);
        }

        self.forces.resize(node_count, Vec2::ZERO);
        self.forces.fill(Vec2::ZERO);
        let time_step = (delta_seconds * 60.0).clamp(0.25, 3.0);

        {
            let nodes = graph.nodes();

            for i in 0..node_count {
                for j in (i + 1)..node_count {
                    let delta = nodes[i].position - nodes[j].position;
                    let distance_sq = delta.length_sq();
                    let direction = if distance_sq > 1e-8 {
                        delta / distance_sq.sqrt()
                    } else {
                        // Coincident pair: repel along a deterministic jitter
                        // direction instead of dividing by zero.
                        golden_direction(i * 31 + j * 7)
                    };

                    let push = direction * (REPULSION / (distance_sq + SOFTENING));
                    self.forces[i] += push;
                    self.forces[j] -= push;
                }
            }

            for &(from, to) in &self.edges {
                if from >= node_count || to >= node_count || from == to {
                    continue;
                }

                let delta = nodes[from].position - nodes[to].position;
                let distance_sq = delta.length_sq();
                if distance_sq <= 1e-8 {
                    continue;
                }
                let distance = distance_sq.sqrt();
                let direction = delta / distance;

                let preferred = LINK_DISTANCE + self.radii[from] + self.radii[to];
                let spring = (distance - preferred) * SPRING;
                let relative_velocity = nodes[from].velocity - nodes[to].velocity;
                let damping_force = relative_velocity.dot(direction) * SPRING_DAMPING;
                let correction = direction * (spring + damping_force);

                self.forces[from] -= correction;
                self.forces[to] += correction;
            }

            for (index, force) in self.forces.iter_mut().enumerate() {
                *force -= nodes[index].position * CENTER_PULL;
            }
        }

        let damping_factor = VELOCITY_DAMPING.powf(time_step);
        let mut kinetic = 0.0f32;
        for (index, node) in graph.nodes_mut().iter_mut().enumerate() {
            if node.pinned {
                node.velocity = Vec2::ZERO;
                continue;
            }

            let mut force = self.forces[index];
            let force_sq = force.length_sq();
            if force_sq > MAX_FORCE * MAX_FORCE {
                force *= MAX_FORCE / force_sq.sqrt();
            }

            let mut velocity = (node.velocity + force * (FORCE_GAIN * time_step)) * damping_factor;
            let mut speed_sq = velocity.length_sq();
            if speed_sq > MAX_SPEED * MAX_SPEED {
                velocity *= MAX_SPEED / speed_sq.sqrt();
                speed_sq = MAX_SPEED * MAX_SPEED;
            }
            if speed_sq < SLEEP_SPEED_SQ && force_sq < SLEEP_FORCE_SQ {
                velocity = Vec2::ZERO;
                speed_sq = 0.0;
            }

            node.velocity = velocity;
            node.position += velocity * time_step;
            kinetic += speed_sq;
        }

        if kinetic / (node_count as f32) < SETTLE_KINETIC {
            self.settled = true;
        }
        !self.settled
    }
}
