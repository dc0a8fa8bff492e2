use std::collections::HashMap;

use eframe::egui::{Color32, Rect, Vec2, pos2, vec2};

use super::model::Graph;
use super::style::{GraphStyle, resolve_caption};
use crate::util::golden_direction;

const CAPTION_RADIUS_PER_CHAR: f32 = 0.55;
const CAPTION_RADIUS_BONUS_MAX: f32 = 10.0;
/// Gap between a node's rim and the start/tip of an arrow shaft.
const SHAFT_MARGIN: f32 = 2.0;
const ARROW_LENGTH: f32 = 9.0;
const ARROW_HALF_WIDTH: f32 = 4.5;
/// Perpendicular control-point spacing between parallel relationships.
const PARALLEL_SPACING: f32 = 26.0;
const LOOP_BASE_RADIUS: f32 = 16.0;
const LOOP_RADIUS_STEP: f32 = 8.0;

#[derive(Clone, Debug)]
pub struct NodeShape {
    pub node_index: usize,
    pub center: Vec2,
    pub radius: f32,
    pub caption: String,
    pub color: Color32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RelationshipPath {
    Line { from: Vec2, to: Vec2 },
    Arc { from: Vec2, control: Vec2, to: Vec2 },
    Loop { center: Vec2, radius: f32 },
}

#[derive(Clone, Debug)]
pub struct RelationshipShape {
    pub relationship_index: usize,
    pub path: RelationshipPath,
    /// Filled arrowhead triangle, tip first. Loops carry none.
    pub arrow: Option<[Vec2; 3]>,
    pub caption: Option<(String, Vec2)>,
    pub color: Color32,
    pub width: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct UpdateScope {
    pub update_nodes: bool,
    pub update_relationships: bool,
}

impl UpdateScope {
    pub fn all() -> Self {
        Self {
            update_nodes: true,
            update_relationships: true,
        }
    }

    pub fn nodes_only() -> Self {
        Self {
            update_nodes: true,
            update_relationships: false,
        }
    }

    pub fn relationships_only() -> Self {
        Self {
            update_nodes: false,
            update_relationships: true,
        }
    }
}

/// Ephemeral drawable geometry, recomputed from the graph each tick. Node and
/// relationship shapes can be refreshed independently so a style change that
/// only affects one kind does not pay for the other.
#[derive(Default)]
pub struct GeometryFrame {
    nodes: Vec<NodeShape>,
    relationships: Vec<RelationshipShape>,
}

impl GeometryFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[NodeShape] {
        &self.nodes
    }

    pub fn relationships(&self) -> &[RelationshipShape] {
        &self.relationships
    }

    pub fn on_graph_change(&mut self, graph: &Graph, style: &dyn GraphStyle, scope: UpdateScope) {
        if scope.update_nodes {
            self.update_nodes(graph, style);
        }
        if scope.update_relationships {
            self.update_relationships(graph, style);
        }
    }

    pub fn update_nodes(&mut self, graph: &Graph, style: &dyn GraphStyle) {
        self.nodes.clear();
        self.nodes.reserve(graph.node_count());
        for (node_index, node) in graph.nodes().iter().enumerate() {
            let node_style = style.node_style(&node.labels);
            let caption = resolve_caption(node, &node_style);
            let caption_bonus = (caption.len().saturating_sub(6) as f32 * CAPTION_RADIUS_PER_CHAR)
                .min(CAPTION_RADIUS_BONUS_MAX);
            self.nodes.push(NodeShape {
                node_index,
                center: node.position,
                radius: node_style.base_radius + caption_bonus,
                caption,
                color: node_style.color,
            });
        }
    }

    pub fn update_relationships(&mut self, graph: &Graph, style: &dyn GraphStyle) {
        let radii = self.current_radii(graph, style);

        // Group by unordered endpoint pair; slot order within a group decides
        // each relationship's curvature offset.
        let mut groups: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for (rel_index, rel) in graph.relationships().iter().enumerate() {
            let key = (
                rel.source_index.min(rel.target_index),
                rel.source_index.max(rel.target_index),
            );
            groups.entry(key).or_default().push(rel_index);
        }

        self.relationships.clear();
        self.relationships.reserve(graph.relationship_count());
        for (key, members) in groups {
            for (slot, &rel_index) in members.iter().enumerate() {
                let rel = &graph.relationships()[rel_index];
                let rel_style = style.relationship_style(&rel.rel_type);
                let caption_text = rel_style.show_caption.then(|| rel.rel_type.clone());

                let shape = if key.0 == key.1 {
                    Self::loop_shape(
                        rel_index,
                        graph.nodes()[rel.source_index].position,
                        radii[rel.source_index],
                        slot,
                        caption_text,
                        &rel_style,
                    )
                } else {
                    let offset = slot as f32 - (members.len() as f32 - 1.0) * 0.5;
                    // Curvature lives in the canonical (low index -> high
                    // index) frame so opposing relationships bend apart.
                    let canonical = if rel.source_index == key.0 { 1.0 } else { -1.0 };
                    Self::link_shape(
                        rel_index,
                        graph.nodes()[rel.source_index].position,
                        radii[rel.source_index],
                        graph.nodes()[rel.target_index].position,
                        radii[rel.target_index],
                        offset * canonical,
                        rel.source_index + rel.target_index,
                        caption_text,
                        &rel_style,
                    )
                };
                self.relationships.push(shape);
            }
        }
        self.relationships
            .sort_by_key(|shape| shape.relationship_index);
    }

    fn current_radii(&self, graph: &Graph, style: &dyn GraphStyle) -> Vec<f32> {
        if self.nodes.len() == graph.node_count() {
            return self.nodes.iter().map(|shape| shape.radius).collect();
        }
        graph
            .nodes()
            .iter()
            .map(|node| style.node_style(&node.labels).base_radius)
            .collect()
    }

    fn loop_shape(
        rel_index: usize,
        node_center: Vec2,
        node_radius: f32,
        slot: usize,
        caption_text: Option<String>,
        rel_style: &super::style::RelationshipStyle,
    ) -> RelationshipShape {
        let loop_radius = LOOP_BASE_RADIUS + slot as f32 * LOOP_RADIUS_STEP;
        let center = node_center + vec2(0.0, -(node_radius + loop_radius));
        let caption = caption_text
            .map(|text| (text, center + vec2(0.0, -(loop_radius + ARROW_LENGTH))));

        RelationshipShape {
            relationship_index: rel_index,
            path: RelationshipPath::Loop {
                center,
                radius: loop_radius,
            },
            arrow: None,
            caption,
            color: rel_style.color,
            width: rel_style.width,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn link_shape(
        rel_index: usize,
        source: Vec2,
        source_radius: f32,
        target: Vec2,
        target_radius: f32,
        curvature_offset: f32,
        jitter_seed: usize,
        caption_text: Option<String>,
        rel_style: &super::style::RelationshipStyle,
    ) -> RelationshipShape {
        let delta = target - source;
        let distance = delta.length();
        let direction = if distance > 1e-4 {
            delta / distance
        } else {
            golden_direction(jitter_seed)
        };
        let perpendicular = vec2(-direction.y, direction.x);

        if curvature_offset.abs() < 0.01 {
            let from = source + direction * (source_radius + SHAFT_MARGIN);
            let tip = target - direction * (target_radius + SHAFT_MARGIN);
            let shaft_end = tip - direction * ARROW_LENGTH;
            let caption = caption_text.map(|text| {
                let mid = (from + shaft_end) * 0.5;
                (text, mid + perpendicular * 10.0)
            });

            return RelationshipShape {
                relationship_index: rel_index,
                path: RelationshipPath::Line {
                    from,
                    to: shaft_end,
                },
                arrow: Some(arrow_triangle(tip, direction)),
                caption,
                color: rel_style.color,
                width: rel_style.width,
            };
        }

        let control = (source + target) * 0.5 + perpendicular * (curvature_offset * PARALLEL_SPACING);
        let start_dir = safe_direction(control - source, jitter_seed);
        let from = source + start_dir * (source_radius + SHAFT_MARGIN);
        let end_dir = safe_direction(control - target, jitter_seed + 1);
        let tip = target + end_dir * (target_radius + SHAFT_MARGIN);
        let tip_dir = safe_direction(tip - control, jitter_seed + 2);
        let shaft_end = tip - tip_dir * ARROW_LENGTH;
        let caption = caption_text.map(|text| {
            let mid = from * 0.25 + control * 0.5 + shaft_end * 0.25;
            (text, mid)
        });

        RelationshipShape {
            relationship_index: rel_index,
            path: RelationshipPath::Arc {
                from,
                control,
                to: shaft_end,
            },
            arrow: Some(arrow_triangle(tip, tip_dir)),
            caption,
            color: rel_style.color,
            width: rel_style.width,
        }
    }

    /// Min/max over node centers plus radii; the zero-size box at the origin
    /// for an empty frame.
    pub fn bounding_box(&self) -> Rect {
        if self.nodes.is_empty() {
            return Rect::from_min_max(pos2(0.0, 0.0), pos2(0.0, 0.0));
        }

        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for shape in &self.nodes {
            min.x = min.x.min(shape.center.x - shape.radius);
            min.y = min.y.min(shape.center.y - shape.radius);
            max.x = max.x.max(shape.center.x + shape.radius);
            max.y = max.y.max(shape.center.y + shape.radius);
        }
        Rect::from_min_max(pos2(min.x, min.y), pos2(max.x, max.y))
    }
}

fn safe_direction(delta: Vec2, jitter_seed: usize) -> Vec2 {
    let length = delta.length();
    if length > 1e-4 {
        delta / length
    } else {
        golden_direction(jitter_seed)
    }
}

fn arrow_triangle(tip: Vec2, direction: Vec2) -> [Vec2; 3] {
    let perpendicular = vec2(-direction.y, direction.x);
    let base = tip - direction * ARROW_LENGTH;
    [
        tip,
        base + perpendicular * ARROW_HALF_WIDTH,
        base - perpendicular * ARROW_HALF_WIDTH,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::model::tests::{node_seed, rel_seed};
    use crate::engine::model::{Graph, NodeId};
    use crate::engine::style::DefaultStyle;

    fn two_node_graph() -> Graph {
        let mut graph = Graph::from_seeds(
            vec![node_seed(1, "Person"), node_seed(2, "Person")],
            vec![rel_seed(10, 1, 2)],
        );
        graph.nodes_mut()[0].position = vec2(0.0, 0.0);
        graph.nodes_mut()[1].position = vec2(200.0, 0.0);
        graph
    }

    fn frame_for(graph: &Graph) -> GeometryFrame {
        let style = DefaultStyle::default();
        let mut frame = GeometryFrame::new();
        frame.on_graph_change(graph, &style, UpdateScope::all());
        frame
    }

    #[test]
    fn single_relationship_is_a_straight_segment_between_boundaries() {
        let graph = two_node_graph();
        let frame = frame_for(&graph);
        assert_eq!(frame.relationships().len(), 1);

        let source_radius = frame.nodes()[0].radius;
        let target_radius = frame.nodes()[1].radius;
        let shape = &frame.relationships()[0];
        let RelationshipPath::Line { from, to } = shape.path else {
            panic!("expected straight segment, got {:?}", shape.path);
        };

        // Starts and ends on node rims, not centers.
        assert!((from.x - (source_radius + SHAFT_MARGIN)).abs() < 1e-3);
        assert!(from.x > 0.0 && to.x < 200.0);
        assert!(to.x <= 200.0 - target_radius - SHAFT_MARGIN + 1e-3);
        assert_eq!(from.y, 0.0);
        assert_eq!(to.y, 0.0);

        let arrow = shape.arrow.expect("directed link carries an arrowhead");
        assert!((arrow[0].x - (200.0 - target_radius - SHAFT_MARGIN)).abs() < 1e-3);
    }

    #[test]
    fn parallel_relationships_get_distinct_curvature() {
        let mut graph = two_node_graph();
        graph.add_relationships(Vec::new(), vec![rel_seed(11, 1, 2), rel_seed(12, 2, 1)]);
        let frame = frame_for(&graph);
        assert_eq!(frame.relationships().len(), 3);

        let paths: Vec<_> = frame
            .relationships()
            .iter()
            .map(|shape| shape.path)
            .collect();
        for (i, a) in paths.iter().enumerate() {
            for b in paths.iter().skip(i + 1) {
                assert_ne!(a, b, "parallel relationships must not overlap");
            }
        }

        let controls: Vec<f32> = paths
            .iter()
            .filter_map(|path| match path {
                RelationshipPath::Arc { control, .. } => Some(control.y),
                _ => None,
            })
            .collect();
        assert!(controls.len() >= 2);
        assert!(
            controls.iter().any(|y| *y > 0.0) && controls.iter().any(|y| *y < 0.0),
            "arcs should spread to both sides, got {controls:?}"
        );
    }

    #[test]
    fn self_relationship_renders_as_a_loop() {
        let mut graph = Graph::from_seeds(vec![node_seed(1, "Person")], Vec::new());
        graph.add_relationships(Vec::new(), vec![rel_seed(10, 1, 1)]);
        let frame = frame_for(&graph);

        let shape = &frame.relationships()[0];
        let RelationshipPath::Loop { center, radius } = shape.path else {
            panic!("expected loop, got {:?}", shape.path);
        };
        assert!(radius > 0.0);
        let node = graph.node(NodeId(1)).expect("node");
        assert!((center - node.position).length() > frame.nodes()[0].radius);
    }

    #[test]
    fn stacked_self_relationships_use_growing_loops() {
        let mut graph = Graph::from_seeds(vec![node_seed(1, "Person")], Vec::new());
        graph.add_relationships(Vec::new(), vec![rel_seed(10, 1, 1), rel_seed(11, 1, 1)]);
        let frame = frame_for(&graph);

        let mut radii: Vec<f32> = frame
            .relationships()
            .iter()
            .map(|shape| match shape.path {
                RelationshipPath::Loop { radius, .. } => radius,
                other => panic!("expected loop, got {other:?}"),
            })
            .collect();
        radii.sort_by(f32::total_cmp);
        assert!(radii[1] > radii[0]);
    }

    #[test]
    fn bounding_box_is_zero_at_origin_for_empty_graph() {
        let frame = GeometryFrame::new();
        let bounds = frame.bounding_box();
        assert_eq!(bounds.min, pos2(0.0, 0.0));
        assert_eq!(bounds.max, pos2(0.0, 0.0));
    }

    #[test]
    fn bounding_box_covers_centers_plus_radii() {
        let graph = two_node_graph();
        let frame = frame_for(&graph);
        let bounds = frame.bounding_box();
        let r0 = frame.nodes()[0].radius;
        let r1 = frame.nodes()[1].radius;

        assert!((bounds.min.x - (-r0)).abs() < 1e-3);
        assert!((bounds.max.x - (200.0 + r1)).abs() < 1e-3);
    }

    #[test]
    fn longer_captions_widen_the_node() {
        let mut graph = Graph::from_seeds(
            vec![node_seed(1, "Person"), node_seed(2, "Person")],
            Vec::new(),
        );
        graph.nodes_mut()[1].properties =
            vec![("name".to_owned(), "a considerably longer caption".to_owned())];
        let frame = frame_for(&graph);
        assert!(frame.nodes()[1].radius > frame.nodes()[0].radius);
    }

    #[test]
    fn scoped_update_leaves_the_other_kind_untouched() {
        let graph = two_node_graph();
        let style = DefaultStyle::default();
        let mut frame = GeometryFrame::new();

        frame.on_graph_change(&graph, &style, UpdateScope::nodes_only());
        assert_eq!(frame.nodes().len(), 2);
        assert!(frame.relationships().is_empty());

        frame.on_graph_change(&graph, &style, UpdateScope::relationships_only());
        assert_eq!(frame.relationships().len(), 1);
    }
}
