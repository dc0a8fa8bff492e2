pub mod events;
pub mod geometry;
mod interaction;
pub mod model;
mod render;
pub mod simulation;
pub mod style;
pub mod viewport;

use eframe::egui::{Sense, Ui};

use events::{EventBus, GraphItem, GraphStats};
use geometry::{GeometryFrame, UpdateScope};
use model::{Graph, NodeSeed, RelationshipSeed};
use render::Highlight;
use simulation::Simulation;
use style::GraphStyle;
use viewport::{Viewport, ZoomType};

/// Host-facing description of what changed, mirroring the selective
/// recompute the geometry model supports.
#[derive(Clone, Copy, Debug)]
pub struct UpdateRequest {
    pub update_nodes: bool,
    pub update_relationships: bool,
    pub restart_simulation: bool,
}

impl UpdateRequest {
    pub fn all() -> Self {
        Self {
            update_nodes: true,
            update_relationships: true,
            restart_simulation: true,
        }
    }
}

/// The layout-and-render engine: owns the graph, the force simulation, the
/// derived geometry, the viewport transform and the event registry, and
/// drives one atomic tick → geometry → paint unit per frame.
pub struct GraphView {
    graph: Graph,
    simulation: Simulation,
    geometry: GeometryFrame,
    viewport: Viewport,
    events: EventBus,
    style: Box<dyn GraphStyle>,
    style_version: u64,
    hovered: Option<GraphItem>,
    selected: Option<GraphItem>,
    dragging: Option<usize>,
    surface_warned: bool,
}

impl GraphView {
    pub fn new(graph: Graph, style: Box<dyn GraphStyle>) -> Self {
        Self {
            graph,
            simulation: Simulation::new(),
            geometry: GeometryFrame::new(),
            viewport: Viewport::new(),
            events: EventBus::new(),
            style_version: style.version(),
            style,
            hovered: None,
            selected: None,
            dragging: None,
            surface_warned: false,
        }
    }

    /// Computes initial geometry, seeds the simulation and reports the first
    /// stats snapshot.
    pub fn init(&mut self) {
        self.geometry
            .on_graph_change(&self.graph, self.style.as_ref(), UpdateScope::all());
        let radii = self.node_radii();
        self.simulation.update_nodes(&self.graph, &radii);
        self.simulation.update_relationships(&self.graph);
        self.emit_stats();
    }

    /// Runs the eager pre-layout pass so the first painted frame is already
    /// readable, then leaves the simulation in animated mode.
    pub fn precompute_and_start(&mut self, on_settled: impl FnOnce()) {
        self.simulation.precompute_and_start(&mut self.graph, on_settled);
        self.geometry
            .on_graph_change(&self.graph, self.style.as_ref(), UpdateScope::all());
    }

    pub fn update(&mut self, request: UpdateRequest) {
        self.geometry.on_graph_change(
            &self.graph,
            self.style.as_ref(),
            UpdateScope {
                update_nodes: request.update_nodes,
                update_relationships: request.update_relationships,
            },
        );
        if request.update_nodes {
            let radii = self.node_radii();
            self.simulation.update_nodes(&self.graph, &radii);
        }
        if request.update_relationships {
            self.simulation.update_relationships(&self.graph);
        }
        if request.restart_simulation {
            self.simulation.restart();
        }
    }

    /// Incremental-relationship feed entry point. Existing node positions are
    /// preserved; the simulation is reheated so the additions settle in.
    pub fn add_relationships(
        &mut self,
        node_seeds: Vec<NodeSeed>,
        relationship_seeds: Vec<RelationshipSeed>,
        is_initial_batch: bool,
    ) -> usize {
        let added = self.graph.add_relationships(node_seeds, relationship_seeds);
        self.update(UpdateRequest::all());
        if is_initial_batch {
            self.precompute_and_start(|| {});
        }
        self.emit_stats();
        added
    }

    pub fn resize(
        &mut self,
        width: f32,
        height: f32,
        is_fullscreen: bool,
        wheel_zoom_requires_modifier: bool,
    ) {
        self.viewport
            .resize(width, height, is_fullscreen, wheel_zoom_requires_modifier);
    }

    pub fn zoom_by_type(&mut self, zoom_type: ZoomType) {
        let limits = self
            .viewport
            .zoom_by_type(zoom_type, self.geometry.bounding_box());
        self.events.trigger_zoom_limits_changed(limits);
    }

    /// Swaps the style resolver and recomputes everything derived from it.
    pub fn set_style(&mut self, style: Box<dyn GraphStyle>) {
        self.style_version = style.version();
        self.style = style;
        self.update(UpdateRequest::all());
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn geometry(&self) -> &GeometryFrame {
        &self.geometry
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    fn node_radii(&self) -> Vec<f32> {
        self.geometry
            .nodes()
            .iter()
            .map(|shape| shape.radius)
            .collect()
    }

    fn emit_stats(&mut self) {
        self.events.trigger_graph_stats_changed(GraphStats {
            node_count: self.graph.node_count(),
            relationship_count: self.graph.relationship_count(),
        });
    }

    fn resolve_highlight(&self) -> Highlight {
        let mut highlight = Highlight::default();
        match self.hovered {
            Some(GraphItem::Node(id)) => highlight.hovered_node = self.graph.node_index(id),
            Some(GraphItem::Relationship(id)) => {
                highlight.hovered_relationship = self.relationship_shape_index(id);
            }
            None => {}
        }
        match self.selected {
            Some(GraphItem::Node(id)) => highlight.selected_node = self.graph.node_index(id),
            Some(GraphItem::Relationship(id)) => {
                highlight.selected_relationship = self.relationship_shape_index(id);
            }
            None => {}
        }
        highlight
    }

    fn relationship_shape_index(&self, id: model::RelationshipId) -> Option<usize> {
        let rel_index = self
            .graph
            .relationships()
            .iter()
            .position(|rel| rel.id == id)?;
        self.geometry
            .relationships()
            .iter()
            .position(|shape| shape.relationship_index == rel_index)
    }

    /// Per-frame entry point: input, one simulation tick, geometry refresh
    /// and repaint, as one unit.
    pub fn show(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        if rect.width() < 1.0 || rect.height() < 1.0 {
            if !self.surface_warned {
                log::warn!("drawing surface has no size yet; skipping frame");
                self.surface_warned = true;
            }
            return;
        }
        self.surface_warned = false;
        self.viewport.set_dimensions(rect.width(), rect.height());

        self.handle_input(ui, rect, &response);

        if self.style.version() != self.style_version {
            self.style_version = self.style.version();
            self.update(UpdateRequest::all());
        }

        let delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        let moving = self.simulation.tick(&mut self.graph, delta_seconds);
        if moving || response.dragged() {
            ui.ctx().request_repaint();
            self.geometry
                .on_graph_change(&self.graph, self.style.as_ref(), UpdateScope::all());
        }

        let painter = ui.painter_at(rect);
        let highlight = self.resolve_highlight();
        render::draw_frame(&painter, rect, &self.geometry, &self.viewport, &highlight);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use eframe::egui::Vec2;

    use super::model::tests::{node_seed, rel_seed};
    use super::*;
    use crate::engine::style::DefaultStyle;

    fn view_with(nodes: Vec<NodeSeed>, rels: Vec<RelationshipSeed>) -> GraphView {
        let graph = Graph::from_seeds(nodes, rels);
        let mut view = GraphView::new(graph, Box::new(DefaultStyle::default()));
        view.init();
        view
    }

    #[test]
    fn empty_graph_init_fit_yields_identity_scale() {
        let mut view = view_with(Vec::new(), Vec::new());
        view.resize(800.0, 600.0, false, false);

        let bounds = view.geometry().bounding_box();
        assert_eq!(bounds.width(), 0.0);
        assert_eq!(bounds.height(), 0.0);

        view.zoom_by_type(ZoomType::Fit);
        assert_eq!(view.viewport().scale(), 1.0);
    }

    #[test]
    fn fit_after_settling_contains_the_layout() {
        let mut view = view_with(
            (0..5).map(|id| node_seed(id, "Person")).collect(),
            (1..5).map(|id| rel_seed(100 + id, 0, id)).collect(),
        );
        view.resize(800.0, 600.0, false, false);
        view.precompute_and_start(|| {});

        view.zoom_by_type(ZoomType::Fit);
        let scale = view.viewport().scale();
        let bounds = view.geometry().bounding_box();
        assert!(scale.is_finite() && scale > 0.0);
        assert!(bounds.width() * scale <= 800.0 + 1e-3);
        assert!(bounds.height() * scale <= 600.0 + 1e-3);
    }

    #[test]
    fn on_settled_fires_once_after_precompute() {
        let mut view = view_with(
            vec![node_seed(1, "Person"), node_seed(2, "Person")],
            vec![rel_seed(10, 1, 2)],
        );
        let fired = Rc::new(Cell::new(0));
        let sink = Rc::clone(&fired);
        view.precompute_and_start(move || sink.set(sink.get() + 1));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn incremental_feed_updates_stats_and_preserves_positions() {
        let mut view = view_with(
            vec![node_seed(1, "Person"), node_seed(2, "Person")],
            vec![rel_seed(10, 1, 2)],
        );
        let stats = Rc::new(Cell::new(GraphStats::default()));
        let sink = Rc::clone(&stats);
        view.events_mut()
            .on_graph_stats_changed(move |snapshot| sink.set(*snapshot));

        let before: Vec<Vec2> = view.graph().nodes().iter().map(|n| n.position).collect();
        let added = view.add_relationships(
            vec![node_seed(3, "Movie")],
            vec![rel_seed(11, 1, 3)],
            false,
        );

        assert_eq!(added, 1);
        assert_eq!(stats.get().node_count, 3);
        assert_eq!(stats.get().relationship_count, 2);
        for (node, prior) in view.graph().nodes().iter().take(2).zip(before) {
            assert!((node.position - prior).length() < 1e-6);
        }
    }

    #[test]
    fn zoom_limit_events_reach_subscribers() {
        let mut view = view_with(vec![node_seed(1, "Person")], Vec::new());
        view.resize(800.0, 600.0, false, false);
        let at_max = Rc::new(Cell::new(false));
        let sink = Rc::clone(&at_max);
        view.events_mut()
            .on_zoom_limits_changed(move |limits| sink.set(limits.at_max));

        for _ in 0..10 {
            view.zoom_by_type(ZoomType::In);
        }
        assert!(at_max.get());
    }
}
