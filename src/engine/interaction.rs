use eframe::egui::{self, PointerButton, Rect, Response, Ui, Vec2};

use super::GraphView;
use super::events::GraphItem;
use super::geometry::RelationshipPath;
use super::render::screen_to_world;
use super::viewport::WheelOutcome;

const WHEEL_INFO_MESSAGE: &str = "Hold Ctrl (or Cmd) while scrolling to zoom the graph";
/// Extra pick slack around relationship paths, in model units.
const RELATIONSHIP_SLOP: f32 = 5.0;

impl GraphView {
    pub(super) fn handle_input(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        self.handle_wheel(ui, rect, response);
        self.handle_drag(rect, response);
        self.handle_hover(ui, rect, response);

        if response.clicked() {
            self.selected = self.hovered;
            self.events.trigger_item_select(self.selected);
        }
    }

    fn handle_wheel(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        if !response.hovered() {
            return;
        }
        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let modifier_held = ui.input(|input| input.modifiers.ctrl || input.modifiers.command);
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let focus = pointer - rect.center();

        match self.viewport.wheel_zoom(scroll, modifier_held, focus) {
            WheelOutcome::Applied(limits) => self.events.trigger_zoom_limits_changed(limits),
            WheelOutcome::SuppressedFirst => self.events.trigger_info_message(WHEEL_INFO_MESSAGE),
            WheelOutcome::Suppressed => {}
        }
    }

    fn handle_drag(&mut self, rect: Rect, response: &Response) {
        if response.drag_started_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let world = screen_to_world(rect, &self.viewport, pointer);
            self.dragging = self.hit_node(world);
            if let Some(index) = self.dragging {
                let id = self.graph.nodes()[index].id;
                self.graph.set_pinned(id, true);
            }
        }

        if let Some(index) = self.dragging {
            if response.dragged_by(PointerButton::Primary)
                && let Some(pointer) = response.interact_pointer_pos()
            {
                let world = screen_to_world(rect, &self.viewport, pointer);
                self.graph.nodes_mut()[index].position = world;
                self.simulation.restart();
            }
        } else if response.dragged_by(PointerButton::Primary)
            || response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            self.viewport.pan_by(response.drag_delta());
        }

        if response.drag_stopped() {
            // The node stays pinned where the user left it.
            self.dragging = None;
        }
    }

    fn handle_hover(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        let hovered = response
            .hover_pos()
            .filter(|_| response.hovered())
            .and_then(|pointer| self.hit_test(screen_to_world(rect, &self.viewport, pointer)));

        if hovered != self.hovered {
            self.hovered = hovered;
            self.events.trigger_item_hover(hovered);
        }
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }
    }

    pub(super) fn hit_test(&self, world: Vec2) -> Option<GraphItem> {
        if let Some(index) = self.hit_node(world) {
            return Some(GraphItem::Node(self.graph.nodes()[index].id));
        }
        if let Some(shape_index) = self.hit_relationship(world) {
            let rel_index = self.geometry.relationships()[shape_index].relationship_index;
            return Some(GraphItem::Relationship(
                self.graph.relationships()[rel_index].id,
            ));
        }
        None
    }

    /// Topmost node under the point; later shapes paint over earlier ones.
    pub(super) fn hit_node(&self, world: Vec2) -> Option<usize> {
        self.geometry
            .nodes()
            .iter()
            .rev()
            .find(|shape| (shape.center - world).length() <= shape.radius)
            .map(|shape| shape.node_index)
    }

    fn hit_relationship(&self, world: Vec2) -> Option<usize> {
        self.geometry
            .relationships()
            .iter()
            .enumerate()
            .filter_map(|(shape_index, shape)| {
                let distance = match shape.path {
                    RelationshipPath::Line { from, to } => point_segment_distance(world, from, to),
                    RelationshipPath::Arc { from, control, to } => {
                        point_bezier_distance(world, from, control, to)
                    }
                    RelationshipPath::Loop { center, radius } => {
                        ((center - world).length() - radius).abs()
                    }
                };
                (distance <= shape.width + RELATIONSHIP_SLOP).then_some((shape_index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(shape_index, _)| shape_index)
    }
}

fn point_segment_distance(point: Vec2, from: Vec2, to: Vec2) -> f32 {
    let segment = to - from;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return (point - from).length();
    }
    let t = ((point - from).dot(segment) / length_sq).clamp(0.0, 1.0);
    (point - (from + segment * t)).length()
}

fn point_bezier_distance(point: Vec2, from: Vec2, control: Vec2, to: Vec2) -> f32 {
    const SAMPLES: usize = 16;
    let mut best = f32::INFINITY;
    let mut previous = from;
    for step in 1..=SAMPLES {
        let t = step as f32 / SAMPLES as f32;
        let inverse = 1.0 - t;
        let current =
            from * (inverse * inverse) + control * (2.0 * inverse * t) + to * (t * t);
        best = best.min(point_segment_distance(point, previous, current));
        previous = current;
    }
    best
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::super::GraphView;
    use super::super::events::GraphItem;
    use super::super::model::Graph;
    use super::super::model::tests::{node_seed, rel_seed};
    use super::super::style::DefaultStyle;
    use super::*;

    fn view_with_pair() -> GraphView {
        let mut graph = Graph::from_seeds(
            vec![node_seed(1, "Person"), node_seed(2, "Person")],
            vec![rel_seed(10, 1, 2)],
        );
        graph.nodes_mut()[0].position = vec2(0.0, 0.0);
        graph.nodes_mut()[1].position = vec2(200.0, 0.0);
        let mut view = GraphView::new(graph, Box::new(DefaultStyle::default()));
        view.init();
        view
    }

    #[test]
    fn segment_distance_handles_interior_and_endpoints() {
        let from = vec2(0.0, 0.0);
        let to = vec2(10.0, 0.0);
        assert!((point_segment_distance(vec2(5.0, 3.0), from, to) - 3.0).abs() < 1e-5);
        assert!((point_segment_distance(vec2(-4.0, 0.0), from, to) - 4.0).abs() < 1e-5);
        assert!((point_segment_distance(vec2(0.0, 0.0), from, from) - 0.0).abs() < 1e-5);
    }

    #[test]
    fn nodes_are_picked_before_relationships() {
        let view = view_with_pair();
        match view.hit_test(vec2(0.0, 0.0)) {
            Some(GraphItem::Node(id)) => assert_eq!(id.0, 1),
            other => panic!("expected node hit, got {other:?}"),
        }
    }

    #[test]
    fn relationship_is_picked_along_its_shaft() {
        let view = view_with_pair();
        match view.hit_test(vec2(100.0, 0.0)) {
            Some(GraphItem::Relationship(id)) => assert_eq!(id.0, 10),
            other => panic!("expected relationship hit, got {other:?}"),
        }
    }

    #[test]
    fn empty_space_hits_nothing() {
        let view = view_with_pair();
        assert_eq!(view.hit_test(vec2(100.0, 300.0)), None);
    }
}
