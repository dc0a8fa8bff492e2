use super::model::{NodeId, RelationshipId};
use super::viewport::ZoomLimits;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphItem {
    Node(NodeId),
    Relationship(RelationshipId),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub node_count: usize,
    pub relationship_count: usize,
}

type Handlers<T> = Vec<Box<dyn FnMut(&T)>>;

/// Typed observer registry: one handler list per event kind, so every
/// subscription is checked against the payload shape at compile time.
#[derive(Default)]
pub struct EventBus {
    item_hover: Handlers<Option<GraphItem>>,
    item_select: Handlers<Option<GraphItem>>,
    zoom_limits_changed: Handlers<ZoomLimits>,
    graph_stats_changed: Handlers<GraphStats>,
    info_message: Handlers<String>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_item_hover(&mut self, handler: impl FnMut(&Option<GraphItem>) + 'static) {
        self.item_hover.push(Box::new(handler));
    }

    pub fn on_item_select(&mut self, handler: impl FnMut(&Option<GraphItem>) + 'static) {
        self.item_select.push(Box::new(handler));
    }

    pub fn on_zoom_limits_changed(&mut self, handler: impl FnMut(&ZoomLimits) + 'static) {
        self.zoom_limits_changed.push(Box::new(handler));
    }

    pub fn on_graph_stats_changed(&mut self, handler: impl FnMut(&GraphStats) + 'static) {
        self.graph_stats_changed.push(Box::new(handler));
    }

    pub fn on_info_message(&mut self, handler: impl FnMut(&String) + 'static) {
        self.info_message.push(Box::new(handler));
    }

    pub fn trigger_item_hover(&mut self, item: Option<GraphItem>) {
        for handler in &mut self.item_hover {
            handler(&item);
        }
    }

    pub fn trigger_item_select(&mut self, item: Option<GraphItem>) {
        for handler in &mut self.item_select {
            handler(&item);
        }
    }

    pub fn trigger_zoom_limits_changed(&mut self, limits: ZoomLimits) {
        for handler in &mut self.zoom_limits_changed {
            handler(&limits);
        }
    }

    pub fn trigger_graph_stats_changed(&mut self, stats: GraphStats) {
        for handler in &mut self.graph_stats_changed {
            handler(&stats);
        }
    }

    pub fn trigger_info_message(&mut self, message: &str) {
        let message = message.to_owned();
        for handler in &mut self.info_message {
            handler(&message);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn every_registered_handler_fires() {
        let mut bus = EventBus::new();
        let count = Rc::new(Cell::new(0));

        for _ in 0..3 {
            let count = Rc::clone(&count);
            bus.on_item_select(move |_| count.set(count.get() + 1));
        }

        bus.trigger_item_select(Some(GraphItem::Node(NodeId(1))));
        bus.trigger_item_select(None);
        assert_eq!(count.get(), 6);
    }

    #[test]
    fn stats_payload_reaches_handler_intact() {
        let mut bus = EventBus::new();
        let seen = Rc::new(Cell::new(GraphStats::default()));
        let sink = Rc::clone(&seen);
        bus.on_graph_stats_changed(move |stats| sink.set(*stats));

        bus.trigger_graph_stats_changed(GraphStats {
            node_count: 4,
            relationship_count: 9,
        });
        assert_eq!(seen.get().node_count, 4);
        assert_eq!(seen.get().relationship_count, 9);
    }

    #[test]
    fn zoom_limit_flags_are_delivered() {
        let mut bus = EventBus::new();
        let seen = Rc::new(Cell::new((false, false)));
        let sink = Rc::clone(&seen);
        bus.on_zoom_limits_changed(move |limits| sink.set((limits.at_min, limits.at_max)));

        bus.trigger_zoom_limits_changed(ZoomLimits {
            at_min: false,
            at_max: true,
        });
        assert_eq!(seen.get(), (false, true));
    }
}
