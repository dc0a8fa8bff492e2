use std::cell::{Cell, RefCell};
use std::rc::Rc;

use eframe::egui::{self, Align, Context, Layout};

use crate::engine::GraphView;
use crate::engine::events::{GraphItem, GraphStats};
use crate::engine::model::{Graph, NodeSeed, RelationshipSeed};
use crate::engine::style::DefaultStyle;
use crate::engine::viewport::{ZoomLimits, ZoomType};

/// One visualization session: the engine plus the shared cells its event
/// handlers write into for the surrounding panels to read.
pub(super) struct SessionView {
    view: GraphView,
    zoom_limits: Rc<Cell<ZoomLimits>>,
    stats: Rc<Cell<GraphStats>>,
    selected: Rc<RefCell<Option<GraphItem>>>,
    hovered: Rc<RefCell<Option<GraphItem>>>,
    info_message: Rc<RefCell<Option<String>>>,
    wheel_requires_modifier: bool,
    node_radius: f32,
}

impl SessionView {
    pub(super) fn new(nodes: Vec<NodeSeed>, relationships: Vec<RelationshipSeed>) -> Self {
        let graph = Graph::from_seeds(nodes, relationships);
        let mut view = GraphView::new(graph, Box::new(DefaultStyle::default()));

        let zoom_limits = Rc::new(Cell::new(ZoomLimits::default()));
        let stats = Rc::new(Cell::new(GraphStats::default()));
        let selected = Rc::new(RefCell::new(None));
        let hovered = Rc::new(RefCell::new(None));
        let info_message = Rc::new(RefCell::new(None));

        {
            let sink = Rc::clone(&zoom_limits);
            view.events_mut()
                .on_zoom_limits_changed(move |limits| sink.set(*limits));
        }
        {
            let sink = Rc::clone(&stats);
            view.events_mut()
                .on_graph_stats_changed(move |snapshot| sink.set(*snapshot));
        }
        {
            let sink = Rc::clone(&selected);
            view.events_mut()
                .on_item_select(move |item| *sink.borrow_mut() = *item);
        }
        {
            let sink = Rc::clone(&hovered);
            view.events_mut()
                .on_item_hover(move |item| *sink.borrow_mut() = *item);
        }
        {
            let sink = Rc::clone(&info_message);
            view.events_mut()
                .on_info_message(move |message| *sink.borrow_mut() = Some(message.clone()));
        }

        view.init();
        view.precompute_and_start(|| log::debug!("initial layout settled"));

        Self {
            view,
            zoom_limits,
            stats,
            selected,
            hovered,
            info_message,
            wheel_requires_modifier: false,
            node_radius: 14.0,
        }
    }

    pub(super) fn show(
        &mut self,
        ctx: &Context,
        graph_path: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        let stats = self.stats.get();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("linkscope");
                    ui.separator();
                    ui.label(format!("graph: {graph_path}"));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload graph"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "{} nodes · {} relationships",
                            stats.node_count, stats.relationship_count
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| self.draw_controls(ctx, ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            self.view.show(ui);
        });
    }

    fn draw_controls(&mut self, ctx: &Context, ui: &mut egui::Ui) {
        ui.heading("View");
        ui.add_space(6.0);

        let limits = self.zoom_limits.get();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!limits.at_max, egui::Button::new("Zoom in"))
                .clicked()
            {
                self.view.zoom_by_type(ZoomType::In);
            }
            if ui
                .add_enabled(!limits.at_min, egui::Button::new("Zoom out"))
                .clicked()
            {
                self.view.zoom_by_type(ZoomType::Out);
            }
            if ui.button("Fit").clicked() {
                self.view.zoom_by_type(ZoomType::Fit);
            }
        });
        ui.label(format!("scale: {:.2}", self.view.viewport().scale()));

        ui.add_space(10.0);
        if ui
            .add(egui::Slider::new(&mut self.node_radius, 6.0..=30.0).text("node size"))
            .changed()
        {
            let mut style = DefaultStyle::default();
            style.set_base_radius(self.node_radius);
            self.view.set_style(Box::new(style));
        }

        ui.add_space(10.0);
        if ui
            .checkbox(
                &mut self.wheel_requires_modifier,
                "Wheel zoom needs Ctrl/Cmd",
            )
            .changed()
        {
            let (width, height) = self.view.viewport().dimensions();
            let fullscreen = ctx.input(|input| input.viewport().fullscreen.unwrap_or(false));
            self.view
                .resize(width, height, fullscreen, self.wheel_requires_modifier);
            *self.info_message.borrow_mut() = None;
        }

        let message = self.info_message.borrow().clone();
        if let Some(message) = message {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&message).weak());
                if ui.small_button("✕").clicked() {
                    *self.info_message.borrow_mut() = None;
                }
            });
        }
    }

    fn draw_details(&mut self, ui: &mut egui::Ui) {
        ui.heading("Details");
        ui.add_space(6.0);

        if let Some(item) = *self.hovered.borrow() {
            ui.label(format!("hovering: {}", self.describe_item(item)));
            ui.add_space(6.0);
        }

        let selected = *self.selected.borrow();
        let Some(item) = selected else {
            ui.label("Click a node or relationship to inspect it.");
            return;
        };

        match item {
            GraphItem::Node(id) => {
                let Some(node) = self.view.graph().node(id) else {
                    return;
                };
                ui.label(format!("Node #{}", id.0));
                ui.label(format!("labels: {}", node.labels.join(", ")));
                ui.add_space(4.0);
                for (key, value) in &node.properties {
                    ui.label(format!("{key}: {value}"));
                }
            }
            GraphItem::Relationship(id) => {
                let Some(rel) = self.view.graph().relationship(id) else {
                    return;
                };
                ui.label(format!("Relationship #{}", id.0));
                ui.label(format!(
                    "{} -[{}]-> {}",
                    rel.source.0, rel.rel_type, rel.target.0
                ));
                ui.add_space(4.0);
                for (key, value) in &rel.properties {
                    ui.label(format!("{key}: {value}"));
                }
            }
        }
    }

    fn describe_item(&self, item: GraphItem) -> String {
        match item {
            GraphItem::Node(id) => self
                .view
                .graph()
                .node(id)
                .and_then(|node| node.property("name").map(str::to_owned))
                .unwrap_or_else(|| format!("node #{}", id.0)),
            GraphItem::Relationship(id) => self
                .view
                .graph()
                .relationship(id)
                .map(|rel| rel.rel_type.clone())
                .unwrap_or_else(|| format!("relationship #{}", id.0)),
        }
    }
}
