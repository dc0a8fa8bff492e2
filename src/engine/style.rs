use eframe::egui::Color32;

use super::model::Node;

#[derive(Clone, Debug)]
pub struct NodeStyle {
    pub color: Color32,
    pub base_radius: f32,
    /// Property whose value becomes the node caption; falls back to the first
    /// label, then the numeric id.
    pub caption_property: Option<String>,
}

#[derive(Clone, Debug)]
pub struct RelationshipStyle {
    pub color: Color32,
    pub width: f32,
    pub show_caption: bool,
}

/// Style resolver consumed by the geometry model. `version` must increase
/// whenever any returned attribute may have changed, signalling a full
/// geometry recompute.
pub trait GraphStyle {
    fn node_style(&self, labels: &[String]) -> NodeStyle;
    fn relationship_style(&self, rel_type: &str) -> RelationshipStyle;
    fn version(&self) -> u64;
}

pub fn resolve_caption(node: &Node, style: &NodeStyle) -> String {
    if let Some(property) = &style.caption_property
        && let Some(value) = node.property(property)
    {
        return value.to_owned();
    }
    if let Some(label) = node.labels.first() {
        return label.clone();
    }
    format!("#{}", node.id.0)
}

const PALETTE: [Color32; 8] = [
    Color32::from_rgb(86, 148, 210),
    Color32::from_rgb(218, 113, 148),
    Color32::from_rgb(141, 204, 147),
    Color32::from_rgb(236, 181, 201),
    Color32::from_rgb(77, 184, 187),
    Color32::from_rgb(255, 196, 84),
    Color32::from_rgb(216, 157, 230),
    Color32::from_rgb(255, 141, 101),
];

/// Label-keyed palette rotation with a bumpable version counter.
pub struct DefaultStyle {
    version: u64,
    base_radius: f32,
}

impl Default for DefaultStyle {
    fn default() -> Self {
        Self {
            version: 1,
            base_radius: 14.0,
        }
    }
}

impl DefaultStyle {
    pub fn set_base_radius(&mut self, radius: f32) {
        self.base_radius = radius.clamp(4.0, 60.0);
        self.version += 1;
    }
}

fn palette_color(key: &str) -> Color32 {
    let (jx, _) = crate::util::stable_pair(key);
    let slot = (((jx + 1.0) * 0.5) * PALETTE.len() as f32) as usize;
    PALETTE[slot.min(PALETTE.len() - 1)]
}

impl GraphStyle for DefaultStyle {
    fn node_style(&self, labels: &[String]) -> NodeStyle {
        let color = labels
            .first()
            .map(|label| palette_color(label))
            .unwrap_or(Color32::from_rgb(120, 130, 140));

        NodeStyle {
            color,
            base_radius: self.base_radius,
            caption_property: Some("name".to_owned()),
        }
    }

    fn relationship_style(&self, rel_type: &str) -> RelationshipStyle {
        RelationshipStyle {
            color: palette_color(rel_type).gamma_multiply(0.8),
            width: 2.0,
            show_caption: true,
        }
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::model::tests::node_seed;
    use crate::engine::model::Graph;

    #[test]
    fn same_label_resolves_to_same_color() {
        let style = DefaultStyle::default();
        let a = style.node_style(&["Person".to_owned()]);
        let b = style.node_style(&["Person".to_owned()]);
        assert_eq!(a.color, b.color);
    }

    #[test]
    fn caption_falls_back_from_property_to_label() {
        let graph = Graph::from_seeds(vec![node_seed(7, "Movie")], Vec::new());
        let style = DefaultStyle::default();
        let node = &graph.nodes()[0];

        let resolved = style.node_style(&node.labels);
        assert_eq!(resolve_caption(node, &resolved), "node-7");

        let no_property = NodeStyle {
            caption_property: Some("missing".to_owned()),
            ..resolved
        };
        assert_eq!(resolve_caption(node, &no_property), "Movie");
    }

    #[test]
    fn version_bumps_on_style_change() {
        let mut style = DefaultStyle::default();
        let before = style.version();
        style.set_base_radius(20.0);
        assert!(style.version() > before);
    }
}
