use eframe::egui::epaint::QuadraticBezierShape;
use eframe::egui::{
    Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, Vec2,
};

use super::geometry::{GeometryFrame, RelationshipPath};
use super::viewport::Viewport;

const BACKGROUND: Color32 = Color32::from_rgb(19, 23, 29);
const NODE_RING: Color32 = Color32::from_rgba_premultiplied(15, 15, 15, 190);
const CAPTION_COLOR: Color32 = Color32::from_gray(238);
const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const HOVER_COLOR: Color32 = Color32::from_rgb(255, 164, 101);
/// Captions become unreadable noise below this scale and are dropped.
const CAPTION_MIN_SCALE: f32 = 0.45;

/// Indices of the shapes the interaction layer wants emphasized this frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct Highlight {
    pub hovered_node: Option<usize>,
    pub hovered_relationship: Option<usize>,
    pub selected_node: Option<usize>,
    pub selected_relationship: Option<usize>,
}

pub fn world_to_screen(rect: Rect, viewport: &Viewport, world: Vec2) -> Pos2 {
    rect.center() + viewport.translation() + world * viewport.scale()
}

pub fn screen_to_world(rect: Rect, viewport: &Viewport, screen: Pos2) -> Vec2 {
    (screen - rect.center() - viewport.translation()) / viewport.scale()
}

fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

/// Clears the surface and repaints the full frame: relationships first, then
/// nodes, so node discs cover the arrow endpoints.
pub fn draw_frame(
    painter: &Painter,
    rect: Rect,
    frame: &GeometryFrame,
    viewport: &Viewport,
    highlight: &Highlight,
) {
    painter.rect_filled(rect, 0.0, BACKGROUND);

    let scale = viewport.scale();
    for (shape_index, shape) in frame.relationships().iter().enumerate() {
        let emphasized = highlight.hovered_relationship == Some(shape_index)
            || highlight.selected_relationship == Some(shape_index);
        let color = if highlight.selected_relationship == Some(shape_index) {
            blend_color(shape.color, SELECTED_COLOR, 0.7)
        } else if highlight.hovered_relationship == Some(shape_index) {
            blend_color(shape.color, HOVER_COLOR, 0.6)
        } else {
            shape.color
        };
        let width = (shape.width * scale).clamp(0.5, 6.0) * if emphasized { 1.6 } else { 1.0 };
        let stroke = Stroke::new(width, color);

        match shape.path {
            RelationshipPath::Line { from, to } => {
                painter.line_segment(
                    [
                        world_to_screen(rect, viewport, from),
                        world_to_screen(rect, viewport, to),
                    ],
                    stroke,
                );
            }
            RelationshipPath::Arc { from, control, to } => {
                painter.add(QuadraticBezierShape::from_points_stroke(
                    [
                        world_to_screen(rect, viewport, from),
                        world_to_screen(rect, viewport, control),
                        world_to_screen(rect, viewport, to),
                    ],
                    false,
                    Color32::TRANSPARENT,
                    stroke,
                ));
            }
            RelationshipPath::Loop { center, radius } => {
                painter.circle_stroke(
                    world_to_screen(rect, viewport, center),
                    radius * scale,
                    stroke,
                );
            }
        }

        if let Some(arrow) = shape.arrow {
            painter.add(Shape::convex_polygon(
                arrow
                    .iter()
                    .map(|point| world_to_screen(rect, viewport, *point))
                    .collect(),
                color,
                Stroke::NONE,
            ));
        }

        if scale > CAPTION_MIN_SCALE
            && let Some((text, position)) = &shape.caption
        {
            painter.text(
                world_to_screen(rect, viewport, *position),
                Align2::CENTER_CENTER,
                text,
                FontId::proportional((10.0 * scale).clamp(8.0, 14.0)),
                blend_color(color, CAPTION_COLOR, 0.5),
            );
        }
    }

    for (shape_index, shape) in frame.nodes().iter().enumerate() {
        let center = world_to_screen(rect, viewport, shape.center);
        let radius = shape.radius * scale;
        let selected = highlight.selected_node == Some(shape_index);
        let hovered = highlight.hovered_node == Some(shape_index);

        let fill = if selected {
            blend_color(shape.color, SELECTED_COLOR, 0.55)
        } else if hovered {
            blend_color(shape.color, HOVER_COLOR, 0.4)
        } else {
            shape.color
        };

        painter.circle_filled(center, radius, fill);
        painter.circle_stroke(center, radius, Stroke::new(1.0, NODE_RING));
        if selected {
            painter.circle_stroke(center, radius + 4.0, Stroke::new(1.6, SELECTED_COLOR));
        }

        if radius > 8.0 && scale > CAPTION_MIN_SCALE {
            painter.text(
                center,
                Align2::CENTER_CENTER,
                &shape.caption,
                FontId::proportional((11.0 * scale).clamp(8.0, 15.0)),
                CAPTION_COLOR,
            );
        }
    }
}
