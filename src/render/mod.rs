//! Painting of shapes, stroke previews and the pointer highlight onto [`Surface`]s.

pub mod text;

use std::f32::consts::PI;

use egui::{Color32, Pos2, Rect, Vec2};

use crate::geometry::Area;
use crate::geometry::hit_testing::{self, BUTTON_RADIUS, ShapeHit};
use crate::mode::DrawingMode;
use crate::shape::{ShapeDefinition, ShapeType};
use crate::style::{GeneralStyle, with_opacity};
use crate::surface::Surface;

pub use text::{draw_text, measure_text};

const FRAME_COLOR: Color32 = Color32::from_rgb(30, 144, 255);
const HANDLE_COLOR: Color32 = Color32::from_rgb(30, 120, 255);
const HANDLE_HOVER_COLOR: Color32 = Color32::from_rgb(255, 165, 0);
const COMMIT_COLOR: Color32 = Color32::from_rgb(40, 160, 70);
const MARQUEE_COLOR: Color32 = Color32::from_rgb(40, 40, 40);
const HANDLE_SIZE: f32 = 8.0;
const MARQUEE_DASH: f32 = 6.0;

const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(255, 255, 0);
const HIGHLIGHT_DIAMETER: f32 = 80.0;
const ERASE_HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(255, 192, 203);
const ERASE_HIGHLIGHT_DIAMETER: f32 = 50.0;
const HATCH_FILL: Color32 = Color32::from_rgb(0xee, 0xee, 0xee);
const HATCH_LINE: Color32 = Color32::from_rgb(0x30, 0x30, 0x30);

#[derive(Debug, Clone, Copy)]
enum Outline {
    /// Radii clockwise from the top-left corner
    Rounded { rect: Rect, radii: [f32; 4] },
    Ellipse { rect: Rect },
}

impl Outline {
    fn for_shape(shape_type: ShapeType, rect: Rect, radius: f32) -> Self {
        let max_radius = rect.width().min(rect.height()) / 2.0;
        let r = radius.clamp(0.0, max_radius);
        let radii = match shape_type {
            ShapeType::Circle => return Self::Ellipse { rect },
            ShapeType::RadiusTop => [r, r, 0.0, 0.0],
            ShapeType::RadiusBottom => [0.0, 0.0, r, r],
            ShapeType::RadiusHalf => [max_radius; 4],
            _ => [r; 4],
        };
        Self::Rounded { rect, radii }
    }

    /// Whether `p` lies inside the outline shrunk by `inset`
    fn contains(&self, p: Pos2, inset: f32) -> bool {
        match *self {
            Self::Rounded { rect, radii } => {
                let rect = rect.shrink(inset);
                if !rect.is_positive() || !rect.contains(p) {
                    return false;
                }
                let max_radius = rect.width().min(rect.height()) / 2.0;
                let radius = |i: usize| (radii[i] - inset).clamp(0.0, max_radius);
                let corners = [
                    (radius(0), rect.min.x, rect.min.y, 1.0, 1.0),
                    (radius(1), rect.max.x, rect.min.y, -1.0, 1.0),
                    (radius(2), rect.max.x, rect.max.y, -1.0, -1.0),
                    (radius(3), rect.min.x, rect.max.y, 1.0, -1.0),
                ];
                corners.into_iter().all(|(r, x, y, dx, dy)| {
                    if r <= 0.0 {
                        return true;
                    }
                    let center = Pos2::new(x + dx * r, y + dy * r);
                    let in_corner_box = (p.x - center.x) * dx < 0.0 && (p.y - center.y) * dy < 0.0;
                    !in_corner_box || p.distance_sq(center) <= r * r
                })
            }
            Self::Ellipse { rect } => {
                let rect = rect.shrink(inset);
                let (rx, ry) = (rect.width() / 2.0, rect.height() / 2.0);
                if rx <= 0.0 || ry <= 0.0 {
                    return false;
                }
                let c = rect.center();
                let (nx, ny) = ((p.x - c.x) / rx, (p.y - c.y) / ry);
                nx * nx + ny * ny <= 1.0
            }
        }
    }
}

/// Stamps the shape's content onto `target`, without any decorations.
///
/// Content is laid out unrotated in a scratch raster and then blitted with the shape's
/// rotation and opacity. Marquees paint nothing.
pub fn paint_shape(target: &mut Surface, shape: &ShapeDefinition) {
    match shape.shape_type {
        ShapeType::Select => {}
        ShapeType::Image => {
            if let Some(payload) = &shape.payload {
                target.draw_image(payload.image(), &shape.size, shape.rotation, shape.general.opacity);
            }
        }
        _ => {
            let width = shape.size.width.ceil().max(1.0) as u32;
            let height = shape.size.height.ceil().max(1.0) as u32;
            let mut local = Surface::new(width, height);
            paint_local(&mut local, shape, Rect::from_min_size(Pos2::ZERO, shape.size.size()));
            let dest = Area::new(shape.size.x, shape.size.y, width as f32, height as f32);
            target.draw_image(local.image(), &dest, shape.rotation, shape.general.opacity);
        }
    }
}

fn paint_local(local: &mut Surface, shape: &ShapeDefinition, bounds: Rect) {
    if shape.shape_type == ShapeType::Text {
        paint_centered_text(local, bounds, shape);
        return;
    }

    let outline = Outline::for_shape(shape.shape_type, bounds, shape.shape.radius);
    let color = shape.general.color;
    if shape.shape.filled {
        local.fill_where(bounds, color, |p| outline.contains(p, 0.0));
    } else {
        let width = shape.general.line_width.max(1.0);
        local.fill_where(bounds, color, |p| outline.contains(p, 0.0) && !outline.contains(p, width));
    }

    if shape.shape.with_border {
        let width = shape.border.line_width.max(1.0);
        let interval = shape.border.interval;
        local.fill_where(bounds, shape.border.effective_color(), |p| {
            let on_ring = outline.contains(p, 0.0) && !outline.contains(p, width);
            let on_dash = interval <= 0.0 || ((p.x + p.y) / interval).floor() as i64 % 2 == 0;
            on_ring && on_dash
        });
    }

    if shape.shape.with_text {
        paint_centered_text(local, bounds, shape);
    }
}

fn paint_centered_text(local: &mut Surface, bounds: Rect, shape: &ShapeDefinition) {
    let text = &shape.text.text;
    if text.is_empty() {
        return;
    }
    let size = measure_text(text, shape.text.font_size);
    let origin = bounds.center() - size / 2.0;
    draw_text(local, origin, text, &shape.text);
}

/// Repaints the overlay with the live shape, its frame, handles and buttons.
///
/// `hovered` highlights the grip or button under the pointer.
pub fn paint_preview(overlay: &mut Surface, shape: &ShapeDefinition, hovered: Option<ShapeHit>) {
    overlay.clear();
    let rect = shape.size.rect();

    if shape.is_marquee() {
        overlay.stroke_dashed_rect(rect, 1.0, MARQUEE_DASH, MARQUEE_COLOR);
    } else {
        paint_shape(overlay, shape);
        let frame_width = if hovered == Some(ShapeHit::Inside) { 2.0 } else { 1.0 };
        overlay.stroke_rect(rect, frame_width, FRAME_COLOR);
    }

    for (handle, pos) in hit_testing::handle_positions(&shape.size) {
        let color = if hovered == Some(ShapeHit::Resize(handle)) {
            HANDLE_HOVER_COLOR
        } else {
            HANDLE_COLOR
        };
        overlay.fill_rect(Rect::from_center_size(pos, Vec2::splat(HANDLE_SIZE)), color);
    }

    let buttons = hit_testing::decorations(&shape.size, shape.with_middle_buttons, shape.with_corner_button);
    if let Some(center) = buttons.rotate_left {
        paint_rotate_button(overlay, center, -1.0, hovered == Some(ShapeHit::RotateLeft));
    }
    if let Some(center) = buttons.rotate_right {
        paint_rotate_button(overlay, center, 1.0, hovered == Some(ShapeHit::RotateRight));
    }
    if let Some(center) = buttons.commit {
        let color = if hovered == Some(ShapeHit::Commit) {
            HANDLE_HOVER_COLOR
        } else {
            COMMIT_COLOR
        };
        overlay.fill_circle(center, BUTTON_RADIUS, color);
        let check = [
            center + Vec2::new(-4.5, 0.0),
            center + Vec2::new(-1.5, 3.5),
            center + Vec2::new(4.5, -3.5),
        ];
        overlay.stroke_polyline(&check, 2.0, Color32::WHITE);
    }
}

/// `direction` is -1 for counter-clockwise, 1 for clockwise
fn paint_rotate_button(overlay: &mut Surface, center: Pos2, direction: f32, hovered: bool) {
    let color = if hovered { HANDLE_HOVER_COLOR } else { HANDLE_COLOR };
    overlay.fill_circle(center, BUTTON_RADIUS, color);
    let arc = circle_arc(center, BUTTON_RADIUS * 0.5, -PI / 2.0, direction * 1.5 * PI, 16);
    overlay.stroke_polyline(&arc, 1.5, Color32::WHITE);
    if let Some(&tip) = arc.last() {
        overlay.fill_circle(tip, 2.0, Color32::WHITE);
    }
}

fn circle_arc(center: Pos2, radius: f32, start: f32, sweep: f32, segments: usize) -> Vec<Pos2> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| center + Vec2::angled(start + sweep * i as f32 / segments as f32) * radius)
        .collect()
}

/// Half circle from `start` to `end`, bulging to the left of the travel direction
pub fn arc_points(start: Pos2, end: Pos2) -> Vec<Pos2> {
    let center = start + (end - start) / 2.0;
    let radius = (end - start).length() / 2.0;
    if radius < 0.5 {
        return vec![start, end];
    }
    let segments = ((radius * PI / 4.0).ceil() as usize).clamp(8, 256);
    circle_arc(center, radius, (start - center).angle(), PI, segments)
}

/// Line or arc from `start` to `end` in the stroke style
pub fn paint_stroke(surface: &mut Surface, mode: DrawingMode, start: Pos2, end: Pos2, general: &GeneralStyle) {
    let color = general.effective_color();
    let width = general.line_width.max(1.0);
    if mode == DrawingMode::Arc {
        surface.stroke_polyline(&arc_points(start, end), width, color);
    } else {
        surface.stroke_segment(start, end, width, color);
    }
}

/// Repaints the pointer highlight for the freehand and line modes
pub fn paint_cursor(surface: &mut Surface, mode: DrawingMode, pos: Pos2, general: &GeneralStyle) {
    surface.clear();
    if mode == DrawingMode::Erase {
        surface.fill_circle(pos, ERASE_HIGHLIGHT_DIAMETER / 2.0, with_opacity(ERASE_HIGHLIGHT_COLOR, 0.7));
        let radius = (general.line_width / 2.0).max(2.0);
        let bounds = Rect::from_center_size(pos, Vec2::splat(radius * 2.0));
        surface.fill_where(bounds, HATCH_FILL, |p| {
            p.distance_sq(pos) <= radius * radius && (p.x + p.y).rem_euclid(6.0) >= 1.5
        });
        surface.fill_where(bounds, HATCH_LINE, |p| {
            p.distance_sq(pos) <= radius * radius && (p.x + p.y).rem_euclid(6.0) < 1.5
        });
        surface.stroke_circle(pos, radius, 1.0, HATCH_LINE);
    } else {
        surface.fill_circle(pos, HIGHLIGHT_DIAMETER / 2.0, with_opacity(HIGHLIGHT_COLOR, 0.32));
        surface.fill_circle(pos, (general.line_width / 2.0).max(1.0), general.effective_color());
    }
}
