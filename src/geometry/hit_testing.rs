use egui::{Pos2, Vec2};

use super::area::Area;
use super::handles::ResizeHandle;
use crate::shape::ShapeDefinition;

/// Default grab distance around handles and edges
pub const RESIZE_HANDLE_MARGIN: f32 = 8.0;
/// Radius of the round rotate and commit buttons
pub const BUTTON_RADIUS: f32 = 10.0;
/// Distance of the button row above the top edge
pub const BUTTON_OFFSET: f32 = 20.0;
/// Horizontal spacing of the rotate buttons from the top center
pub const ROTATE_BUTTON_SPREAD: f32 = 15.0;

/// What a pointer position lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeHit {
    Inside,
    Resize(ResizeHandle),
    RotateLeft,
    RotateRight,
    Commit,
}

/// Centers of the buttons drawn around a shape
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Decorations {
    pub rotate_left: Option<Pos2>,
    pub rotate_right: Option<Pos2>,
    pub commit: Option<Pos2>,
}

pub fn decorations(area: &Area, with_middle_buttons: bool, with_corner_button: bool) -> Decorations {
    let rect = area.rect();
    let row_y = rect.min.y - BUTTON_OFFSET;
    let (rotate_left, rotate_right) = if with_middle_buttons {
        (
            Some(Pos2::new(rect.center().x - ROTATE_BUTTON_SPREAD, row_y)),
            Some(Pos2::new(rect.center().x + ROTATE_BUTTON_SPREAD, row_y)),
        )
    } else {
        (None, None)
    };
    let commit = with_corner_button.then(|| Pos2::new(rect.max.x + BUTTON_OFFSET, row_y));

    Decorations {
        rotate_left,
        rotate_right,
        commit,
    }
}

/// Hit test against the unrotated bounding box and its buttons.
///
/// Buttons win over handles, corners over edges, handles over the interior.
pub fn hit_test(shape: &ShapeDefinition, pos: Pos2, margin: f32) -> Option<ShapeHit> {
    let buttons = decorations(&shape.size, shape.with_middle_buttons, shape.with_corner_button);
    let on_button = |center: Option<Pos2>| {
        center.is_some_and(|center| pos.distance_sq(center) <= BUTTON_RADIUS * BUTTON_RADIUS)
    };
    if on_button(buttons.commit) {
        return Some(ShapeHit::Commit);
    }
    if on_button(buttons.rotate_left) {
        return Some(ShapeHit::RotateLeft);
    }
    if on_button(buttons.rotate_right) {
        return Some(ShapeHit::RotateRight);
    }

    handle_at(&shape.size, pos, margin)
        .map(ShapeHit::Resize)
        .or_else(|| shape.size.contains(pos).then_some(ShapeHit::Inside))
}

/// The resize handle under `pos`, if any
pub fn handle_at(area: &Area, pos: Pos2, margin: f32) -> Option<ResizeHandle> {
    let rect = area.rect();
    let margin = margin.max(0.0);

    if let Some(corner) = ResizeHandle::CORNERS
        .into_iter()
        .find(|corner| pos.distance_sq(corner.position(rect)) <= margin * margin)
    {
        return Some(corner);
    }

    let within_x = pos.x > rect.min.x && pos.x < rect.max.x;
    let within_y = pos.y > rect.min.y && pos.y < rect.max.y;
    let near = |value: f32, edge: f32| (value - edge).abs() <= margin;

    if within_x && near(pos.y, rect.min.y) {
        Some(ResizeHandle::Top)
    } else if within_x && near(pos.y, rect.max.y) {
        Some(ResizeHandle::Bottom)
    } else if within_y && near(pos.x, rect.min.x) {
        Some(ResizeHandle::Left)
    } else if within_y && near(pos.x, rect.max.x) {
        Some(ResizeHandle::Right)
    } else {
        None
    }
}

/// Where each handle grip is drawn
pub fn handle_positions(area: &Area) -> impl Iterator<Item = (ResizeHandle, Pos2)> {
    let rect = area.rect();
    ResizeHandle::CORNERS
        .into_iter()
        .chain(ResizeHandle::EDGES)
        .map(move |handle| (handle, handle.position(rect)))
}

/// Offset that keeps the grabbed point under the pointer while dragging
pub fn drag_offset(area: &Area, pointer: Pos2) -> Vec2 {
    area.origin() - pointer
}
