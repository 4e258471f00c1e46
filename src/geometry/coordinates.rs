use egui::{Pos2, Rect, Vec2};

use crate::input::PointerEvent;

/// Where a surface is displayed on screen.
///
/// The host refreshes it every frame. The engine only needs it to turn screen positions
/// into surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceFrame {
    /// Screen rectangle the surface is painted into
    pub screen_rect: Rect,
    /// Scroll offset of the container holding the surface
    pub scroll: Vec2,
    /// Pixel size of the surface backing store
    pub pixel_size: Vec2,
}

impl SurfaceFrame {
    pub fn new(screen_rect: Rect, pixel_size: Vec2) -> Self {
        Self {
            screen_rect,
            scroll: Vec2::ZERO,
            pixel_size,
        }
    }

    pub fn with_scroll(mut self, scroll: Vec2) -> Self {
        self.scroll = scroll;
        self
    }

    /// Display points to surface pixels, per axis
    pub fn scale(&self) -> Vec2 {
        let size = self.screen_rect.size();
        let axis = |pixels: f32, points: f32| if points > 0.0 { pixels / points } else { 1.0 };
        Vec2::new(axis(self.pixel_size.x, size.x), axis(self.pixel_size.y, size.y))
    }
}

/// Surface-local pixel position of a pointer event; `(0, 0)` without a frame.
pub fn map_coordinates(event: &PointerEvent, frame: Option<&SurfaceFrame>) -> Pos2 {
    let Some(frame) = frame else {
        return Pos2::ZERO;
    };
    let local = event.screen_pos - frame.screen_rect.min + frame.scroll;
    let scale = frame.scale();
    Pos2::new(local.x * scale.x, local.y * scale.y)
}
