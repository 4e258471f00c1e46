use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::handles::ResizeHandle;

/// Smallest width or height a resize can produce
pub const MIN_AREA_SIZE: f32 = 10.0;

/// Axis-aligned region of a surface, top-left anchored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Width/height ratio to keep while resizing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f32>,
}

impl Area {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
            ratio: None,
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.min.x, rect.min.y, rect.width(), rect.height())
    }

    /// `size` centered inside a `bounds`-sized surface
    pub fn centered(bounds: Vec2, size: Vec2) -> Self {
        Self::new(
            (bounds.x - size.x) / 2.0,
            (bounds.y - size.y) / 2.0,
            size.x,
            size.y,
        )
    }

    pub fn centered_at(center: Pos2, size: Vec2) -> Self {
        Self::new(center.x - size.x / 2.0, center.y - size.y / 2.0, size.x, size.y)
    }

    pub fn with_ratio(mut self, ratio: Option<f32>) -> Self {
        self.ratio = ratio.filter(|r| r.is_finite() && *r > 0.0);
        self
    }

    /// Locks the current proportions
    pub fn lock_current_ratio(self) -> Self {
        if self.height > 0.0 {
            let ratio = self.width / self.height;
            self.with_ratio(Some(ratio))
        } else {
            self
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.origin(), self.size())
    }

    pub fn origin(&self) -> Pos2 {
        Pos2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Pos2 {
        self.rect().center()
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        self.rect().contains(pos)
    }

    pub fn moved_to(mut self, origin: Pos2) -> Self {
        self.x = origin.x;
        self.y = origin.y;
        self
    }

    /// Integer pixel rectangle `(x, y, width, height)` clipped to a `width`×`height` surface.
    ///
    /// `None` when nothing of the area lies on the surface.
    pub fn pixel_bounds(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = self.x.round().max(0.0);
        let y0 = self.y.round().max(0.0);
        let x1 = (self.x + self.width).round().min(width as f32);
        let y1 = (self.y + self.height).round().min(height as f32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
    }

    /// Moves the edges grabbed by `handle` to follow `pointer`.
    ///
    /// The opposite corner or edge stays anchored. Dimensions never drop below `min_size`,
    /// so the area cannot invert. With a ratio set, the dominant axis drives the other one.
    pub fn resized(&self, handle: ResizeHandle, pointer: Pos2, min_size: f32) -> Self {
        let rect = self.rect();
        let min_size = min_size.max(0.0);

        let (mut x0, mut y0, mut x1, mut y1) = (rect.min.x, rect.min.y, rect.max.x, rect.max.y);
        if handle.moves_left() {
            x0 = pointer.x.min(x1 - min_size);
        }
        if handle.moves_right() {
            x1 = pointer.x.max(x0 + min_size);
        }
        if handle.moves_top() {
            y0 = pointer.y.min(y1 - min_size);
        }
        if handle.moves_bottom() {
            y1 = pointer.y.max(y0 + min_size);
        }

        let mut width = x1 - x0;
        let mut height = y1 - y0;

        if let Some(ratio) = self.ratio {
            if handle.is_corner() {
                if width / ratio >= height {
                    height = width / ratio;
                } else {
                    width = height * ratio;
                }
            } else if handle.moves_x() {
                height = width / ratio;
            } else {
                width = height * ratio;
            }
            if width < min_size {
                width = min_size;
                height = width / ratio;
            }
            if height < min_size {
                height = min_size;
                width = height * ratio;
            }
        }

        let x = if handle.moves_left() {
            rect.max.x - width
        } else if handle.moves_right() {
            rect.min.x
        } else {
            rect.center().x - width / 2.0
        };
        let y = if handle.moves_top() {
            rect.max.y - height
        } else if handle.moves_bottom() {
            rect.min.y
        } else {
            rect.center().y - height / 2.0
        };

        Self {
            x,
            y,
            width,
            height,
            ratio: self.ratio,
        }
    }
}

/// Largest size with `source`'s proportions that fits in `max`; never upscales.
pub fn fit_size(source: Vec2, max: Vec2) -> Vec2 {
    if source.x <= 0.0 || source.y <= 0.0 {
        return Vec2::ZERO;
    }
    let scale = (max.x / source.x).min(max.y / source.y).min(1.0);
    Vec2::new(source.x * scale, source.y * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    #[test]
    fn corner_resize_keeps_opposite_corner() {
        let area = Area::new(100.0, 100.0, 100.0, 100.0);
        let resized = area.resized(ResizeHandle::TopLeft, pos2(50.0, 80.0), MIN_AREA_SIZE);
        assert_eq!(resized.rect().max, pos2(200.0, 200.0));
        assert_eq!(resized.origin(), pos2(50.0, 80.0));
    }

    #[test]
    fn resize_never_inverts() {
        let area = Area::new(100.0, 100.0, 100.0, 100.0);
        let resized = area.resized(ResizeHandle::BottomRight, pos2(0.0, 0.0), MIN_AREA_SIZE);
        assert_eq!(resized.origin(), pos2(100.0, 100.0));
        assert_eq!(resized.size(), vec2(MIN_AREA_SIZE, MIN_AREA_SIZE));

        let resized = area.resized(ResizeHandle::Left, pos2(500.0, 0.0), MIN_AREA_SIZE);
        assert_eq!(resized.width, MIN_AREA_SIZE);
        assert_eq!(resized.rect().max.x, 200.0);
        assert_eq!(resized.height, 100.0);
    }

    #[test]
    fn ratio_drives_the_other_axis() {
        let area = Area::new(0.0, 0.0, 200.0, 100.0).with_ratio(Some(2.0));
        let resized = area.resized(ResizeHandle::Right, pos2(300.0, 40.0), MIN_AREA_SIZE);
        assert_eq!(resized.size(), vec2(300.0, 150.0));
        assert_eq!(resized.center().y, area.center().y);

        let resized = area.resized(ResizeHandle::BottomRight, pos2(120.0, 300.0), MIN_AREA_SIZE);
        assert!((resized.width / resized.height - 2.0).abs() < 1e-4);
        assert_eq!(resized.origin(), pos2(0.0, 0.0));
    }

    #[test]
    fn pixel_bounds_clip_to_surface() {
        let area = Area::new(-10.0, 20.0, 50.0, 500.0);
        assert_eq!(area.pixel_bounds(100, 100), Some((0, 20, 40, 80)));
        assert_eq!(Area::new(200.0, 0.0, 10.0, 10.0).pixel_bounds(100, 100), None);
    }

    #[test]
    fn fit_never_upscales() {
        let fitted = fit_size(vec2(1000.0, 500.0), vec2(720.0, 540.0));
        assert!((fitted.x - 720.0).abs() < 1e-3 && (fitted.y - 360.0).abs() < 1e-3);
        assert_eq!(fit_size(vec2(100.0, 50.0), vec2(720.0, 540.0)), vec2(100.0, 50.0));
    }
}
