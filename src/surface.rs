use std::fmt;

use egui::{Color32, Pos2, Rect, Vec2};
use image::{Rgba, RgbaImage};

use crate::geometry::{Area, SurfaceFrame};

/// A raster the engine paints into.
///
/// Pixels are straight (unmultiplied) RGBA. The version bumps on every change so hosts
/// can tell when to re-upload a texture.
#[derive(Clone, PartialEq)]
pub struct Surface {
    image: RgbaImage,
    version: u64,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .field("version", &self.version)
            .finish()
    }
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::new(width.max(1), height.max(1)))
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image, version: 0 }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width() as f32, self.height() as f32)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn mark_changed(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        (x < self.width() && y < self.height()).then(|| self.image.get_pixel(x, y).0)
    }

    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|pixel| pixel.0[3] == 0)
    }

    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
        self.mark_changed();
    }

    /// Replaces every pixel with `snapshot`
    pub fn restore(&mut self, snapshot: &RgbaImage) {
        self.image.clone_from(snapshot);
        self.mark_changed();
    }

    /// Source-over blend of a straight-alpha color
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return;
        }
        let [r, g, b, a] = color;
        if a == 0 {
            return;
        }
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        if a == 255 {
            *pixel = Rgba(color);
            return;
        }
        let dst = pixel.0;
        let src_a = a as f32 / 255.0;
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        let blend = |src: u8, dst: u8| {
            let src_f = src as f32 / 255.0;
            let dst_f = dst as f32 / 255.0;
            ((src_f * src_a + dst_f * dst_a * (1.0 - src_a)) / out_a * 255.0)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        *pixel = Rgba([
            blend(r, dst[0]),
            blend(g, dst[1]),
            blend(b, dst[2]),
            (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        ]);
    }

    /// Pixel columns and rows `[x0, x1) × [y0, y1)` touched by `bounds`
    fn pixel_span(&self, bounds: Rect) -> Option<(u32, u32, u32, u32)> {
        if !bounds.is_finite() || !bounds.is_positive() {
            return None;
        }
        let x0 = bounds.min.x.floor().max(0.0);
        let y0 = bounds.min.y.floor().max(0.0);
        let x1 = bounds.max.x.ceil().min(self.width() as f32);
        let y1 = bounds.max.y.ceil().min(self.height() as f32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    /// Blends `color` into every pixel of `bounds` whose center satisfies `inside`.
    ///
    /// Each pixel is written at most once, so translucent fills do not darken at overlaps.
    pub fn fill_where(&mut self, bounds: Rect, color: Color32, inside: impl Fn(Pos2) -> bool) {
        let Some((x0, y0, x1, y1)) = self.pixel_span(bounds) else {
            return;
        };
        let rgba = color.to_srgba_unmultiplied();
        for y in y0..y1 {
            for x in x0..x1 {
                if inside(Pos2::new(x as f32 + 0.5, y as f32 + 0.5)) {
                    self.blend_pixel(x as i32, y as i32, rgba);
                }
            }
        }
        self.mark_changed();
    }

    /// Clears to transparent every pixel of `bounds` whose center satisfies `inside`
    pub fn erase_where(&mut self, bounds: Rect, inside: impl Fn(Pos2) -> bool) {
        let Some((x0, y0, x1, y1)) = self.pixel_span(bounds) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                if inside(Pos2::new(x as f32 + 0.5, y as f32 + 0.5)) {
                    self.image.put_pixel(x, y, Rgba([0, 0, 0, 0]));
                }
            }
        }
        self.mark_changed();
    }

    pub fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32) {
        let radius = radius.max(0.5);
        let bounds = Rect::from_center_size(center, Vec2::splat(radius * 2.0));
        self.fill_where(bounds, color, |p| p.distance_sq(center) <= radius * radius);
    }

    pub fn stroke_circle(&mut self, center: Pos2, radius: f32, width: f32, color: Color32) {
        let half = (width / 2.0).max(0.5);
        let bounds = Rect::from_center_size(center, Vec2::splat((radius + half) * 2.0));
        self.fill_where(bounds, color, |p| (p.distance(center) - radius).abs() <= half);
    }

    /// Capsule-shaped stroke through `points` with round caps and joins
    pub fn stroke_polyline(&mut self, points: &[Pos2], width: f32, color: Color32) {
        let radius = (width / 2.0).max(0.5);
        let Some(bounds) = polyline_bounds(points, radius) else {
            return;
        };
        self.fill_where(bounds, color, |p| near_polyline(p, points, radius));
    }

    pub fn stroke_segment(&mut self, start: Pos2, end: Pos2, width: f32, color: Color32) {
        self.stroke_polyline(&[start, end], width, color);
    }

    pub fn erase_segment(&mut self, start: Pos2, end: Pos2, width: f32) {
        let radius = (width / 2.0).max(0.5);
        let points = [start, end];
        let Some(bounds) = polyline_bounds(&points, radius) else {
            return;
        };
        self.erase_where(bounds, |p| near_polyline(p, &points, radius));
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.fill_where(rect, color, |p| rect.contains(p));
    }

    /// Outline centered on the edges of `rect`
    pub fn stroke_rect(&mut self, rect: Rect, width: f32, color: Color32) {
        let half = (width / 2.0).max(0.5);
        let outer = rect.expand(half);
        let inner = rect.shrink(half);
        self.fill_where(outer, color, |p| outer.contains(p) && !inner.contains(p));
    }

    /// Dashed outline; `dash` is the length of both dashes and gaps
    pub fn stroke_dashed_rect(&mut self, rect: Rect, width: f32, dash: f32, color: Color32) {
        let dash = dash.max(1.0);
        let half = (width / 2.0).max(0.5);
        let outer = rect.expand(half);
        let inner = rect.shrink(half);
        self.fill_where(outer, color, |p| {
            if !outer.contains(p) || inner.contains(p) {
                return false;
            }
            // Walk the perimeter so dashes continue around corners
            let along = if (p.y - rect.min.y).abs() <= half || (p.y - rect.max.y).abs() <= half {
                p.x - rect.min.x
            } else {
                p.y - rect.min.y
            };
            (along / dash).floor() as i64 % 2 == 0
        });
    }

    pub fn clear_area(&mut self, area: &Area) {
        let Some((x, y, width, height)) = area.pixel_bounds(self.width(), self.height()) else {
            return;
        };
        for py in y..y + height {
            for px in x..x + width {
                self.image.put_pixel(px, py, Rgba([0, 0, 0, 0]));
            }
        }
        self.mark_changed();
    }

    /// Owned copy of the pixels under `area`, clipped to the surface
    pub fn copy_area(&self, area: &Area) -> Option<RgbaImage> {
        let (x, y, width, height) = area.pixel_bounds(self.width(), self.height())?;
        Some(image::imageops::crop_imm(&self.image, x, y, width, height).to_image())
    }

    /// Draws `source` stretched over `dest`, rotated by `rotation` around the center of `dest`.
    ///
    /// Destination pixels are mapped back into the source (nearest sample). An unrotated
    /// draw onto integer coordinates at native size copies pixels 1:1.
    pub fn draw_image(&mut self, source: &RgbaImage, dest: &Area, rotation: f32, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        if source.width() == 0 || source.height() == 0 || dest.width <= 0.0 || dest.height <= 0.0 {
            return;
        }
        if opacity <= 0.0 {
            return;
        }

        let center = dest.center();
        let half = dest.size() / 2.0;
        let (sin, cos) = rotation.sin_cos();

        let mut bounds = Rect::NOTHING;
        for corner in [
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, half.y),
        ] {
            bounds.extend_with(center + rotate(corner, sin, cos));
        }
        let Some((x0, y0, x1, y1)) = self.pixel_span(bounds) else {
            return;
        };

        let scale_x = source.width() as f32 / dest.width;
        let scale_y = source.height() as f32 / dest.height;
        for y in y0..y1 {
            for x in x0..x1 {
                let offset = Pos2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
                let local = rotate(offset, -sin, cos) + half;
                if local.x < 0.0 || local.y < 0.0 || local.x >= dest.width || local.y >= dest.height {
                    continue;
                }
                let sx = ((local.x * scale_x) as u32).min(source.width() - 1);
                let sy = ((local.y * scale_y) as u32).min(source.height() - 1);
                let [r, g, b, a] = source.get_pixel(sx, sy).0;
                let alpha = if opacity >= 1.0 {
                    a
                } else {
                    (a as f32 * opacity).round() as u8
                };
                self.blend_pixel(x as i32, y as i32, [r, g, b, alpha]);
            }
        }
        self.mark_changed();
    }
}

fn rotate(v: Vec2, sin: f32, cos: f32) -> Vec2 {
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

fn polyline_bounds(points: &[Pos2], radius: f32) -> Option<Rect> {
    if points.is_empty() {
        return None;
    }
    let mut bounds = Rect::NOTHING;
    for point in points {
        bounds.extend_with(*point);
    }
    Some(bounds.expand(radius))
}

fn near_polyline(p: Pos2, points: &[Pos2], radius: f32) -> bool {
    let radius_sq = radius * radius;
    match points {
        [single] => p.distance_sq(*single) <= radius_sq,
        _ => points
            .windows(2)
            .any(|pair| distance_sq_to_segment(p, pair[0], pair[1]) <= radius_sq),
    }
}

pub fn distance_sq_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_sq();
    if length_sq <= f32::EPSILON {
        return p.distance_sq(a);
    }
    let t = ((p - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    p.distance_sq(a + ab * t)
}

/// The three stacked rasters a drawing session paints into.
///
/// Owned by the host and lent to the engine for each call. Any of them may be absent
/// (not yet created, or torn down); the engine then skips the work that needed it.
#[derive(Debug, Clone, Default)]
pub struct Surfaces {
    /// Committed drawing
    pub main: Option<Surface>,
    /// Live previews and shape decorations
    pub overlay: Option<Surface>,
    /// Pointer highlight
    pub cursor: Option<Surface>,
    pub frame: Option<SurfaceFrame>,
}

impl Surfaces {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            main: Some(Surface::new(width, height)),
            overlay: Some(Surface::new(width, height)),
            cursor: Some(Surface::new(width, height)),
            frame: None,
        }
    }

    pub fn detached() -> Self {
        Self::default()
    }

    pub fn main_size(&self) -> Option<Vec2> {
        self.main.as_ref().map(Surface::size)
    }

    pub fn clear_overlay(&mut self) {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.clear();
        }
    }

    pub fn clear_cursor(&mut self) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn translucent_blend_mixes_over_opaque() {
        let mut surface = Surface::new(1, 1);
        surface.blend_pixel(0, 0, [0, 0, 255, 255]);
        surface.blend_pixel(0, 0, [255, 0, 0, 128]);
        let [r, _, b, a] = surface.pixel(0, 0).unwrap();
        assert_eq!(a, 255);
        assert!(r > 120 && b > 120);
    }

    #[test]
    fn unrotated_native_draw_is_a_copy() {
        let mut source = RgbaImage::new(3, 2);
        for (i, pixel) in source.pixels_mut().enumerate() {
            *pixel = Rgba([i as u8 * 40, 10, 20, 255]);
        }
        let mut surface = Surface::new(10, 10);
        surface.draw_image(&source, &Area::new(4.0, 5.0, 3.0, 2.0), 0.0, 1.0);
        assert_eq!(surface.copy_area(&Area::new(4.0, 5.0, 3.0, 2.0)).unwrap(), source);
        assert_eq!(surface.pixel(3, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn erase_segment_clears_pixels() {
        let mut surface = Surface::new(20, 20);
        surface.fill_rect(Rect::from_min_max(pos2(0.0, 0.0), pos2(20.0, 20.0)), Color32::RED);
        surface.erase_segment(pos2(2.0, 10.0), pos2(18.0, 10.0), 4.0);
        assert_eq!(surface.pixel(10, 10), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(10, 2).map(|p| p[3]), Some(255));
    }
}
