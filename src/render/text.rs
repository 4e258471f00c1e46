use std::sync::OnceLock;

use ab_glyph::{Font, FontArc, FontVec, ScaleFont, point};
use egui::{Pos2, Vec2};

use crate::style::TextStyle;
use crate::surface::Surface;

const LINE_SPACING: f32 = 1.2;
const ITALIC_SLANT: f32 = 0.2;

/// egui's bundled proportional font, parsed once
fn default_font() -> Option<&'static FontArc> {
    static FONT: OnceLock<Option<FontArc>> = OnceLock::new();
    FONT.get_or_init(load_default_font).as_ref()
}

fn load_default_font() -> Option<FontArc> {
    let definitions = egui::FontDefinitions::default();
    let family = definitions.families.get(&egui::FontFamily::Proportional)?;
    let font_name = family.first()?;
    let data = definitions.font_data.get(font_name)?;
    match FontVec::try_from_vec_and_index(data.font.to_vec(), data.index) {
        Ok(font) => Some(FontArc::from(font)),
        Err(err) => {
            log::warn!("Default font {font_name} could not be parsed: {err}");
            None
        }
    }
}

/// Width of the widest line and the total height of `text`
pub fn measure_text(text: &str, font_size: f32) -> Vec2 {
    let Some(font) = default_font() else {
        return Vec2::ZERO;
    };
    let scaled = font.as_scaled(font_size.max(1.0));
    let mut width: f32 = 0.0;
    let mut lines = 0;
    for line in text.lines() {
        lines += 1;
        let line_width: f32 = line
            .chars()
            .map(|ch| scaled.h_advance(scaled.glyph_id(ch)))
            .sum();
        width = width.max(line_width);
    }
    Vec2::new(width, lines as f32 * font_size * LINE_SPACING)
}

/// Rasterizes `text` with its top-left corner at `origin`.
///
/// Weights above 400 get a second pass shifted by one pixel.
pub fn draw_text(surface: &mut Surface, origin: Pos2, text: &str, style: &TextStyle) -> bool {
    if text.is_empty() {
        return false;
    }
    let Some(font) = default_font() else {
        log::warn!("No font available, skipping text");
        return false;
    };

    let scaled = font.as_scaled(style.font_size.max(1.0));
    let [r, g, b, a] = style.color.to_srgba_unmultiplied();
    let passes: &[f32] = if style.is_bold() { &[0.0, 1.0] } else { &[0.0] };
    let line_height = style.font_size * LINE_SPACING;

    for (row, line) in text.lines().enumerate() {
        let baseline = origin.y + row as f32 * line_height + scaled.ascent();
        for &shift in passes {
            let mut caret = point(origin.x + shift, baseline);
            for ch in line.chars() {
                let mut glyph = scaled.scaled_glyph(ch);
                glyph.position = caret;
                caret.x += scaled.h_advance(glyph.id);
                let Some(outlined) = font.outline_glyph(glyph) else {
                    continue;
                };
                let bounds = outlined.px_bounds();
                outlined.draw(|x, y, coverage| {
                    let py = bounds.min.y + y as f32;
                    let slant = if style.italic {
                        (baseline - py) * ITALIC_SLANT
                    } else {
                        0.0
                    };
                    let px = bounds.min.x + x as f32 + slant;
                    let alpha = (a as f32 * coverage).round().clamp(0.0, 255.0) as u8;
                    surface.blend_pixel(px as i32, py as i32, [r, g, b, alpha]);
                });
            }
        }
    }
    surface.mark_changed();
    true
}
