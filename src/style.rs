use egui::Color32;
use serde::{Deserialize, Serialize};

/// Stroke settings shared by every mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralStyle {
    #[serde(with = "hex_color")]
    pub color: Color32,
    pub line_width: f32,
    pub opacity: f32,
}

impl Default for GeneralStyle {
    fn default() -> Self {
        Self {
            color: Color32::from_rgb(0xff, 0x00, 0x00),
            line_width: 4.0,
            opacity: 1.0,
        }
    }
}

impl GeneralStyle {
    /// Stroke color with the opacity folded into its alpha
    pub fn effective_color(&self) -> Color32 {
        with_opacity(self.color, self.opacity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapeStyle {
    pub filled: bool,
    pub radius: f32,
    pub with_text: bool,
    pub with_border: bool,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            filled: true,
            radius: 10.0,
            with_text: false,
            with_border: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BorderStyle {
    #[serde(with = "hex_color")]
    pub color: Color32,
    pub line_width: f32,
    pub opacity: f32,
    /// Dash length; 0 draws a solid border
    pub interval: f32,
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self {
            color: Color32::from_rgb(0xa0, 0xa0, 0xa0),
            line_width: 1.0,
            opacity: 1.0,
            interval: 0.0,
        }
    }
}

impl BorderStyle {
    pub fn effective_color(&self) -> Color32 {
        with_opacity(self.color, self.opacity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    pub text: String,
    #[serde(with = "hex_color")]
    pub color: Color32,
    /// Requested family; rendering always uses the bundled proportional font
    pub font: String,
    pub bold: u16,
    pub italic: bool,
    pub font_size: f32,
    pub rotation: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: Color32::from_rgb(0x40, 0x40, 0x80),
            font: "Arial".to_owned(),
            bold: 100,
            italic: false,
            font_size: 20.0,
            rotation: 0.0,
        }
    }
}

impl TextStyle {
    pub fn is_bold(&self) -> bool {
        self.bold > 400
    }
}

/// Everything a host can tune about how the next stroke or shape looks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleParams {
    pub general: GeneralStyle,
    pub shape: ShapeStyle,
    pub border: BorderStyle,
    pub text: TextStyle,
    /// Keep the width/height ratio of the live shape while resizing
    pub lock_ratio: bool,
}

impl StyleParams {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let alpha = (a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
    Color32::from_rgba_unmultiplied(r, g, b, alpha)
}

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`
pub fn parse_hex_color(text: &str) -> Option<Color32> {
    let digits = text.trim().strip_prefix('#')?;
    if !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    match digits.len() {
        3 => {
            let short = |i: usize| u8::from_str_radix(&digits[i..=i], 16).ok().map(|v| v * 17);
            Some(Color32::from_rgb(short(0)?, short(1)?, short(2)?))
        }
        6 => Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)?,
        )),
        _ => None,
    }
}

pub fn format_hex_color(color: Color32) -> String {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    if a == 255 {
        format!("#{r:02x}{g:02x}{b:02x}")
    } else {
        format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

mod hex_color {
    use egui::Color32;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(color: &Color32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_hex_color(*color))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color32, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_hex_color(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid color: {text}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse() {
        assert_eq!(parse_hex_color("#ff0000"), Some(Color32::from_rgb(255, 0, 0)));
        assert_eq!(parse_hex_color("#abc"), Some(Color32::from_rgb(0xaa, 0xbb, 0xcc)));
        assert_eq!(
            parse_hex_color("#00000080").map(|c| c.to_srgba_unmultiplied()[3]),
            Some(0x80)
        );
        assert_eq!(parse_hex_color("ff0000"), None);
        assert_eq!(parse_hex_color("#ff00"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }

    #[test]
    fn params_deserialize_partial_json() {
        let params = StyleParams::from_json(r##"{"general": {"color": "#00ff00", "lineWidth": 9}}"##)
            .unwrap();
        assert_eq!(params.general.color, Color32::from_rgb(0, 255, 0));
        assert_eq!(params.general.line_width, 9.0);
        assert_eq!(params.general.opacity, 1.0);
        assert_eq!(params.text.color, Color32::from_rgb(0x40, 0x40, 0x80));
        assert!(params.shape.filled);
    }

    #[test]
    fn opacity_scales_alpha() {
        let color = with_opacity(Color32::from_rgb(10, 20, 30), 0.5);
        assert_eq!(color.to_srgba_unmultiplied()[3], 128);
    }
}
