use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Every drawing mode the engine understands.
///
/// The string names are the ones exchanged with hosts and stored in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DrawingMode {
    Draw,
    Erase,
    Line,
    Arc,
    Square,
    Circle,
    RadiusTop,
    RadiusBottom,
    RadiusHalf,
    #[serde(rename = "select-auto")]
    Select,
    Image,
    Text,
}

/// Groups of modes that share one pointer handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeFamily {
    Freehand,
    Line,
    Shape,
    Select,
    Text,
}

const FREEHAND_MODES: &[DrawingMode] = &[DrawingMode::Draw, DrawingMode::Erase];
const LINE_MODES: &[DrawingMode] = &[DrawingMode::Line, DrawingMode::Arc];
const SHAPE_MODES: &[DrawingMode] = &[
    DrawingMode::Square,
    DrawingMode::Circle,
    DrawingMode::RadiusTop,
    DrawingMode::RadiusBottom,
    DrawingMode::RadiusHalf,
];
const SELECT_MODES: &[DrawingMode] = &[DrawingMode::Select, DrawingMode::Image];
const TEXT_MODES: &[DrawingMode] = &[DrawingMode::Text];

const ALL_MODES: &[DrawingMode] = &[
    DrawingMode::Draw,
    DrawingMode::Erase,
    DrawingMode::Line,
    DrawingMode::Arc,
    DrawingMode::Square,
    DrawingMode::Circle,
    DrawingMode::RadiusTop,
    DrawingMode::RadiusBottom,
    DrawingMode::RadiusHalf,
    DrawingMode::Select,
    DrawingMode::Image,
    DrawingMode::Text,
];

impl DrawingMode {
    pub fn all() -> &'static [DrawingMode] {
        ALL_MODES
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Draw => "draw",
            Self::Erase => "erase",
            Self::Line => "line",
            Self::Arc => "arc",
            Self::Square => "square",
            Self::Circle => "circle",
            Self::RadiusTop => "radiusTop",
            Self::RadiusBottom => "radiusBottom",
            Self::RadiusHalf => "radiusHalf",
            Self::Select => "select-auto",
            Self::Image => "image",
            Self::Text => "text",
        }
    }

    /// Human readable label for mode pickers
    pub fn label(self) -> &'static str {
        match self {
            Self::Draw => "Draw",
            Self::Erase => "Erase",
            Self::Line => "Line",
            Self::Arc => "Arc",
            Self::Square => "Square",
            Self::Circle => "Circle",
            Self::RadiusTop => "Rounded top",
            Self::RadiusBottom => "Rounded bottom",
            Self::RadiusHalf => "Pill",
            Self::Select => "Select",
            Self::Image => "Image",
            Self::Text => "Text",
        }
    }

    pub fn family(self) -> ModeFamily {
        if FREEHAND_MODES.contains(&self) {
            ModeFamily::Freehand
        } else if LINE_MODES.contains(&self) {
            ModeFamily::Line
        } else if SHAPE_MODES.contains(&self) {
            ModeFamily::Shape
        } else if SELECT_MODES.contains(&self) {
            ModeFamily::Select
        } else {
            debug_assert!(TEXT_MODES.contains(&self));
            ModeFamily::Text
        }
    }

    /// Modes handled by the freehand/line handler
    pub fn uses_line_tool(self) -> bool {
        matches!(self.family(), ModeFamily::Freehand | ModeFamily::Line)
    }
}

impl fmt::Display for DrawingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DrawingMode {
    type Err = EngineError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ALL_MODES
            .iter()
            .copied()
            .find(|mode| mode.name() == name)
            .ok_or_else(|| EngineError::UnknownMode(name.to_owned()))
    }
}

pub fn is_freehand(mode: DrawingMode) -> bool {
    FREEHAND_MODES.contains(&mode)
}

pub fn is_line_family(mode: DrawingMode) -> bool {
    LINE_MODES.contains(&mode)
}

pub fn is_shape_family(mode: DrawingMode) -> bool {
    SHAPE_MODES.contains(&mode)
}

pub fn is_select_family(mode: DrawingMode) -> bool {
    SELECT_MODES.contains(&mode)
}

pub fn is_text(mode: DrawingMode) -> bool {
    TEXT_MODES.contains(&mode)
}

/// True when `name` is one of the exchanged mode names
pub fn is_known_mode(name: &str) -> bool {
    ALL_MODES.iter().any(|mode| mode.name() == name)
}
