use std::f32::consts::{PI, TAU};
use std::fmt;
use std::sync::Arc;

use egui::{Pos2, Vec2};
use image::RgbaImage;

use crate::geometry::{Area, ResizeHandle};
use crate::mode::DrawingMode;
use crate::style::{BorderStyle, GeneralStyle, ShapeStyle, StyleParams, TextStyle};

/// Size of a freshly placed shape
pub const DEFAULT_SHAPE_SIZE: f32 = 100.0;

/// One click on a rotate button turns the shape by this much
pub const ROTATION_STEP: f32 = PI / 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    Square,
    Circle,
    RadiusTop,
    RadiusBottom,
    RadiusHalf,
    /// Marquee over existing pixels; never stamped
    Select,
    Image,
    Text,
}

impl ShapeType {
    pub fn from_mode(mode: DrawingMode) -> Option<Self> {
        match mode {
            DrawingMode::Square => Some(Self::Square),
            DrawingMode::Circle => Some(Self::Circle),
            DrawingMode::RadiusTop => Some(Self::RadiusTop),
            DrawingMode::RadiusBottom => Some(Self::RadiusBottom),
            DrawingMode::RadiusHalf => Some(Self::RadiusHalf),
            DrawingMode::Select => Some(Self::Select),
            DrawingMode::Image => Some(Self::Image),
            DrawingMode::Text => Some(Self::Text),
            DrawingMode::Draw | DrawingMode::Erase | DrawingMode::Line | DrawingMode::Arc => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Circle => "circle",
            Self::RadiusTop => "radiusTop",
            Self::RadiusBottom => "radiusBottom",
            Self::RadiusHalf => "radiusHalf",
            Self::Select => "select",
            Self::Image => "image",
            Self::Text => "text",
        }
    }
}

/// Owned pixels carried by an image shape.
///
/// Captured by copy, so later edits of the main surface never show through.
#[derive(Clone, PartialEq)]
pub struct RasterPayload(Arc<RgbaImage>);

impl RasterPayload {
    pub fn new(image: RgbaImage) -> Self {
        Self(Arc::new(image))
    }

    /// Copies the pixels under `area` out of `source`
    pub fn capture(source: &RgbaImage, area: &Area) -> Option<Self> {
        let (x, y, width, height) = area.pixel_bounds(source.width(), source.height())?;
        let pixels = image::imageops::crop_imm(source, x, y, width, height).to_image();
        Some(Self::new(pixels))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.0
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width() as f32, self.height() as f32)
    }
}

impl fmt::Debug for RasterPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RasterPayload({}x{})", self.width(), self.height())
    }
}

/// The one live shape the selection handler manipulates.
///
/// Every update consumes the value and returns the transformed copy.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDefinition {
    pub shape_type: ShapeType,
    /// Radians in (-π, π]
    pub rotation: f32,
    pub size: Area,
    pub payload: Option<RasterPayload>,
    pub general: GeneralStyle,
    pub shape: ShapeStyle,
    pub border: BorderStyle,
    pub text: TextStyle,
    pub with_middle_buttons: bool,
    pub with_corner_button: bool,
}

impl ShapeDefinition {
    pub fn new(shape_type: ShapeType, params: &StyleParams) -> Self {
        Self {
            shape_type,
            rotation: 0.0,
            size: Area::new(0.0, 0.0, DEFAULT_SHAPE_SIZE, DEFAULT_SHAPE_SIZE),
            payload: None,
            general: params.general.clone(),
            shape: params.shape.clone(),
            border: params.border.clone(),
            text: params.text.clone(),
            with_middle_buttons: true,
            with_corner_button: true,
        }
        .with_type(shape_type)
    }

    /// Switches the type; a marquee never shows rotate or commit buttons
    pub fn with_type(mut self, shape_type: ShapeType) -> Self {
        self.shape_type = shape_type;
        if shape_type == ShapeType::Select {
            self.with_middle_buttons = false;
            self.with_corner_button = false;
        }
        self
    }

    pub fn with_decorations(mut self, middle_buttons: bool, corner_button: bool) -> Self {
        self.with_middle_buttons = middle_buttons;
        self.with_corner_button = corner_button;
        self
    }

    pub fn with_size(mut self, size: Area) -> Self {
        self.size = size;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = wrap_rotation(rotation);
        self
    }

    /// Rotates by `delta`; results on the button grid snap to an exact multiple of the step.
    pub fn rotated_by(self, delta: f32) -> Self {
        let target = self.rotation + delta;
        let steps = target / ROTATION_STEP;
        let nearest = steps.round();
        if (steps - nearest).abs() < 1e-3 {
            let turn = (2.0 * PI / ROTATION_STEP).round() as i32;
            let mut k = (nearest as i32).rem_euclid(turn);
            if k > turn / 2 {
                k -= turn;
            }
            return self.with_rotation(k as f32 * ROTATION_STEP);
        }
        self.with_rotation(target)
    }

    pub fn moved_to(mut self, origin: Pos2) -> Self {
        self.size = self.size.moved_to(origin);
        self
    }

    pub fn resized(mut self, handle: ResizeHandle, pointer: Pos2, min_size: f32) -> Self {
        self.size = self.size.resized(handle, pointer, min_size);
        self
    }

    pub fn with_payload(mut self, payload: Option<RasterPayload>) -> Self {
        self.payload = payload;
        self
    }

    /// Applies new style params; `lock_ratio` captures the current proportions.
    ///
    /// An image keeps its native ratio when the lock is released.
    pub fn with_style(mut self, params: &StyleParams) -> Self {
        self.general = params.general.clone();
        self.shape = params.shape.clone();
        self.border = params.border.clone();
        self.text = params.text.clone();
        if params.lock_ratio {
            if self.size.ratio.is_none() {
                self.size = self.size.lock_current_ratio();
            }
        } else if self.payload.is_none() {
            self.size.ratio = None;
        }
        self
    }

    pub fn area(&self) -> Area {
        self.size
    }

    pub fn is_marquee(&self) -> bool {
        self.shape_type == ShapeType::Select
    }
}

/// Wraps an angle into (-π, π].
///
/// Values already in range come back bit-identical, so a step and its inverse cancel exactly.
pub fn wrap_rotation(rotation: f32) -> f32 {
    if !rotation.is_finite() {
        return 0.0;
    }
    if rotation > -PI && rotation <= PI {
        return rotation;
    }
    let wrapped = (rotation + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}
