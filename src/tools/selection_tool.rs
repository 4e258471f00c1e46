use egui::{CursorIcon, Key, Pos2, Vec2};
use image::RgbaImage;
use log::{debug, info};

use crate::config::EngineConfig;
use crate::geometry::hit_testing::{self, ShapeHit};
use crate::geometry::{Area, ResizeHandle, fit_size};
use crate::input::KeyEvent;
use crate::mode::DrawingMode;
use crate::render;
use crate::shape::{DEFAULT_SHAPE_SIZE, ROTATION_STEP, RasterPayload, ShapeDefinition, ShapeType};
use crate::style::StyleParams;
use crate::tools::{DrawContext, DrawingHandler, PointerDownResult};

const TEXT_PADDING: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformState {
    /// Fresh shape following the pointer
    Placing,
    Fixed,
    /// Moving the shape; `offset` is shape origin minus grab point
    Dragging { offset: Vec2 },
    /// Dragging `handle`; the opposite side stays put
    Resizing { handle: ResizeHandle },
}

/// Places, moves, resizes and rotates the live shape; also owns the marquee selection
/// and its clipboard.
#[derive(Debug, Clone)]
pub struct SelectionTool {
    state: TransformState,
    shape: ShapeDefinition,
    params: StyleParams,
    coordinates: Option<Pos2>,
    selected_area: Option<Area>,
    hovered: Option<ShapeHit>,
    handle_margin: f32,
    min_size: f32,
    image_fit: f32,
}

impl SelectionTool {
    pub fn new(params: &StyleParams, config: &EngineConfig) -> Self {
        Self {
            state: TransformState::Fixed,
            shape: ShapeDefinition::new(ShapeType::Select, params),
            params: params.clone(),
            coordinates: None,
            selected_area: None,
            hovered: None,
            handle_margin: config.handle_margin,
            min_size: config.min_shape_size,
            image_fit: config.image_fit,
        }
    }

    pub fn state(&self) -> TransformState {
        self.state
    }

    pub fn shape(&self) -> &ShapeDefinition {
        &self.shape
    }

    /// False while the shape is being placed or dragged
    pub fn is_fixed(&self) -> bool {
        !matches!(self.state, TransformState::Placing | TransformState::Dragging { .. })
    }

    pub fn resizing_handle(&self) -> Option<ResizeHandle> {
        match self.state {
            TransformState::Resizing { handle } => Some(handle),
            _ => None,
        }
    }

    pub fn offset(&self) -> Option<Vec2> {
        match self.state {
            TransformState::Dragging { offset } => Some(offset),
            _ => None,
        }
    }

    pub fn selected_area(&self) -> Option<Area> {
        self.selected_area
    }

    pub fn hovered(&self) -> Option<ShapeHit> {
        self.hovered
    }

    pub fn coordinates(&self) -> Option<Pos2> {
        self.coordinates
    }

    pub fn current_state_name(&self) -> &'static str {
        match self.state {
            TransformState::Placing => "Placing",
            TransformState::Fixed => "Fixed",
            TransformState::Dragging { .. } => "Dragging",
            TransformState::Resizing { .. } => "Resizing",
        }
    }

    /// Fresh shape for `mode`, centered on the surface and following the pointer
    pub fn init_data(&mut self, mode: DrawingMode, ctx: &mut DrawContext<'_>) {
        let Some(shape_type) = ShapeType::from_mode(mode) else {
            debug!("{mode} has no shape");
            return;
        };
        let size = if shape_type == ShapeType::Text {
            self.text_box_size()
        } else {
            Vec2::splat(DEFAULT_SHAPE_SIZE)
        };
        let bounds = ctx.surfaces.main_size().unwrap_or(size);

        self.shape = ShapeDefinition::new(shape_type, &self.params)
            .with_size(Area::centered(bounds, size))
            .with_decorations(true, true)
            .with_style(&self.params);
        self.state = TransformState::Placing;
        self.hovered = None;
        debug!("New {} shape at {:?}", shape_type.as_str(), self.shape.size);
        self.refresh_drawing(ctx);
    }

    /// Box that holds the current text with padding on every side
    fn text_box_size(&self) -> Vec2 {
        let text = render::measure_text(&self.params.text.text, self.params.text.font_size);
        Vec2::new(
            (text.x + 2.0 * TEXT_PADDING).max(DEFAULT_SHAPE_SIZE),
            (text.y + 2.0 * TEXT_PADDING).max(self.min_size),
        )
    }

    /// Stores `area` as the selection (or the current shape bounds when `None`).
    ///
    /// An explicit area also turns the live shape into a fixed marquee over it.
    pub fn memorize_selected_area(&mut self, area: Option<Area>) -> Area {
        let area = match area {
            Some(area) => {
                self.shape = self
                    .shape
                    .clone()
                    .with_type(ShapeType::Select)
                    .with_size(area)
                    .with_rotation(0.0);
                self.state = TransformState::Fixed;
                area
            }
            None => self.shape.size,
        };
        self.selected_area = Some(area);
        area
    }

    pub fn erase_selected_area(&mut self) {
        self.selected_area = None;
    }

    pub fn refresh_drawing(&self, ctx: &mut DrawContext<'_>) {
        match ctx.surfaces.overlay.as_mut() {
            Some(overlay) => render::paint_preview(overlay, &self.shape, self.hovered),
            None => debug!("No overlay surface, preview skipped"),
        }
    }

    /// Stamps the live shape into the main surface and records it
    pub fn valid_drawed_element(&mut self, ctx: &mut DrawContext<'_>) -> bool {
        let empty = match self.shape.shape_type {
            ShapeType::Select => true,
            ShapeType::Image => self.shape.payload.is_none(),
            ShapeType::Text => self.shape.text.text.is_empty(),
            _ => false,
        };
        if empty {
            debug!("Nothing to stamp for {}", self.shape.shape_type.as_str());
            return false;
        }
        let Some(main) = ctx.surfaces.main.as_mut() else {
            debug!("No main surface, shape not stamped");
            return false;
        };
        render::paint_shape(main, &self.shape);
        ctx.save_picture(self.coordinates);
        ctx.surfaces.clear_overlay();
        info!("{} stamped at {:?}", self.shape.shape_type.as_str(), self.shape.size);
        true
    }

    /// Lifts the selected pixels into the live shape as an image
    pub fn copy_selection(&mut self, ctx: &mut DrawContext<'_>) -> bool {
        let Some(area) = self.selected_area else {
            debug!("Nothing selected to copy");
            return false;
        };
        let Some(main) = ctx.surfaces.main.as_ref() else {
            debug!("No main surface to copy from");
            return false;
        };
        let Some((x, y, width, height)) = area.pixel_bounds(main.width(), main.height()) else {
            debug!("Selection {area:?} is off the surface");
            return false;
        };
        let snapped = Area::new(x as f32, y as f32, width as f32, height as f32);
        let Some(payload) = RasterPayload::capture(main.image(), &snapped) else {
            return false;
        };

        self.shape = self
            .shape
            .clone()
            .with_type(ShapeType::Image)
            .with_payload(Some(payload))
            .with_size(snapped)
            .with_rotation(0.0)
            .with_decorations(true, true);
        self.state = TransformState::Fixed;
        self.hovered = Some(ShapeHit::Inside);
        self.refresh_drawing(ctx);
        info!("Copied {width}x{height} pixels");
        true
    }

    pub fn cut_selection(&mut self, ctx: &mut DrawContext<'_>) -> bool {
        let Some(area) = self.selected_area else {
            debug!("Nothing selected to cut");
            return false;
        };
        if !self.copy_selection(ctx) {
            return false;
        }
        if let Some(main) = ctx.surfaces.main.as_mut() {
            main.clear_area(&area);
        }
        ctx.save_picture(self.coordinates);
        true
    }

    /// Stamps the held image at its current position and keeps it for another paste
    pub fn paste_selection(&mut self, ctx: &mut DrawContext<'_>) -> bool {
        if self.shape.shape_type != ShapeType::Image || self.shape.payload.is_none() {
            debug!("Nothing to paste");
            return false;
        }
        if !self.valid_drawed_element(ctx) {
            return false;
        }
        self.refresh_drawing(ctx);
        true
    }

    pub fn delete_selection(&mut self, ctx: &mut DrawContext<'_>) -> bool {
        let Some(area) = self.selected_area else {
            debug!("Nothing selected to delete");
            return false;
        };
        let Some(main) = ctx.surfaces.main.as_mut() else {
            return false;
        };
        main.clear_area(&area);
        ctx.save_picture(self.coordinates);
        info!("Cleared selection {area:?}");
        true
    }

    /// Turns a decoded image into the live shape, scaled to fit the surface.
    ///
    /// Returns the area it was placed in.
    pub fn load_image(&mut self, image: RgbaImage, ctx: &mut DrawContext<'_>) -> Option<Area> {
        if image.width() == 0 || image.height() == 0 {
            return None;
        }
        let native = Vec2::new(image.width() as f32, image.height() as f32);
        let bounds = ctx.surfaces.main_size()?;
        let fitted = fit_size(native, bounds * self.image_fit);
        let width = fitted.x.round().max(1.0) as u32;
        let height = fitted.y.round().max(1.0) as u32;

        let pixels = if width == image.width() && height == image.height() {
            image
        } else {
            image::imageops::resize(&image, width, height, image::imageops::FilterType::Triangle)
        };
        let area = Area::centered(bounds, Vec2::new(width as f32, height as f32))
            .with_ratio(Some(native.x / native.y));

        self.shape = self
            .shape
            .clone()
            .with_type(ShapeType::Image)
            .with_payload(Some(RasterPayload::new(pixels)))
            .with_size(area)
            .with_rotation(0.0)
            .with_decorations(true, true);
        self.state = TransformState::Fixed;
        self.hovered = None;
        self.refresh_drawing(ctx);
        Some(area)
    }

    fn cursor_for_hit(hit: Option<ShapeHit>) -> CursorIcon {
        match hit {
            Some(ShapeHit::Inside) => CursorIcon::PointingHand,
            Some(ShapeHit::Resize(handle)) => handle.cursor_icon(),
            Some(ShapeHit::RotateLeft | ShapeHit::RotateRight | ShapeHit::Commit) => CursorIcon::PointingHand,
            None => CursorIcon::Default,
        }
    }
}

impl DrawingHandler for SelectionTool {
    fn name(&self) -> &'static str {
        "Selection"
    }

    fn start_action(&mut self, mode: DrawingMode, ctx: &mut DrawContext<'_>) {
        self.hovered = None;
        match mode {
            DrawingMode::Select => {
                let Some(bounds) = ctx.surfaces.main_size() else {
                    debug!("No main surface, nothing to select");
                    return;
                };
                self.memorize_selected_area(Some(Area::new(0.0, 0.0, bounds.x, bounds.y)));
                self.refresh_drawing(ctx);
            }
            DrawingMode::Image => {
                let mut shape = self.shape.clone().with_type(ShapeType::Image).with_decorations(true, true);
                if shape.payload.is_none() {
                    if let Some(bounds) = ctx.surfaces.main_size() {
                        shape = shape.with_size(Area::centered(bounds, Vec2::splat(DEFAULT_SHAPE_SIZE)));
                    }
                }
                self.shape = shape;
                self.state = TransformState::Fixed;
                self.refresh_drawing(ctx);
            }
            _ => self.init_data(mode, ctx),
        }
    }

    fn end_action(&mut self, ctx: &mut DrawContext<'_>) {
        self.state = TransformState::Fixed;
        self.hovered = None;
        ctx.surfaces.clear_overlay();
    }

    fn on_pointer_down(&mut self, _mode: DrawingMode, pos: Pos2, ctx: &mut DrawContext<'_>) -> PointerDownResult {
        self.coordinates = Some(pos);
        let mut result = PointerDownResult::default();

        match hit_testing::hit_test(&self.shape, pos, self.handle_margin) {
            Some(ShapeHit::Inside) => {
                let offset = hit_testing::drag_offset(&self.shape.size, pos);
                self.state = TransformState::Dragging { offset };
                result.pointer_style = Some(CursorIcon::PointingHand);
            }
            Some(ShapeHit::Commit) => {
                result.to_reset = self.valid_drawed_element(ctx);
                self.state = TransformState::Fixed;
                result.pointer_style = Some(CursorIcon::PointingHand);
            }
            Some(ShapeHit::RotateLeft) => {
                self.shape = self.shape.clone().rotated_by(-ROTATION_STEP);
                self.state = TransformState::Fixed;
                self.refresh_drawing(ctx);
            }
            Some(ShapeHit::RotateRight) => {
                self.shape = self.shape.clone().rotated_by(ROTATION_STEP);
                self.state = TransformState::Fixed;
                self.refresh_drawing(ctx);
            }
            Some(ShapeHit::Resize(handle)) => {
                debug!("Resizing from {}", handle.as_str());
                self.state = TransformState::Resizing { handle };
                result.pointer_style = Some(handle.cursor_icon());
            }
            None => {
                if self.state == TransformState::Placing {
                    self.state = TransformState::Fixed;
                }
            }
        }

        result
    }

    fn on_pointer_move(&mut self, _mode: DrawingMode, pos: Pos2, ctx: &mut DrawContext<'_>) -> Option<CursorIcon> {
        self.coordinates = Some(pos);

        match self.state {
            TransformState::Resizing { handle } => {
                self.shape = self.shape.clone().resized(handle, pos, self.min_size);
                if self.shape.is_marquee() {
                    self.memorize_selected_area(None);
                }
                self.refresh_drawing(ctx);
                Some(handle.cursor_icon())
            }
            TransformState::Dragging { offset } => {
                self.shape = self.shape.clone().moved_to(pos + offset);
                if self.shape.is_marquee() {
                    self.memorize_selected_area(None);
                }
                self.refresh_drawing(ctx);
                Some(CursorIcon::PointingHand)
            }
            TransformState::Placing => {
                let origin = pos - self.shape.size.size() / 2.0;
                self.shape = self.shape.clone().moved_to(origin);
                if self.shape.is_marquee() {
                    self.memorize_selected_area(None);
                }
                self.refresh_drawing(ctx);
                Some(CursorIcon::PointingHand)
            }
            TransformState::Fixed => {
                let hit = hit_testing::hit_test(&self.shape, pos, self.handle_margin);
                if hit != self.hovered {
                    self.hovered = hit;
                    self.refresh_drawing(ctx);
                }
                Some(Self::cursor_for_hit(hit))
            }
        }
    }

    fn on_pointer_up(&mut self, _mode: DrawingMode, pos: Pos2, _ctx: &mut DrawContext<'_>) {
        self.coordinates = Some(pos);
        if matches!(self.state, TransformState::Dragging { .. } | TransformState::Resizing { .. }) {
            debug!("{} finished at {:?}", self.current_state_name(), self.shape.size);
            self.state = TransformState::Fixed;
        }
    }

    fn on_pointer_leave(&mut self, _mode: DrawingMode, ctx: &mut DrawContext<'_>) {
        if self.hovered.take().is_some() {
            self.refresh_drawing(ctx);
        }
    }

    fn on_key_down(&mut self, key: &KeyEvent, ctx: &mut DrawContext<'_>) {
        if key.key == Key::Escape {
            self.erase_selected_area();
            self.shape = self.shape.clone().with_type(ShapeType::Select);
            self.state = TransformState::Fixed;
            self.hovered = Some(ShapeHit::Inside);
            self.refresh_drawing(ctx);
        } else if key.is_command_key(Key::C) {
            self.copy_selection(ctx);
        } else if key.is_command_key(Key::X) {
            self.cut_selection(ctx);
        } else if key.is_command_key(Key::V) {
            self.paste_selection(ctx);
        } else if key.key == Key::Delete {
            self.delete_selection(ctx);
        }
    }

    fn refresh_preview(&mut self, ctx: &mut DrawContext<'_>) {
        self.refresh_drawing(ctx);
    }

    fn commit(&mut self, ctx: &mut DrawContext<'_>) -> bool {
        self.valid_drawed_element(ctx)
    }

    fn apply_style(&mut self, params: &StyleParams, ctx: &mut DrawContext<'_>) {
        let text_changed =
            self.params.text.text != params.text.text || self.params.text.font_size != params.text.font_size;
        self.params = params.clone();
        self.shape = self.shape.clone().with_style(params);
        if self.shape.shape_type == ShapeType::Text && text_changed {
            let mut size = Area::centered_at(self.shape.size.center(), self.text_box_size());
            if params.lock_ratio {
                size = size.lock_current_ratio();
            }
            self.shape = self.shape.clone().with_size(size);
        }
        self.refresh_drawing(ctx);
    }
}
