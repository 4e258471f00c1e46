use egui::{CursorIcon, Key, Pos2};
use log::{debug, info};

use crate::input::KeyEvent;
use crate::mode::{DrawingMode, ModeFamily};
use crate::render;
use crate::style::{GeneralStyle, StyleParams};
use crate::tools::{DrawContext, DrawingHandler, PointerDownResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineState {
    Idle,
    /// Freehand stroke in progress; segments go straight to the main surface
    Drawing { last: Pos2 },
    /// Line start placed, waiting for the end click
    AwaitingSecondPoint { start: Pos2 },
    /// Arc start placed, waiting for the end click
    PreviewArc { start: Pos2 },
}

/// Handles freehand drawing, erasing, straight lines and arcs
#[derive(Debug, Clone)]
pub struct LineTool {
    state: LineState,
    mode: DrawingMode,
    coordinates: Option<Pos2>,
    general: GeneralStyle,
}

impl LineTool {
    pub fn new(params: &StyleParams) -> Self {
        Self {
            state: LineState::Idle,
            mode: DrawingMode::Draw,
            coordinates: None,
            general: params.general.clone(),
        }
    }

    pub fn state(&self) -> LineState {
        self.state
    }

    pub fn mode(&self) -> DrawingMode {
        self.mode
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, LineState::Drawing { .. })
    }

    /// First point of a pending line or arc
    pub fn start(&self) -> Option<Pos2> {
        match self.state {
            LineState::AwaitingSecondPoint { start } | LineState::PreviewArc { start } => Some(start),
            _ => None,
        }
    }

    pub fn coordinates(&self) -> Option<Pos2> {
        self.coordinates
    }

    pub fn current_state_name(&self) -> &'static str {
        match self.state {
            LineState::Idle => "Idle",
            LineState::Drawing { .. } => "Drawing",
            LineState::AwaitingSecondPoint { .. } => "AwaitingSecondPoint",
            LineState::PreviewArc { .. } => "PreviewArc",
        }
    }

    fn cursor_for(mode: DrawingMode) -> CursorIcon {
        match mode {
            DrawingMode::Erase => CursorIcon::None,
            DrawingMode::Line | DrawingMode::Arc => CursorIcon::Crosshair,
            _ => CursorIcon::Default,
        }
    }

    fn follow_cursor(&self, pos: Pos2, ctx: &mut DrawContext<'_>) {
        if let Some(cursor) = ctx.surfaces.cursor.as_mut() {
            render::paint_cursor(cursor, self.mode, pos, &self.general);
        }
    }

    fn paint_preview(&self, ctx: &mut DrawContext<'_>) {
        let (Some(start), Some(end)) = (self.start(), self.coordinates) else {
            return;
        };
        let Some(overlay) = ctx.surfaces.overlay.as_mut() else {
            debug!("No overlay surface, skipping line preview");
            return;
        };
        overlay.clear();
        render::paint_stroke(overlay, self.mode, start, end, &self.general);
    }

    /// Paints one freehand segment into the main surface
    fn paint_segment(&self, from: Pos2, to: Pos2, ctx: &mut DrawContext<'_>) {
        let Some(main) = ctx.surfaces.main.as_mut() else {
            debug!("No main surface, stroke segment dropped");
            return;
        };
        if self.mode == DrawingMode::Erase {
            main.erase_segment(from, to, self.general.line_width.max(1.0));
        } else {
            main.stroke_segment(from, to, self.general.line_width.max(1.0), self.general.effective_color());
        }
    }

    /// Drops the pending gesture; a half-drawn stroke is rolled back
    fn cancel(&mut self, ctx: &mut DrawContext<'_>) {
        match self.state {
            LineState::Drawing { .. } => {
                if ctx.rollback_main() {
                    debug!("Freehand stroke abandoned and rolled back");
                }
            }
            LineState::AwaitingSecondPoint { .. } | LineState::PreviewArc { .. } => {
                debug!("Pending {} start cleared", self.mode);
            }
            LineState::Idle => {}
        }
        self.state = LineState::Idle;
        ctx.surfaces.clear_overlay();
    }

    fn finish_stroke(&mut self, pos: Pos2, ctx: &mut DrawContext<'_>) -> bool {
        if !self.is_drawing() {
            return false;
        }
        self.state = LineState::Idle;
        let saved = ctx.save_picture(Some(pos));
        if saved {
            info!("{} stroke committed", self.mode);
        }
        saved
    }
}

impl DrawingHandler for LineTool {
    fn name(&self) -> &'static str {
        "Line"
    }

    fn start_action(&mut self, mode: DrawingMode, ctx: &mut DrawContext<'_>) {
        self.mode = mode;
        self.state = LineState::Idle;
        ctx.surfaces.clear_overlay();
        ctx.surfaces.clear_cursor();
    }

    fn end_action(&mut self, ctx: &mut DrawContext<'_>) {
        self.cancel(ctx);
        ctx.surfaces.clear_cursor();
    }

    fn on_pointer_down(&mut self, mode: DrawingMode, pos: Pos2, ctx: &mut DrawContext<'_>) -> PointerDownResult {
        self.mode = mode;
        self.coordinates = Some(pos);
        let mut result = PointerDownResult {
            pointer_style: Some(Self::cursor_for(mode)),
            ..Default::default()
        };

        match mode.family() {
            ModeFamily::Freehand => {
                self.state = LineState::Drawing { last: pos };
                self.paint_segment(pos, pos, ctx);
            }
            ModeFamily::Line => match self.start() {
                Some(start) => {
                    match ctx.surfaces.main.as_mut() {
                        Some(main) => {
                            render::paint_stroke(main, mode, start, pos, &self.general);
                            ctx.save_picture(Some(pos));
                            info!("{mode} committed from {start:?} to {pos:?}");
                        }
                        None => debug!("No main surface, {mode} dropped"),
                    }
                    self.state = LineState::Idle;
                    ctx.surfaces.clear_overlay();
                }
                None => {
                    self.state = if mode == DrawingMode::Arc {
                        LineState::PreviewArc { start: pos }
                    } else {
                        LineState::AwaitingSecondPoint { start: pos }
                    };
                    result.to_continue = true;
                }
            },
            _ => debug!("Line tool ignores {mode}"),
        }

        result
    }

    fn on_pointer_move(&mut self, mode: DrawingMode, pos: Pos2, ctx: &mut DrawContext<'_>) -> Option<CursorIcon> {
        self.mode = mode;
        self.coordinates = Some(pos);

        if let LineState::Drawing { last } = self.state {
            self.paint_segment(last, pos, ctx);
            self.state = LineState::Drawing { last: pos };
        }
        self.follow_cursor(pos, ctx);
        self.paint_preview(ctx);

        Some(Self::cursor_for(mode))
    }

    fn on_pointer_up(&mut self, _mode: DrawingMode, pos: Pos2, ctx: &mut DrawContext<'_>) {
        self.coordinates = Some(pos);
        self.finish_stroke(pos, ctx);
    }

    fn on_pointer_leave(&mut self, _mode: DrawingMode, ctx: &mut DrawContext<'_>) {
        self.cancel(ctx);
        ctx.surfaces.clear_cursor();
        self.coordinates = None;
    }

    fn on_key_down(&mut self, key: &KeyEvent, ctx: &mut DrawContext<'_>) {
        if key.key == Key::Escape {
            self.cancel(ctx);
            self.coordinates = None;
        }
    }

    fn refresh_preview(&mut self, ctx: &mut DrawContext<'_>) {
        self.paint_preview(ctx);
    }

    fn commit(&mut self, ctx: &mut DrawContext<'_>) -> bool {
        let pos = self.coordinates.unwrap_or(Pos2::ZERO);
        self.finish_stroke(pos, ctx)
    }

    fn apply_style(&mut self, params: &StyleParams, ctx: &mut DrawContext<'_>) {
        self.general = params.general.clone();
        self.paint_preview(ctx);
    }
}
