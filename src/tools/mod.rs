use egui::{CursorIcon, Pos2};

use crate::config::EngineConfig;
use crate::event::{EngineEvent, EventBus};
use crate::history::History;
use crate::input::KeyEvent;
use crate::mode::DrawingMode;
use crate::style::StyleParams;
use crate::surface::Surfaces;

mod line_tool;
pub use line_tool::{LineState, LineTool};

mod selection_tool;
pub use selection_tool::{SelectionTool, TransformState};

/// Everything a handler may touch while processing one event
pub struct DrawContext<'a> {
    pub surfaces: &'a mut Surfaces,
    pub history: &'a mut History,
    pub events: &'a EventBus,
    pub config: &'a EngineConfig,
}

impl DrawContext<'_> {
    /// Pushes a snapshot of the main surface; false when there is no main surface
    pub fn save_picture(&mut self, coordinates: Option<Pos2>) -> bool {
        let Some(main) = self.surfaces.main.as_ref() else {
            log::debug!("No main surface, nothing to snapshot");
            return false;
        };
        self.history.push_image(main.image(), coordinates);
        self.events.emit(EngineEvent::HistoryChanged {
            len: self.history.len(),
        });
        true
    }

    /// Puts the main surface back to the latest snapshot
    pub fn rollback_main(&mut self) -> bool {
        match (self.surfaces.main.as_mut(), self.history.latest()) {
            (Some(main), Some(snapshot)) => {
                main.restore(snapshot.image());
                true
            }
            _ => false,
        }
    }
}

/// What the host should do after a pointer press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerDownResult {
    /// A multi-click gesture is in progress
    pub to_continue: bool,
    /// The live shape was committed; the host should return to a neutral mode
    pub to_reset: bool,
    pub pointer_style: Option<CursorIcon>,
}

/// Capabilities every mode-family handler provides
pub trait DrawingHandler {
    fn name(&self) -> &'static str;

    /// Called when one of the handler's modes becomes active
    fn start_action(&mut self, mode: DrawingMode, ctx: &mut DrawContext<'_>);

    /// Called when the handler stops being the active one
    fn end_action(&mut self, ctx: &mut DrawContext<'_>);

    fn on_pointer_down(&mut self, mode: DrawingMode, pos: Pos2, ctx: &mut DrawContext<'_>) -> PointerDownResult;

    /// Returns the cursor to show, if the handler has an opinion
    fn on_pointer_move(&mut self, mode: DrawingMode, pos: Pos2, ctx: &mut DrawContext<'_>) -> Option<CursorIcon>;

    fn on_pointer_up(&mut self, mode: DrawingMode, pos: Pos2, ctx: &mut DrawContext<'_>);

    fn on_pointer_leave(&mut self, mode: DrawingMode, ctx: &mut DrawContext<'_>);

    fn on_key_down(&mut self, key: &KeyEvent, ctx: &mut DrawContext<'_>);

    /// Repaints whatever preview the handler owns
    fn refresh_preview(&mut self, ctx: &mut DrawContext<'_>);

    /// Stamps pending work into the main surface; false when there was nothing to stamp
    fn commit(&mut self, ctx: &mut DrawContext<'_>) -> bool;

    fn apply_style(&mut self, params: &StyleParams, ctx: &mut DrawContext<'_>);
}

/// All handlers, dispatched by mode family
#[derive(Debug, Clone)]
pub enum ToolType {
    Line(LineTool),
    Selection(SelectionTool),
}

impl DrawingHandler for ToolType {
    fn name(&self) -> &'static str {
        match self {
            Self::Line(tool) => tool.name(),
            Self::Selection(tool) => tool.name(),
        }
    }

    fn start_action(&mut self, mode: DrawingMode, ctx: &mut DrawContext<'_>) {
        match self {
            Self::Line(tool) => tool.start_action(mode, ctx),
            Self::Selection(tool) => tool.start_action(mode, ctx),
        }
    }

    fn end_action(&mut self, ctx: &mut DrawContext<'_>) {
        match self {
            Self::Line(tool) => tool.end_action(ctx),
            Self::Selection(tool) => tool.end_action(ctx),
        }
    }

    fn on_pointer_down(&mut self, mode: DrawingMode, pos: Pos2, ctx: &mut DrawContext<'_>) -> PointerDownResult {
        match self {
            Self::Line(tool) => tool.on_pointer_down(mode, pos, ctx),
            Self::Selection(tool) => tool.on_pointer_down(mode, pos, ctx),
        }
    }

    fn on_pointer_move(&mut self, mode: DrawingMode, pos: Pos2, ctx: &mut DrawContext<'_>) -> Option<CursorIcon> {
        match self {
            Self::Line(tool) => tool.on_pointer_move(mode, pos, ctx),
            Self::Selection(tool) => tool.on_pointer_move(mode, pos, ctx),
        }
    }

    fn on_pointer_up(&mut self, mode: DrawingMode, pos: Pos2, ctx: &mut DrawContext<'_>) {
        match self {
            Self::Line(tool) => tool.on_pointer_up(mode, pos, ctx),
            Self::Selection(tool) => tool.on_pointer_up(mode, pos, ctx),
        }
    }

    fn on_pointer_leave(&mut self, mode: DrawingMode, ctx: &mut DrawContext<'_>) {
        match self {
            Self::Line(tool) => tool.on_pointer_leave(mode, ctx),
            Self::Selection(tool) => tool.on_pointer_leave(mode, ctx),
        }
    }

    fn on_key_down(&mut self, key: &KeyEvent, ctx: &mut DrawContext<'_>) {
        match self {
            Self::Line(tool) => tool.on_key_down(key, ctx),
            Self::Selection(tool) => tool.on_key_down(key, ctx),
        }
    }

    fn refresh_preview(&mut self, ctx: &mut DrawContext<'_>) {
        match self {
            Self::Line(tool) => tool.refresh_preview(ctx),
            Self::Selection(tool) => tool.refresh_preview(ctx),
        }
    }

    fn commit(&mut self, ctx: &mut DrawContext<'_>) -> bool {
        match self {
            Self::Line(tool) => tool.commit(ctx),
            Self::Selection(tool) => tool.commit(ctx),
        }
    }

    fn apply_style(&mut self, params: &StyleParams, ctx: &mut DrawContext<'_>) {
        match self {
            Self::Line(tool) => tool.apply_style(params, ctx),
            Self::Selection(tool) => tool.apply_style(params, ctx),
        }
    }
}

impl ToolType {
    /// The handler responsible for `mode`
    pub fn for_mode(mode: DrawingMode, params: &StyleParams, config: &EngineConfig) -> Self {
        if mode.uses_line_tool() {
            Self::Line(LineTool::new(params))
        } else {
            Self::Selection(SelectionTool::new(params, config))
        }
    }

    pub fn handles(&self, mode: DrawingMode) -> bool {
        match self {
            Self::Line(_) => mode.uses_line_tool(),
            Self::Selection(_) => !mode.uses_line_tool(),
        }
    }

    pub fn as_line_tool(&self) -> Option<&LineTool> {
        match self {
            Self::Line(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn as_selection_tool(&self) -> Option<&SelectionTool> {
        match self {
            Self::Selection(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn as_selection_tool_mut(&mut self) -> Option<&mut SelectionTool> {
        match self {
            Self::Selection(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn current_state_name(&self) -> &'static str {
        match self {
            Self::Line(tool) => tool.current_state_name(),
            Self::Selection(tool) => tool.current_state_name(),
        }
    }
}
