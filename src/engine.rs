use std::path::PathBuf;

use egui::{CursorIcon, Key};
use image::RgbaImage;
use log::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::event::{EngineEvent, EventBus, EventHandler};
use crate::export;
use crate::geometry::{Area, map_coordinates};
use crate::history::History;
use crate::image_loader::{ImageSource, PendingLoad};
use crate::input::{KeyEvent, PointerEvent};
use crate::mode::DrawingMode;
use crate::style::StyleParams;
use crate::surface::Surfaces;
use crate::tools::{DrawContext, DrawingHandler, PointerDownResult, SelectionTool, ToolType};

/// Destructive actions that wait for the user to confirm
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    ResetAll,
    Save { filename: String },
}

/// Routes host input to the handler of the active mode family.
///
/// The engine never owns surfaces: every call borrows the host's [`Surfaces`].
#[derive(Debug)]
pub struct DrawingEngine {
    mode: Option<DrawingMode>,
    tool: Option<ToolType>,
    history: History,
    params: StyleParams,
    events: EventBus,
    config: EngineConfig,
    pending_load: Option<PendingLoad>,
    pending_confirmation: Option<ConfirmAction>,
}

impl DrawingEngine {
    /// Seeds history with the current main surface and enters the configured default mode
    pub fn new(config: EngineConfig, surfaces: &mut Surfaces) -> Self {
        let mut engine = Self {
            mode: None,
            tool: None,
            history: History::new(config.history_depth),
            params: config.style.clone(),
            events: EventBus::new(),
            config,
            pending_load: None,
            pending_confirmation: None,
        };
        engine.seed_baseline(surfaces);
        let mode = engine.config.default_mode;
        engine.set_mode(mode, surfaces);
        engine
    }

    pub fn mode(&self) -> Option<DrawingMode> {
        self.mode
    }

    pub fn params(&self) -> &StyleParams {
        &self.params
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tool(&self) -> Option<&ToolType> {
        self.tool.as_ref()
    }

    pub fn selection_tool(&self) -> Option<&SelectionTool> {
        self.tool.as_ref().and_then(ToolType::as_selection_tool)
    }

    pub fn selection_tool_mut(&mut self) -> Option<&mut SelectionTool> {
        self.tool.as_mut().and_then(ToolType::as_selection_tool_mut)
    }

    pub fn current_state_name(&self) -> &'static str {
        self.tool.as_ref().map_or("None", ToolType::current_state_name)
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.events.subscribe(handler);
    }

    pub fn pending_confirmation(&self) -> Option<&ConfirmAction> {
        self.pending_confirmation.as_ref()
    }

    pub fn has_pending_load(&self) -> bool {
        self.pending_load.is_some()
    }

    fn seed_baseline(&mut self, surfaces: &Surfaces) {
        match surfaces.main.as_ref() {
            Some(main) => self.history.push_image(main.image(), None),
            None => debug!("No main surface, history starts empty"),
        }
    }

    /// Runs `f` on the active handler with a context over `surfaces`
    fn with_tool<R>(
        &mut self,
        surfaces: &mut Surfaces,
        f: impl FnOnce(&mut ToolType, &mut DrawContext<'_>) -> R,
    ) -> Option<R> {
        let Self {
            tool,
            history,
            events,
            config,
            ..
        } = self;
        let tool = tool.as_mut()?;
        let mut ctx = DrawContext {
            surfaces,
            history,
            events,
            config,
        };
        Some(f(tool, &mut ctx))
    }

    pub fn set_mode(&mut self, mode: DrawingMode, surfaces: &mut Surfaces) {
        let old = self.mode;
        if old == Some(mode) {
            return;
        }

        self.with_tool(surfaces, |tool, ctx| tool.end_action(ctx));
        let keep_tool = self.tool.as_ref().is_some_and(|tool| tool.handles(mode));
        if !keep_tool {
            self.tool = Some(ToolType::for_mode(mode, &self.params, &self.config));
        }

        self.mode = Some(mode);
        self.with_tool(surfaces, |tool, ctx| tool.start_action(mode, ctx));
        debug!(
            "Mode {} -> {mode} ({} in {})",
            old.map_or("none", DrawingMode::name),
            self.current_state_name(),
            self.tool.as_ref().map_or("none", ToolType::name),
        );
        self.events.emit(EngineEvent::ModeChanged { old, new: mode });
    }

    /// Like [`Self::set_mode`], for modes named by the host; unknown names change nothing
    pub fn set_mode_by_name(&mut self, name: &str, surfaces: &mut Surfaces) -> EngineResult<()> {
        let mode = name.parse::<DrawingMode>().inspect_err(|err| warn!("{err}"))?;
        self.set_mode(mode, surfaces);
        Ok(())
    }

    fn follow_mode(&mut self, mode: DrawingMode, surfaces: &mut Surfaces) {
        if self.mode != Some(mode) {
            self.set_mode(mode, surfaces);
        }
    }

    pub fn on_pointer_down(
        &mut self,
        mode: DrawingMode,
        event: &PointerEvent,
        surfaces: &mut Surfaces,
    ) -> PointerDownResult {
        self.follow_mode(mode, surfaces);
        let pos = map_coordinates(event, surfaces.frame.as_ref());
        self.with_tool(surfaces, |tool, ctx| tool.on_pointer_down(mode, pos, ctx))
            .unwrap_or_default()
    }

    pub fn on_pointer_move(
        &mut self,
        mode: DrawingMode,
        event: &PointerEvent,
        surfaces: &mut Surfaces,
    ) -> Option<CursorIcon> {
        self.follow_mode(mode, surfaces);
        let pos = map_coordinates(event, surfaces.frame.as_ref());
        self.with_tool(surfaces, |tool, ctx| tool.on_pointer_move(mode, pos, ctx))
            .flatten()
    }

    pub fn on_pointer_up(&mut self, mode: DrawingMode, event: &PointerEvent, surfaces: &mut Surfaces) {
        self.follow_mode(mode, surfaces);
        let pos = map_coordinates(event, surfaces.frame.as_ref());
        self.with_tool(surfaces, |tool, ctx| tool.on_pointer_up(mode, pos, ctx));
    }

    pub fn on_pointer_leave(&mut self, mode: DrawingMode, surfaces: &mut Surfaces) {
        self.with_tool(surfaces, |tool, ctx| tool.on_pointer_leave(mode, ctx));
    }

    pub fn on_key_down(&mut self, key: &KeyEvent, surfaces: &mut Surfaces) {
        if key.is_command_key(Key::Z) {
            self.undo(surfaces);
            return;
        }
        self.with_tool(surfaces, |tool, ctx| tool.on_key_down(key, ctx));
    }

    /// Stamps whatever the active handler holds into the main surface
    pub fn commit(&mut self, surfaces: &mut Surfaces) -> bool {
        self.with_tool(surfaces, |tool, ctx| tool.commit(ctx))
            .unwrap_or(false)
    }

    pub fn set_style_params(&mut self, params: StyleParams, surfaces: &mut Surfaces) {
        self.params = params;
        let params = self.params.clone();
        self.with_tool(surfaces, |tool, ctx| tool.apply_style(&params, ctx));
        self.events.emit(EngineEvent::ParamsChanged);
    }

    /// Restores the snapshot before the latest commit; false when there is nothing to undo
    pub fn undo(&mut self, surfaces: &mut Surfaces) -> bool {
        let Some(main) = surfaces.main.as_mut() else {
            debug!("No main surface, undo skipped");
            return false;
        };
        let Some(snapshot) = self.history.undo() else {
            debug!("Nothing to undo");
            return false;
        };
        main.restore(snapshot.image());
        let len = self.history.len();
        info!("Undo, {len} snapshots left");
        self.events.emit(EngineEvent::HistoryChanged { len });
        true
    }

    /// Clears the main surface and history, then re-enters the active mode
    pub fn reset_all(&mut self, surfaces: &mut Surfaces) {
        self.history.clear();
        if let Some(main) = surfaces.main.as_mut() {
            main.clear();
        }
        surfaces.clear_overlay();
        surfaces.clear_cursor();
        self.seed_baseline(surfaces);

        if let Some(mode) = self.mode {
            self.with_tool(surfaces, |tool, ctx| {
                tool.end_action(ctx);
                tool.start_action(mode, ctx);
            });
        }
        info!("Canvas reset");
        self.events.emit(EngineEvent::Reset);
        self.events.emit(EngineEvent::HistoryChanged {
            len: self.history.len(),
        });
    }

    /// Parks `action` until [`Self::confirm`] or [`Self::dismiss_confirmation`]
    pub fn request_confirmation(&mut self, action: ConfirmAction) {
        debug!("Awaiting confirmation for {action:?}");
        self.pending_confirmation = Some(action.clone());
        self.events.emit(EngineEvent::ConfirmationRequested(action));
    }

    pub fn confirm(&mut self, surfaces: &mut Surfaces) -> EngineResult<()> {
        let action = self
            .pending_confirmation
            .take()
            .ok_or(EngineError::NoPendingConfirmation)?;
        match action {
            ConfirmAction::ResetAll => self.reset_all(surfaces),
            ConfirmAction::Save { filename } => {
                self.save_canvas(&filename, surfaces)?;
            }
        }
        Ok(())
    }

    pub fn dismiss_confirmation(&mut self) -> Option<ConfirmAction> {
        let action = self.pending_confirmation.take();
        if let Some(action) = &action {
            debug!("Dismissed {action:?}");
        }
        action
    }

    /// The area exports are cropped to, when the selection handler memorized one
    fn export_area(&self) -> Option<Area> {
        self.selection_tool().and_then(SelectionTool::selected_area)
    }

    /// Writes the main surface (cropped to the selection, if any) as a PNG in the export directory
    pub fn save_canvas(&mut self, filename: &str, surfaces: &Surfaces) -> EngineResult<PathBuf> {
        let main = surfaces.main.as_ref().ok_or(EngineError::SurfaceMissing("main"))?;
        let area = self.export_area();
        let path = export::save_png(main, area.as_ref(), &self.config.export_dir, filename)
            .inspect_err(|err| log::error!("Saving {filename} failed: {err}"))?;
        self.events.emit(EngineEvent::Saved { path: path.clone() });
        Ok(path)
    }

    /// PNG bytes of the main surface, cropped like [`Self::save_canvas`]
    pub fn export_canvas(&self, surfaces: &Surfaces) -> EngineResult<Vec<u8>> {
        let main = surfaces.main.as_ref().ok_or(EngineError::SurfaceMissing("main"))?;
        let area = self.export_area();
        export::encode_png(export::crop(main, area.as_ref())?)
    }

    /// Starts decoding `source` in the background; a load already running is dropped
    pub fn load_canvas(&mut self, source: ImageSource, name: impl Into<String>) {
        let pending = PendingLoad::spawn(source, name);
        info!("Loading image '{}'", pending.name());
        if self.pending_load.replace(pending).is_some() {
            debug!("Previous image load abandoned");
        }
    }

    /// Applies a finished background load; true once a load has completed, failed or not
    pub fn poll_pending_load(&mut self, surfaces: &mut Surfaces) -> bool {
        let Some(pending) = self.pending_load.as_mut() else {
            return false;
        };
        let Some(result) = pending.try_take() else {
            return false;
        };
        let name = pending.name().to_owned();
        self.pending_load = None;
        self.apply_loaded_image(result, &name, surfaces);
        true
    }

    /// Places a decoded image as the live shape; failures become alerts and leave the shape alone
    pub fn apply_loaded_image(
        &mut self,
        result: EngineResult<RgbaImage>,
        name: &str,
        surfaces: &mut Surfaces,
    ) -> bool {
        let image = match result {
            Ok(image) => image,
            Err(err) => {
                log::error!("Loading '{name}' failed: {err}");
                self.events.emit(EngineEvent::Alert(format!("Error loading the file: {err}")));
                return false;
            }
        };
        let (width, height) = image.dimensions();
        if surfaces.main_size().is_none() {
            let err = EngineError::SurfaceMissing("main");
            log::error!("Loading '{name}' failed: {err}");
            self.events.emit(EngineEvent::Alert(format!("Error loading the file: {err}")));
            return false;
        }

        self.follow_mode(DrawingMode::Image, surfaces);
        let placed = self
            .with_tool(surfaces, |tool, ctx| {
                tool.as_selection_tool_mut()
                    .and_then(|selection| selection.load_image(image, ctx))
            })
            .flatten();

        match placed {
            Some(area) => {
                info!("Image '{name}' placed at {area:?}");
                self.events.emit(EngineEvent::Alert(format!(
                    "Image '{name}' loaded w:{width} h:{height}"
                )));
                self.events.emit(EngineEvent::ImageLoaded {
                    name: name.to_owned(),
                    width,
                    height,
                });
                true
            }
            None => {
                let err = EngineError::SurfaceMissing("main");
                log::error!("Loading '{name}' failed: {err}");
                self.events.emit(EngineEvent::Alert(format!("Error loading the file: {err}")));
                false
            }
        }
    }
}
