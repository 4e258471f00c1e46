use egui::{Color32, CursorIcon, Rect, Sense, Vec2, pos2};

use crate::config::EngineConfig;
use crate::engine::{ConfirmAction, DrawingEngine};
use crate::event::{EngineEvent, EventLog};
use crate::file_handler::FileHandler;
use crate::geometry::SurfaceFrame;
use crate::input::{InputEvent, InputHandler};
use crate::mode::{DrawingMode, ModeFamily};
use crate::surface::{Surface, Surfaces};
use crate::texture_manager::{SurfaceKind, TextureManager};

const UV_FULL: Rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));

/// Thin eframe shell around [`DrawingEngine`]: mode picker, style controls and the canvas
pub struct PaintApp {
    config: EngineConfig,
    surfaces: Surfaces,
    engine: DrawingEngine,
    mode: DrawingMode,
    input: InputHandler,
    textures: TextureManager,
    files: FileHandler,
    events: EventLog,
    cursor: Option<CursorIcon>,
    status: Option<String>,
    save_name: String,
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = cc
            .storage
            .and_then(|storage| eframe::get_value::<EngineConfig>(storage, eframe::APP_KEY))
            .filter(|config| match config.validate() {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("Ignoring stored config: {err}");
                    false
                }
            })
            .unwrap_or_default();
        Self::with_config(config)
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mut surfaces = Surfaces::new(config.surface_width, config.surface_height);
        let engine = DrawingEngine::new(config.clone(), &mut surfaces);
        let events = EventLog::new();
        engine.subscribe(events.handler());

        Self {
            mode: engine.mode().unwrap_or(config.default_mode),
            config,
            surfaces,
            engine,
            input: InputHandler::new(Rect::NOTHING),
            textures: TextureManager::default(),
            files: FileHandler::new(),
            events,
            cursor: None,
            status: None,
            save_name: "drawing".to_owned(),
        }
    }

    fn set_mode(&mut self, mode: DrawingMode) {
        self.mode = mode;
        self.engine.set_mode(mode, &mut self.surfaces);
    }

    /// Folds engine notifications into UI state
    fn handle_engine_events(&mut self) {
        for event in self.events.drain() {
            match event {
                EngineEvent::ModeChanged { new, .. } => self.mode = new,
                EngineEvent::Alert(message) => self.status = Some(message),
                EngineEvent::Saved { path } => self.status = Some(format!("Saved {}", path.display())),
                EngineEvent::Reset => self.status = Some("Canvas cleared".to_owned()),
                _ => {}
            }
        }
    }

    fn dispatch_input(&mut self, ctx: &egui::Context) {
        let typing = ctx.wants_keyboard_input();
        for event in self.input.process_input(ctx) {
            match event {
                InputEvent::PointerDown(pointer) => {
                    let result = self.engine.on_pointer_down(self.mode, &pointer, &mut self.surfaces);
                    if result.pointer_style.is_some() {
                        self.cursor = result.pointer_style;
                    }
                    if result.to_reset {
                        self.set_mode(DrawingMode::Draw);
                    }
                }
                InputEvent::PointerMove(pointer) => {
                    self.cursor = self.engine.on_pointer_move(self.mode, &pointer, &mut self.surfaces);
                }
                InputEvent::PointerUp(pointer) => {
                    self.engine.on_pointer_up(self.mode, &pointer, &mut self.surfaces);
                }
                InputEvent::PointerLeave => {
                    self.engine.on_pointer_leave(self.mode, &mut self.surfaces);
                    self.cursor = None;
                }
                InputEvent::KeyDown(key) if !typing => {
                    self.engine.on_key_down(&key, &mut self.surfaces);
                }
                InputEvent::KeyDown(_) => {}
            }
        }
    }

    fn tools_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("tools_panel").resizable(false).show(ctx, |ui| {
            ui.heading("Tools");
            for &mode in DrawingMode::all() {
                if ui.selectable_label(self.mode == mode, mode.label()).clicked() && self.mode != mode {
                    self.set_mode(mode);
                }
            }

            ui.separator();
            self.style_controls(ui);

            ui.separator();
            ui.horizontal(|ui| {
                let can_undo = self.engine.history().can_undo();
                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    self.engine.undo(&mut self.surfaces);
                }
                let has_shape = matches!(
                    self.mode.family(),
                    ModeFamily::Shape | ModeFamily::Text | ModeFamily::Select
                );
                if ui.add_enabled(has_shape, egui::Button::new("Apply")).clicked()
                    && self.engine.commit(&mut self.surfaces)
                {
                    self.set_mode(DrawingMode::Draw);
                }
            });
            if ui.button("Clear canvas").clicked() {
                self.engine.request_confirmation(ConfirmAction::ResetAll);
            }
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.save_name);
                if ui.button("Save").clicked() {
                    self.engine.request_confirmation(ConfirmAction::Save {
                        filename: self.save_name.clone(),
                    });
                }
            });

            ui.separator();
            ui.label(format!("State: {}", self.engine.current_state_name()));
            ui.label(format!("History: {}", self.engine.history().len()));
            if let Some(status) = &self.status {
                ui.label(status);
            }
        });
    }

    fn style_controls(&mut self, ui: &mut egui::Ui) {
        let mut params = self.engine.params().clone();
        let mut changed = false;

        ui.horizontal(|ui| {
            ui.label("Color");
            changed |= ui.color_edit_button_srgba(&mut params.general.color).changed();
        });
        changed |= ui
            .add(egui::Slider::new(&mut params.general.line_width, 1.0..=50.0).text("Width"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut params.general.opacity, 0.0..=1.0).text("Opacity"))
            .changed();

        match self.mode.family() {
            ModeFamily::Shape => {
                changed |= ui.checkbox(&mut params.shape.filled, "Filled").changed();
                changed |= ui.checkbox(&mut params.shape.with_border, "Border").changed();
                changed |= ui
                    .add(egui::Slider::new(&mut params.shape.radius, 0.0..=50.0).text("Radius"))
                    .changed();
            }
            ModeFamily::Text => {
                changed |= ui.text_edit_singleline(&mut params.text.text).changed();
                changed |= ui
                    .add(egui::Slider::new(&mut params.text.font_size, 8.0..=96.0).text("Size"))
                    .changed();
                changed |= ui.checkbox(&mut params.text.italic, "Italic").changed();
                let mut bold = params.text.is_bold();
                if ui.checkbox(&mut bold, "Bold").changed() {
                    params.text.bold = if bold { 700 } else { 400 };
                    changed = true;
                }
            }
            _ => {}
        }
        changed |= ui.checkbox(&mut params.lock_ratio, "Lock ratio").changed();

        if changed {
            self.engine.set_style_params(params, &mut self.surfaces);
        }
    }

    fn confirmation_window(&mut self, ctx: &egui::Context) {
        let Some(action) = self.engine.pending_confirmation().cloned() else {
            return;
        };
        let question = match &action {
            ConfirmAction::ResetAll => "Clear the whole canvas?".to_owned(),
            ConfirmAction::Save { filename } => format!("Save the canvas as '{filename}'?"),
        };

        egui::Window::new("Confirm")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(question);
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        if let Err(err) = self.engine.confirm(&mut self.surfaces) {
                            log::error!("{err}");
                            self.status = Some(err.to_string());
                        }
                    }
                    if ui.button("No").clicked() {
                        self.engine.dismiss_confirmation();
                    }
                });
            });
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let size = self.surfaces.main_size().unwrap_or(Vec2::splat(1.0));
        let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
        let rect = response.rect;
        self.surfaces.frame = Some(SurfaceFrame::new(rect, size));
        self.input.set_canvas_rect(rect);

        self.dispatch_input(ui.ctx());

        painter.rect_filled(rect, 0.0, Color32::WHITE);
        let layers = [
            (SurfaceKind::Main, self.surfaces.main.as_ref()),
            (SurfaceKind::Overlay, self.surfaces.overlay.as_ref()),
            (SurfaceKind::Cursor, self.surfaces.cursor.as_ref()),
        ];
        for (kind, surface) in layers {
            let Some(surface) = surface else {
                continue;
            };
            paint_surface(&mut self.textures, &painter, kind, surface, rect);
        }

        if response.hovered() {
            if let Some(icon) = self.cursor {
                ui.ctx().set_cursor_icon(icon);
            }
        }
    }
}

fn paint_surface(textures: &mut TextureManager, painter: &egui::Painter, kind: SurfaceKind, surface: &Surface, rect: Rect) {
    match textures.surface_texture(kind, surface, painter.ctx()) {
        Ok(texture) => {
            painter.image(texture, rect, UV_FULL, Color32::WHITE);
        }
        Err(err) => log::error!("Failed to upload {} surface: {err}", kind.as_str()),
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.config.style = self.engine.params().clone();
        self.config.default_mode = self.mode;
        eframe::set_value(storage, eframe::APP_KEY, &self.config);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.textures.begin_frame();

        self.engine.poll_pending_load(&mut self.surfaces);
        if self.engine.has_pending_load() {
            ctx.request_repaint();
        }

        self.files.preview_files_being_dropped(ctx);
        if self.files.check_for_dropped_files(ctx) {
            for (source, name) in self.files.take_image_sources() {
                self.engine.load_canvas(source, name);
            }
            ctx.request_repaint();
        }

        self.tools_panel(ctx);
        self.confirmation_window(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| self.canvas(ui));
        });

        self.handle_engine_events();
    }
}
