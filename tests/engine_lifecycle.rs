use std::path::PathBuf;
use std::time::Duration;

use eframe_canvas::export;
use eframe_canvas::{
    ConfirmAction, DrawingEngine, DrawingMode, EngineConfig, EngineError, EngineEvent, EventLog, ImageSource, KeyEvent,
    PendingLoad, PointerEvent, ShapeType, SurfaceFrame, Surfaces,
};
use egui::{Key, Pos2, Rect, pos2, vec2};
use image::RgbaImage;

fn create_test_engine_with(config: EngineConfig) -> (DrawingEngine, Surfaces, EventLog) {
    let mut surfaces = Surfaces::new(config.surface_width, config.surface_height);
    let size = vec2(config.surface_width as f32, config.surface_height as f32);
    surfaces.frame = Some(SurfaceFrame::new(Rect::from_min_size(Pos2::ZERO, size), size));
    let engine = DrawingEngine::new(config, &mut surfaces);
    let log = EventLog::new();
    engine.subscribe(log.handler());
    (engine, surfaces, log)
}

fn create_test_engine() -> (DrawingEngine, Surfaces, EventLog) {
    create_test_engine_with(EngineConfig::default())
}

/// A fresh directory under the system temp dir
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("eframe_canvas_{}_{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn stroke(engine: &mut DrawingEngine, surfaces: &mut Surfaces, y: f32) {
    engine.on_pointer_down(DrawingMode::Draw, &PointerEvent::at(pos2(20.0, y)), surfaces);
    engine.on_pointer_move(DrawingMode::Draw, &PointerEvent::at(pos2(200.0, y)), surfaces);
    engine.on_pointer_up(DrawingMode::Draw, &PointerEvent::at(pos2(200.0, y)), surfaces);
}

fn wide_png() -> Vec<u8> {
    export::encode_png(RgbaImage::from_pixel(1000, 500, image::Rgba([10, 20, 30, 255]))).unwrap()
}

#[test]
fn test_undo_restores_previous_commit() {
    let (mut engine, mut surfaces, _log) = create_test_engine();
    let mut states = vec![surfaces.main.as_ref().unwrap().image().clone()];
    for i in 0..3 {
        stroke(&mut engine, &mut surfaces, 50.0 + 40.0 * i as f32);
        states.push(surfaces.main.as_ref().unwrap().image().clone());
    }
    assert_eq!(engine.history().len(), 4);

    assert!(engine.undo(&mut surfaces));
    assert_eq!(surfaces.main.as_ref().unwrap().image(), &states[2]);

    // Ctrl+Z goes through the same path
    engine.on_key_down(&KeyEvent::with_command(Key::Z), &mut surfaces);
    assert_eq!(surfaces.main.as_ref().unwrap().image(), &states[1]);
    assert_eq!(engine.history().len(), 2);
}

#[test]
fn test_undo_on_empty_history_is_a_no_op() {
    let (mut engine, mut surfaces, log) = create_test_engine();
    let before = surfaces.main.as_ref().unwrap().image().clone();
    log.drain();

    assert!(!engine.undo(&mut surfaces));
    assert_eq!(surfaces.main.as_ref().unwrap().image(), &before);
    assert_eq!(engine.history().len(), 1);
    assert!(log.snapshot().is_empty());
}

#[test]
fn test_history_is_bounded() {
    let config = EngineConfig {
        history_depth: 3,
        ..Default::default()
    };
    let (mut engine, mut surfaces, _log) = create_test_engine_with(config);
    for i in 0..5 {
        stroke(&mut engine, &mut surfaces, 20.0 + 20.0 * i as f32);
    }
    assert_eq!(engine.history().len(), 3);

    assert!(engine.undo(&mut surfaces));
    assert!(engine.undo(&mut surfaces));
    assert!(!engine.undo(&mut surfaces));
    // The oldest strokes fell off, so the baseline is no longer blank
    assert!(!surfaces.main.as_ref().unwrap().is_blank());
}

#[test]
fn test_unknown_mode_is_rejected() {
    let (mut engine, mut surfaces, log) = create_test_engine();
    log.drain();

    let result = engine.set_mode_by_name("spray", &mut surfaces);
    assert!(matches!(result, Err(EngineError::UnknownMode(name)) if name == "spray"));
    assert_eq!(engine.mode(), Some(DrawingMode::Draw));
    assert!(log.snapshot().is_empty());

    engine.set_mode_by_name("select-auto", &mut surfaces).unwrap();
    assert_eq!(engine.mode(), Some(DrawingMode::Select));
    assert_eq!(
        log.drain(),
        vec![EngineEvent::ModeChanged {
            old: Some(DrawingMode::Draw),
            new: DrawingMode::Select,
        }]
    );
}

#[test]
fn test_loaded_image_fits_the_surface() {
    let (mut engine, mut surfaces, log) = create_test_engine();

    let loaded = engine.apply_loaded_image(Ok(RgbaImage::new(1000, 500)), "wide.png", &mut surfaces);
    assert!(loaded);
    assert_eq!(engine.mode(), Some(DrawingMode::Image));

    let shape = engine.selection_tool().unwrap().shape();
    assert_eq!(shape.shape_type, ShapeType::Image);
    assert_eq!(shape.rotation, 0.0);
    assert!(shape.size.width <= 720.0 && shape.size.height <= 540.0);
    assert_eq!(shape.size.ratio, Some(2.0));
    assert!((shape.size.width / shape.size.height - 2.0).abs() < 0.01);
    assert!(log.alerts().contains(&"Image 'wide.png' loaded w:1000 h:500".to_owned()));
    assert!(!surfaces.overlay.as_ref().unwrap().is_blank());
}

#[test]
fn test_small_image_is_not_upscaled() {
    let (mut engine, mut surfaces, _log) = create_test_engine();
    engine.apply_loaded_image(Ok(RgbaImage::new(64, 32)), "icon.png", &mut surfaces);

    let size = engine.selection_tool().unwrap().shape().size;
    assert_eq!((size.width, size.height), (64.0, 32.0));
    assert_eq!(size.origin(), pos2(368.0, 284.0));
}

#[test]
fn test_background_decode_delivers_image() {
    let (mut engine, mut surfaces, _log) = create_test_engine();

    let pending = PendingLoad::spawn(ImageSource::Bytes(wide_png()), "wide.png");
    let (name, result) = futures::executor::block_on(pending.wait());
    assert_eq!(name, "wide.png");

    assert!(engine.apply_loaded_image(result, &name, &mut surfaces));
    let size = engine.selection_tool().unwrap().shape().size;
    assert_eq!((size.width, size.height), (720.0, 360.0));
}

#[test]
fn test_poll_pending_load() {
    let (mut engine, mut surfaces, log) = create_test_engine();
    engine.load_canvas(ImageSource::Bytes(wide_png()), "wide.png");
    assert!(engine.has_pending_load());

    let mut finished = false;
    for _ in 0..1000 {
        if engine.poll_pending_load(&mut surfaces) {
            finished = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(finished);
    assert!(!engine.has_pending_load());
    assert!(log
        .snapshot()
        .iter()
        .any(|event| matches!(event, EngineEvent::ImageLoaded { width: 1000, height: 500, .. })));
}

#[test]
fn test_decode_failure_alerts_and_changes_nothing() {
    let (mut engine, mut surfaces, log) = create_test_engine();

    let pending = PendingLoad::spawn(ImageSource::Bytes(b"not an image".to_vec()), "broken.png");
    let (name, result) = futures::executor::block_on(pending.wait());
    assert!(!engine.apply_loaded_image(result, &name, &mut surfaces));

    assert_eq!(engine.mode(), Some(DrawingMode::Draw));
    let alerts = log.alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].starts_with("Error loading the file"));
}

#[test]
fn test_reset_requires_confirmation() {
    let (mut engine, mut surfaces, log) = create_test_engine();
    stroke(&mut engine, &mut surfaces, 100.0);
    assert!(matches!(engine.confirm(&mut surfaces), Err(EngineError::NoPendingConfirmation)));

    engine.request_confirmation(ConfirmAction::ResetAll);
    assert_eq!(engine.pending_confirmation(), Some(&ConfirmAction::ResetAll));
    assert_eq!(engine.dismiss_confirmation(), Some(ConfirmAction::ResetAll));
    assert!(!surfaces.main.as_ref().unwrap().is_blank());

    engine.request_confirmation(ConfirmAction::ResetAll);
    engine.confirm(&mut surfaces).unwrap();
    assert!(surfaces.main.as_ref().unwrap().is_blank());
    assert_eq!(engine.history().len(), 1);
    assert!(log.snapshot().contains(&EngineEvent::Reset));
}

#[test]
fn test_save_writes_png() {
    let dir = scratch_dir("save");
    let config = EngineConfig {
        export_dir: dir.clone(),
        ..Default::default()
    };
    let (mut engine, mut surfaces, log) = create_test_engine_with(config);
    stroke(&mut engine, &mut surfaces, 100.0);

    engine.request_confirmation(ConfirmAction::Save {
        filename: "sketch".to_owned(),
    });
    engine.confirm(&mut surfaces).unwrap();

    let path = dir.join("sketch.png");
    let saved = image::open(&path).unwrap();
    assert_eq!((saved.width(), saved.height()), (800, 600));
    assert!(log.snapshot().contains(&EngineEvent::Saved { path }));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_export_crops_to_selection() {
    let (mut engine, mut surfaces, _log) = create_test_engine();
    engine.set_mode(DrawingMode::Select, &mut surfaces);
    engine.on_pointer_down(DrawingMode::Select, &PointerEvent::at(pos2(800.0, 600.0)), &mut surfaces);
    engine.on_pointer_move(DrawingMode::Select, &PointerEvent::at(pos2(120.0, 80.0)), &mut surfaces);
    engine.on_pointer_up(DrawingMode::Select, &PointerEvent::at(pos2(120.0, 80.0)), &mut surfaces);

    let bytes = engine.export_canvas(&surfaces).unwrap();
    let exported = image::load_from_memory(&bytes).unwrap();
    assert_eq!((exported.width(), exported.height()), (120, 80));
}

#[test]
fn test_export_without_main_surface_fails() {
    let mut surfaces = Surfaces::detached();
    let engine = DrawingEngine::new(EngineConfig::default(), &mut surfaces);
    assert!(matches!(
        engine.export_canvas(&surfaces),
        Err(EngineError::SurfaceMissing("main"))
    ));
}

#[test]
fn test_config_round_trip() {
    let dir = scratch_dir("config");
    let path = dir.join("canvas.json");

    // Missing file falls back to defaults
    assert_eq!(EngineConfig::load(&path).unwrap(), EngineConfig::default());

    let mut config = EngineConfig {
        surface_width: 1024,
        history_depth: 20,
        default_mode: DrawingMode::Line,
        ..Default::default()
    };
    config.style.general.line_width = 9.0;
    config.style.lock_ratio = true;
    config.save(&path).unwrap();

    assert_eq!(EngineConfig::load(&path).unwrap(), config);

    let (engine, _surfaces, _log) = create_test_engine_with(config);
    assert_eq!(engine.mode(), Some(DrawingMode::Line));
    assert_eq!(engine.params().general.line_width, 9.0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_style_change_is_announced() {
    let (mut engine, mut surfaces, log) = create_test_engine();
    log.drain();

    let mut params = engine.params().clone();
    params.general.opacity = 0.5;
    engine.set_style_params(params, &mut surfaces);

    assert_eq!(engine.params().general.opacity, 0.5);
    assert_eq!(log.drain(), vec![EngineEvent::ParamsChanged]);
}

#[test]
fn test_loaded_image_without_main_surface_keeps_mode() {
    let mut surfaces = Surfaces::detached();
    let mut engine = DrawingEngine::new(EngineConfig::default(), &mut surfaces);
    let log = EventLog::new();
    engine.subscribe(log.handler());

    assert!(!engine.apply_loaded_image(Ok(RgbaImage::new(40, 20)), "tiny.png", &mut surfaces));
    assert_eq!(engine.mode(), Some(DrawingMode::Draw));
    let alerts = log.alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].starts_with("Error loading the file"));
}
