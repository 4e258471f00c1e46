use eframe_canvas::geometry::ShapeHit;
use eframe_canvas::render::measure_text;
use eframe_canvas::shape::ROTATION_STEP;
use eframe_canvas::tools::TransformState;
use eframe_canvas::{
    Area, DrawingEngine, DrawingMode, EngineConfig, KeyEvent, PointerEvent, SelectionTool, ShapeType,
    SurfaceFrame, Surfaces,
};
use egui::{Color32, Key, Pos2, Rect, pos2, vec2};

fn create_test_engine() -> (DrawingEngine, Surfaces) {
    let mut surfaces = Surfaces::new(800, 600);
    surfaces.frame = Some(SurfaceFrame::new(
        Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0)),
        vec2(800.0, 600.0),
    ));
    let engine = DrawingEngine::new(EngineConfig::default(), &mut surfaces);
    (engine, surfaces)
}

fn at(x: f32, y: f32) -> PointerEvent {
    PointerEvent::at(pos2(x, y))
}

fn selection(engine: &DrawingEngine) -> &SelectionTool {
    engine.selection_tool().unwrap()
}

/// Press, drag and release in one go
fn drag(engine: &mut DrawingEngine, surfaces: &mut Surfaces, mode: DrawingMode, from: Pos2, to: Pos2) {
    engine.on_pointer_down(mode, &PointerEvent::at(from), surfaces);
    engine.on_pointer_move(mode, &PointerEvent::at(to), surfaces);
    engine.on_pointer_up(mode, &PointerEvent::at(to), surfaces);
}

#[test]
fn test_new_shape_is_centered_and_placing() {
    let (mut engine, mut surfaces) = create_test_engine();
    engine.set_mode(DrawingMode::Square, &mut surfaces);

    let tool = selection(&engine);
    assert_eq!(tool.state(), TransformState::Placing);
    assert_eq!(tool.shape().shape_type, ShapeType::Square);
    assert_eq!(tool.shape().size, Area::new(350.0, 250.0, 100.0, 100.0));
    assert!(tool.shape().with_middle_buttons && tool.shape().with_corner_button);
    assert!(!surfaces.overlay.as_ref().unwrap().is_blank());

    // While placing, the shape follows the pointer
    engine.on_pointer_move(DrawingMode::Square, &at(200.0, 150.0), &mut surfaces);
    assert_eq!(selection(&engine).shape().size.center(), pos2(200.0, 150.0));
}

#[test]
fn test_resize_ends_fixed_without_handle() {
    let (mut engine, mut surfaces) = create_test_engine();
    engine.set_mode(DrawingMode::Square, &mut surfaces);

    // Pin the shape where it was placed
    drag(&mut engine, &mut surfaces, DrawingMode::Square, pos2(400.0, 300.0), pos2(400.0, 300.0));
    assert_eq!(selection(&engine).state(), TransformState::Fixed);

    engine.on_pointer_down(DrawingMode::Square, &at(450.0, 350.0), &mut surfaces);
    assert!(selection(&engine).resizing_handle().is_some());
    engine.on_pointer_move(DrawingMode::Square, &at(500.0, 400.0), &mut surfaces);
    assert_eq!(selection(&engine).shape().size, Area::new(350.0, 250.0, 150.0, 150.0));
    engine.on_pointer_up(DrawingMode::Square, &at(500.0, 400.0), &mut surfaces);

    let tool = selection(&engine);
    assert!(tool.is_fixed());
    assert_eq!(tool.resizing_handle(), None);
    assert_eq!(tool.state(), TransformState::Fixed);
}

#[test]
fn test_drag_keeps_grab_offset() {
    let (mut engine, mut surfaces) = create_test_engine();
    engine.set_mode(DrawingMode::Circle, &mut surfaces);
    drag(&mut engine, &mut surfaces, DrawingMode::Circle, pos2(400.0, 300.0), pos2(400.0, 300.0));

    engine.on_pointer_down(DrawingMode::Circle, &at(370.0, 280.0), &mut surfaces);
    assert_eq!(selection(&engine).offset(), Some(vec2(-20.0, -30.0)));
    engine.on_pointer_move(DrawingMode::Circle, &at(170.0, 180.0), &mut surfaces);
    engine.on_pointer_up(DrawingMode::Circle, &at(170.0, 180.0), &mut surfaces);

    assert_eq!(selection(&engine).shape().size.origin(), pos2(150.0, 150.0));
}

#[test]
fn test_rotate_left_then_right_is_exact() {
    let (mut engine, mut surfaces) = create_test_engine();
    engine.set_mode(DrawingMode::Square, &mut surfaces);
    // Buttons sit 20px above the top edge, 15px either side of the center
    let rotate_left = at(385.0, 230.0);
    let rotate_right = at(415.0, 230.0);

    engine.on_pointer_down(DrawingMode::Square, &rotate_right, &mut surfaces);
    engine.on_pointer_down(DrawingMode::Square, &rotate_right, &mut surfaces);
    assert_eq!(selection(&engine).shape().rotation, 2.0 * ROTATION_STEP);

    engine.on_pointer_down(DrawingMode::Square, &rotate_left, &mut surfaces);
    assert_eq!(selection(&engine).shape().rotation, ROTATION_STEP);
    engine.on_pointer_down(DrawingMode::Square, &rotate_left, &mut surfaces);
    assert_eq!(selection(&engine).shape().rotation, 0.0);

    // Rotating never commits
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn test_aspect_locked_resize_keeps_ratio() {
    let (mut engine, mut surfaces) = create_test_engine();
    engine.set_mode(DrawingMode::Square, &mut surfaces);
    drag(&mut engine, &mut surfaces, DrawingMode::Square, pos2(400.0, 300.0), pos2(400.0, 300.0));

    // Unlocked: stretch to 200x100
    drag(&mut engine, &mut surfaces, DrawingMode::Square, pos2(450.0, 350.0), pos2(550.0, 350.0));
    assert_eq!(selection(&engine).shape().size.size(), vec2(200.0, 100.0));

    let mut params = engine.params().clone();
    params.lock_ratio = true;
    engine.set_style_params(params, &mut surfaces);
    assert_eq!(selection(&engine).shape().size.ratio, Some(2.0));

    drag(&mut engine, &mut surfaces, DrawingMode::Square, pos2(550.0, 350.0), pos2(650.0, 500.0));
    let size = selection(&engine).shape().size;
    assert!((size.width / size.height - 2.0).abs() < 1e-4);
    assert_eq!(size.origin(), pos2(350.0, 250.0));

    drag(&mut engine, &mut surfaces, DrawingMode::Square, pos2(350.0, 400.0), pos2(300.0, 400.0));
    let size = selection(&engine).shape().size;
    assert!((size.width / size.height - 2.0).abs() < 1e-4);
}

#[test]
fn test_commit_button_stamps_and_requests_reset() {
    let (mut engine, mut surfaces) = create_test_engine();
    engine.set_mode(DrawingMode::Square, &mut surfaces);

    let mut params = engine.params().clone();
    params.shape.filled = true;
    params.shape.with_border = false;
    engine.set_style_params(params, &mut surfaces);

    // Commit button: 20px right of and above the top-right corner
    let result = engine.on_pointer_down(DrawingMode::Square, &at(470.0, 230.0), &mut surfaces);
    assert!(result.to_reset);
    assert_eq!(engine.history().len(), 2);
    assert_eq!(surfaces.main.as_ref().unwrap().pixel(400, 300), Some([255, 0, 0, 255]));
    assert!(surfaces.overlay.as_ref().unwrap().is_blank());
}

#[test]
fn test_select_mode_memorizes_whole_surface() {
    let (mut engine, mut surfaces) = create_test_engine();
    engine.set_mode(DrawingMode::Select, &mut surfaces);

    let tool = selection(&engine);
    assert_eq!(tool.selected_area(), Some(Area::new(0.0, 0.0, 800.0, 600.0)));
    assert!(tool.shape().is_marquee());
    assert!(!tool.shape().with_middle_buttons && !tool.shape().with_corner_button);

    // A marquee is never stamped
    assert!(!engine.commit(&mut surfaces));
    assert!(surfaces.main.as_ref().unwrap().is_blank());
}

#[test]
fn test_copy_drag_paste_is_pixel_identical() {
    let (mut engine, mut surfaces) = create_test_engine();
    let main = surfaces.main.as_mut().unwrap();
    main.fill_rect(Rect::from_min_size(pos2(100.0, 100.0), vec2(20.0, 40.0)), Color32::BLUE);
    main.fill_rect(Rect::from_min_size(pos2(120.0, 100.0), vec2(20.0, 40.0)), Color32::YELLOW);

    engine.set_mode(DrawingMode::Select, &mut surfaces);
    drag(&mut engine, &mut surfaces, DrawingMode::Select, pos2(0.0, 0.0), pos2(100.0, 100.0));
    drag(&mut engine, &mut surfaces, DrawingMode::Select, pos2(800.0, 600.0), pos2(140.0, 140.0));
    assert_eq!(selection(&engine).selected_area(), Some(Area::new(100.0, 100.0, 40.0, 40.0)));

    engine.on_key_down(&KeyEvent::with_command(Key::C), &mut surfaces);
    let tool = selection(&engine);
    assert_eq!(tool.shape().shape_type, ShapeType::Image);
    assert_eq!(tool.hovered(), Some(ShapeHit::Inside));

    drag(&mut engine, &mut surfaces, DrawingMode::Select, pos2(120.0, 120.0), pos2(320.0, 220.0));
    assert_eq!(selection(&engine).shape().size.origin(), pos2(300.0, 200.0));

    engine.on_key_down(&KeyEvent::with_command(Key::V), &mut surfaces);
    assert_eq!(engine.history().len(), 2);

    let main = surfaces.main.as_ref().unwrap();
    for y in 0..40 {
        for x in 0..40 {
            assert_eq!(main.pixel(100 + x, 100 + y), main.pixel(300 + x, 200 + y), "pixel {x},{y}");
        }
    }
}

#[test]
fn test_cut_and_delete_clear_the_selection() {
    let (mut engine, mut surfaces) = create_test_engine();
    surfaces
        .main
        .as_mut()
        .unwrap()
        .fill_rect(Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0)), Color32::GREEN);

    engine.set_mode(DrawingMode::Select, &mut surfaces);
    drag(&mut engine, &mut surfaces, DrawingMode::Select, pos2(800.0, 600.0), pos2(50.0, 50.0));
    engine.on_key_down(&KeyEvent::with_command(Key::X), &mut surfaces);

    let main = surfaces.main.as_ref().unwrap();
    assert_eq!(main.pixel(10, 10), Some([0, 0, 0, 0]));
    assert_eq!(main.pixel(60, 60), Some([0, 255, 0, 255]));
    assert_eq!(selection(&engine).shape().shape_type, ShapeType::Image);
    assert_eq!(engine.history().len(), 2);

    engine.set_mode(DrawingMode::Square, &mut surfaces);
    engine.set_mode(DrawingMode::Select, &mut surfaces);
    engine.on_key_down(&KeyEvent::new(Key::Delete), &mut surfaces);
    assert!(surfaces.main.as_ref().unwrap().is_blank());
    assert_eq!(engine.history().len(), 3);
}

#[test]
fn test_escape_drops_selection() {
    let (mut engine, mut surfaces) = create_test_engine();
    engine.set_mode(DrawingMode::Select, &mut surfaces);
    engine.on_key_down(&KeyEvent::new(Key::Escape), &mut surfaces);

    let tool = selection(&engine);
    assert_eq!(tool.selected_area(), None);
    assert!(tool.shape().is_marquee());
    // Without a selection there is nothing to copy
    engine.on_key_down(&KeyEvent::with_command(Key::C), &mut surfaces);
    assert!(selection(&engine).shape().is_marquee());
}

fn commit_button(engine: &DrawingEngine) -> PointerEvent {
    let size = selection(engine).shape().size;
    at(size.x + size.width + 20.0, size.y - 20.0)
}

fn has_ink_in_columns(surfaces: &Surfaces, from: u32, to: u32) -> bool {
    surfaces
        .main
        .as_ref()
        .unwrap()
        .image()
        .enumerate_pixels()
        .any(|(x, _, pixel)| x >= from && x < to && pixel[3] > 0)
}

#[test]
fn test_text_box_grows_with_its_text() {
    let (mut engine, mut surfaces) = create_test_engine();
    engine.set_mode(DrawingMode::Text, &mut surfaces);
    let center = selection(&engine).shape().size.center();

    let text = "Hello, a considerably wide world";
    let mut params = engine.params().clone();
    params.text.text = text.to_owned();
    params.text.font_size = 40.0;
    engine.set_style_params(params, &mut surfaces);

    let needed = measure_text(text, 40.0);
    let size = selection(&engine).shape().size;
    assert!(size.width >= needed.x && size.height >= needed.y);
    assert!(size.center().distance(center) < 1e-3);

    let result = engine.on_pointer_down(DrawingMode::Text, &commit_button(&engine), &mut surfaces);
    assert!(result.to_reset);
    assert_eq!(engine.history().len(), 2);

    // Both ends of the line made it onto the surface
    let left = size.x as u32;
    let right = (size.x + size.width) as u32;
    let fifth = (right - left) / 5;
    assert!(has_ink_in_columns(&surfaces, left, left + fifth));
    assert!(has_ink_in_columns(&surfaces, right - fifth, right));
}

#[test]
fn test_empty_text_is_not_committed() {
    let (mut engine, mut surfaces) = create_test_engine();
    engine.set_mode(DrawingMode::Text, &mut surfaces);

    let result = engine.on_pointer_down(DrawingMode::Text, &commit_button(&engine), &mut surfaces);
    assert!(!result.to_reset);
    assert!(!engine.commit(&mut surfaces));
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn test_image_mode_without_image_is_not_committed() {
    let (mut engine, mut surfaces) = create_test_engine();
    engine.set_mode(DrawingMode::Image, &mut surfaces);

    let tool = selection(&engine);
    assert_eq!(tool.shape().shape_type, ShapeType::Image);
    assert!(tool.shape().payload.is_none());
    assert_eq!(tool.shape().size, Area::new(350.0, 250.0, 100.0, 100.0));

    let result = engine.on_pointer_down(DrawingMode::Image, &commit_button(&engine), &mut surfaces);
    assert!(!result.to_reset);
    assert!(!engine.commit(&mut surfaces));
    assert_eq!(engine.history().len(), 1);
    assert!(surfaces.main.as_ref().unwrap().is_blank());
}

#[test]
fn test_rounded_shapes_commit_their_outline() {
    const BLANK: Option<[u8; 4]> = Some([0, 0, 0, 0]);
    // (mode, top-left corner blank, bottom-left corner blank)
    let cases = [
        (DrawingMode::Circle, true, true),
        (DrawingMode::RadiusTop, true, false),
        (DrawingMode::RadiusBottom, false, true),
        (DrawingMode::RadiusHalf, true, true),
    ];

    for (mode, top_blank, bottom_blank) in cases {
        let (mut engine, mut surfaces) = create_test_engine();
        engine.set_mode(mode, &mut surfaces);
        let mut params = engine.params().clone();
        params.shape.filled = true;
        params.shape.with_border = false;
        params.shape.radius = 30.0;
        engine.set_style_params(params, &mut surfaces);

        assert!(engine.commit(&mut surfaces), "{mode}");
        let main = surfaces.main.as_ref().unwrap();
        assert_eq!(main.pixel(400, 300), Some([255, 0, 0, 255]), "{mode}");
        assert_eq!(main.pixel(351, 251) == BLANK, top_blank, "{mode}");
        assert_eq!(main.pixel(351, 348) == BLANK, bottom_blank, "{mode}");
        assert_eq!(main.pixel(300, 300), BLANK, "{mode}");
    }
}

#[test]
fn test_rotated_shape_commits_rotated() {
    let (mut engine, mut surfaces) = create_test_engine();
    engine.set_mode(DrawingMode::Square, &mut surfaces);
    let mut params = engine.params().clone();
    params.shape.filled = true;
    params.shape.with_border = false;
    params.shape.radius = 0.0;
    engine.set_style_params(params, &mut surfaces);

    let rotate_right = at(415.0, 230.0);
    for _ in 0..4 {
        engine.on_pointer_down(DrawingMode::Square, &rotate_right, &mut surfaces);
    }
    assert_eq!(selection(&engine).shape().rotation, 4.0 * ROTATION_STEP);
    assert!(engine.commit(&mut surfaces));

    let main = surfaces.main.as_ref().unwrap();
    // A diamond: the tip pokes above the unrotated top edge, the corners are empty
    assert_eq!(main.pixel(400, 240).map(|p| p[3]), Some(255));
    assert_eq!(main.pixel(355, 255), Some([0, 0, 0, 0]));
    assert_eq!(main.pixel(400, 300), Some([255, 0, 0, 255]));
}
