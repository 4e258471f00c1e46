#![warn(clippy::all, rust_2018_idioms)]

/// Usage: `eframe_canvas [config.json]`
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    use std::path::PathBuf;

    use eframe::egui;
    use eframe_canvas::{EngineConfig, PaintApp};

    env_logger::init();

    let file_config = std::env::args().nth(1).map(PathBuf::from).and_then(|path| {
        EngineConfig::load(&path)
            .inspect_err(|err| log::error!("Ignoring config {}: {err}", path.display()))
            .ok()
    });

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };

    eframe::run_native(
        "eframe canvas",
        native_options,
        Box::new(move |cc| {
            let app = match file_config {
                Some(config) => PaintApp::with_config(config),
                None => PaintApp::new(cc),
            };
            Ok(Box::new(app))
        }),
    )
}

#[cfg(target_arch = "wasm32")]
fn main() {}
