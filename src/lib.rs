#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod export;
pub mod file_handler;
pub mod geometry;
pub mod history;
pub mod image_loader;
pub mod input;
pub mod mode;
pub mod render;
pub mod shape;
pub mod style;
pub mod surface;
pub mod texture_manager;
pub mod tools;
pub mod util;

pub use app::PaintApp;
pub use config::{ConfigError, EngineConfig};
pub use engine::{ConfirmAction, DrawingEngine};
pub use error::{EngineError, EngineResult};
pub use event::{EngineEvent, EventBus, EventHandler, EventLog};
pub use geometry::{Area, ResizeHandle, SurfaceFrame};
pub use history::{History, HistorySnapshot};
pub use image_loader::{ImageSource, PendingLoad};
pub use input::{InputEvent, InputHandler, KeyEvent, PointerEvent};
pub use mode::DrawingMode;
pub use shape::{ShapeDefinition, ShapeType};
pub use style::StyleParams;
pub use surface::{Surface, Surfaces};
pub use tools::{DrawingHandler, LineTool, PointerDownResult, SelectionTool, ToolType};
