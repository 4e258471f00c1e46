pub mod area;
pub mod coordinates;
pub mod handles;
pub mod hit_testing;

pub use area::{Area, MIN_AREA_SIZE, fit_size};
pub use coordinates::{SurfaceFrame, map_coordinates};
pub use handles::ResizeHandle;
pub use hit_testing::{Decorations, RESIZE_HANDLE_MARGIN, ShapeHit, hit_test};
