use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the drawing engine.
///
/// Pointer and keyboard handling never fails: missing surfaces degrade to no-ops.
/// These variants cover the calls that do have a caller waiting for an answer.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown drawing mode: {0}")]
    UnknownMode(String),

    #[error("The {0} surface is not attached")]
    SurfaceMissing(&'static str),

    #[error("No action is waiting for confirmation")]
    NoPendingConfirmation,

    #[error("Failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Image loading was cancelled before it finished")]
    LoadCancelled,

    #[error("Failed to export canvas: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
