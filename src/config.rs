use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{MIN_AREA_SIZE, RESIZE_HANDLE_MARGIN};
use crate::history::History;
use crate::mode::DrawingMode;
use crate::style::StyleParams;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to (de)serialize config: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Engine settings, stored as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub surface_width: u32,
    pub surface_height: u32,
    /// Snapshots kept for undo, baseline included
    pub history_depth: usize,
    /// Where `save_canvas` writes PNG files
    pub export_dir: PathBuf,
    /// Grab distance around resize handles, in pixels
    pub handle_margin: f32,
    pub min_shape_size: f32,
    /// Share of the surface a loaded image may cover
    pub image_fit: f32,
    pub default_mode: DrawingMode,
    pub style: StyleParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            surface_width: 800,
            surface_height: 600,
            history_depth: History::DEFAULT_DEPTH,
            export_dir: PathBuf::from("."),
            handle_margin: RESIZE_HANDLE_MARGIN,
            min_shape_size: MIN_AREA_SIZE,
            image_fit: 0.9,
            default_mode: DrawingMode::Draw,
            style: StyleParams::default(),
        }
    }
}

impl EngineConfig {
    /// Reads `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        log::info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.surface_width == 0 || self.surface_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "surface size {}x{} is empty",
                self.surface_width, self.surface_height
            )));
        }
        if self.history_depth < 2 {
            return Err(ConfigError::Invalid(format!(
                "history depth {} leaves no room past the baseline",
                self.history_depth
            )));
        }
        if !(self.image_fit > 0.0 && self.image_fit <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "image fit {} must be in (0, 1]",
                self.image_fit
            )));
        }
        if !(self.handle_margin >= 0.0) || !(self.min_shape_size >= 0.0) {
            return Err(ConfigError::Invalid("negative handle margin or shape size".to_owned()));
        }
        Ok(())
    }
}
