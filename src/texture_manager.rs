use std::collections::HashMap;

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use thiserror::Error;

use crate::surface::Surface;

/// Errors that can occur during texture generation
#[derive(Error, Debug)]
pub enum TextureGenerationError {
    #[error("Failed to generate texture")]
    GenerationFailed,
    #[error("Invalid texture dimensions")]
    InvalidDimensions,
}

/// Which of the stacked surfaces a texture shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Main,
    Overlay,
    Cursor,
}

impl SurfaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Overlay => "overlay",
            Self::Cursor => "cursor",
        }
    }
}

type CacheKey = (SurfaceKind, u64);

/// Uploads surfaces to the GPU, caching by (surface, version)
pub struct TextureManager {
    texture_cache: HashMap<CacheKey, TextureHandle>,
    /// Tracks when each texture was last used
    last_used: HashMap<CacheKey, u64>,
    /// Current frame counter for LRU tracking
    current_frame: u64,
    max_cache_size: usize,
}

impl std::fmt::Debug for TextureManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureManager")
            .field("cached", &self.texture_cache.len())
            .field("current_frame", &self.current_frame)
            .field("max_cache_size", &self.max_cache_size)
            .finish()
    }
}

impl Default for TextureManager {
    fn default() -> Self {
        Self::new(6)
    }
}

impl TextureManager {
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            texture_cache: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size: max_cache_size.max(1),
        }
    }

    /// Increments the frame counter, should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    pub fn get_or_create_texture<F>(
        &mut self,
        kind: SurfaceKind,
        version: u64,
        generator: F,
        ctx: &Context,
    ) -> Result<TextureId, TextureGenerationError>
    where
        F: FnOnce() -> Result<ColorImage, TextureGenerationError>,
    {
        let cache_key = (kind, version);

        if let Some(handle) = self.texture_cache.get(&cache_key) {
            self.last_used.insert(cache_key, self.current_frame);
            return Ok(handle.id());
        }

        let image = generator()?;
        self.make_room();

        let name = format!("{}_v{}", kind.as_str(), version);
        let handle = ctx.load_texture(name, image, TextureOptions::NEAREST);

        self.texture_cache.insert(cache_key, handle.clone());
        self.last_used.insert(cache_key, self.current_frame);

        Ok(handle.id())
    }

    /// Texture for the current version of `surface`
    pub fn surface_texture(
        &mut self,
        kind: SurfaceKind,
        surface: &Surface,
        ctx: &Context,
    ) -> Result<TextureId, TextureGenerationError> {
        let texture = self.get_or_create_texture(kind, surface.version(), || color_image(surface), ctx)?;
        // Older versions of the same surface will never be shown again
        self.invalidate_older(kind, surface.version());
        Ok(texture)
    }

    /// Invalidates all textures for a specific surface
    pub fn invalidate_surface(&mut self, kind: SurfaceKind) {
        self.texture_cache.retain(|(cached, _), _| *cached != kind);
        self.last_used.retain(|(cached, _), _| *cached != kind);
    }

    fn invalidate_older(&mut self, kind: SurfaceKind, version: u64) {
        let stale = |(cached, cached_version): &CacheKey| *cached == kind && *cached_version < version;
        self.texture_cache.retain(|key, _| !stale(key));
        self.last_used.retain(|key, _| !stale(key));
    }

    /// Evicts least recently used textures so one more fits
    fn make_room(&mut self) {
        if self.texture_cache.len() < self.max_cache_size {
            return;
        }

        let mut entries: Vec<(CacheKey, u64)> = self.last_used.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = entries.len() + 1 - self.max_cache_size;
        for (key, _) in entries.iter().take(to_remove) {
            self.texture_cache.remove(key);
            self.last_used.remove(key);
        }
    }

    pub fn clear_cache(&mut self) {
        self.texture_cache.clear();
        self.last_used.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.texture_cache.len()
    }

    #[cfg(test)]
    pub fn get_texture(&self, kind: SurfaceKind, version: u64) -> Option<&TextureHandle> {
        self.texture_cache.get(&(kind, version))
    }
}

/// Straight-alpha surface pixels as an egui image
pub fn color_image(surface: &Surface) -> Result<ColorImage, TextureGenerationError> {
    let (width, height) = (surface.width() as usize, surface.height() as usize);
    if width == 0 || height == 0 {
        return Err(TextureGenerationError::InvalidDimensions);
    }
    Ok(ColorImage::from_rgba_unmultiplied([width, height], surface.image().as_raw()))
}
