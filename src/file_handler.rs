use std::path::Path;

use eframe::egui;

use crate::image_loader::ImageSource;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Turns files dropped onto the window into image load requests
#[derive(Debug, Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks up newly dropped files from the UI context.
    /// Returns true if any arrived this frame.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        let mut new_dropped_files = false;

        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files = i.raw.dropped_files.clone();
                new_dropped_files = true;
            }
        });

        new_dropped_files
    }

    /// Drains the dropped files into `(source, display name)` pairs; non-images are skipped
    pub fn take_image_sources(&mut self) -> Vec<(ImageSource, String)> {
        std::mem::take(&mut self.dropped_files)
            .into_iter()
            .filter_map(|file| {
                let name = display_name(&file);
                if !is_image_file(&file) {
                    log::warn!("Dropped file is not a supported type: {name}");
                    return None;
                }
                let source = image_source(file, &name)?;
                Some((source, name))
            })
            .collect()
    }

    /// Preview files being dragged over the application
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, FontId, Id, LayerId, Order};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }

        let text = ctx.input(|i| {
            let mut text = "Dropping files:\n".to_owned();
            for file in &i.raw.hovered_files {
                if let Some(path) = &file.path {
                    text += &format!("\n{}", path.display());
                } else {
                    text += "\n(Path not available)";
                }
            }
            text
        });

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));

        let screen_rect = ctx.screen_rect();
        let font = ctx
            .style()
            .text_styles
            .get(&egui::TextStyle::Heading)
            .cloned()
            .unwrap_or_else(|| FontId::proportional(18.0));
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(screen_rect.center(), Align2::CENTER_CENTER, text, font, Color32::WHITE);
    }
}

fn display_name(file: &egui::DroppedFile) -> String {
    if !file.name.is_empty() {
        file.name.clone()
    } else if let Some(name) = file.path.as_deref().and_then(Path::file_name) {
        name.to_string_lossy().into_owned()
    } else {
        "unknown".to_owned()
    }
}

/// Check if a file is an image based on MIME type or extension
pub fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    let name = file
        .path
        .as_deref()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| file.name.clone().into());
    has_image_extension(&name)
}

pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

fn image_source(file: egui::DroppedFile, name: &str) -> Option<ImageSource> {
    if let Some(bytes) = file.bytes {
        log::info!("Loading image from memory: {name} ({} bytes)", bytes.len());
        return Some(ImageSource::Bytes(bytes.to_vec()));
    }
    match file.path {
        #[cfg(not(target_arch = "wasm32"))]
        Some(path) => {
            log::info!("Loading image from path: {}", path.display());
            Some(ImageSource::Path(path))
        }
        #[cfg(target_arch = "wasm32")]
        Some(_) => {
            log::warn!("File path access not supported on WASM: {name}");
            None
        }
        None => {
            log::warn!("Dropped file has no accessible data: {name}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn dropped(name: &str, mime: &str) -> egui::DroppedFile {
        egui::DroppedFile {
            name: name.to_owned(),
            mime: mime.to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn mime_type_wins_over_extension() {
        assert!(is_image_file(&dropped("photo.txt", "image/png")));
        assert!(!is_image_file(&dropped("photo.png", "text/plain")));
        assert!(is_image_file(&dropped("photo.JPG", "")));
        assert!(!is_image_file(&dropped("notes", "")));
    }

    #[test]
    fn dropped_bytes_become_sources() {
        let mut handler = FileHandler::new();
        let mut file = dropped("a.png", "image/png");
        file.bytes = Some(Arc::from(vec![1u8, 2, 3]));
        handler.dropped_files = vec![file, dropped("readme.md", "text/markdown")];

        let sources = handler.take_image_sources();
        assert_eq!(sources, vec![(ImageSource::Bytes(vec![1, 2, 3]), "a.png".to_owned())]);
        assert!(handler.take_image_sources().is_empty());
    }

    #[test]
    fn name_falls_back_to_path() {
        let file = egui::DroppedFile {
            path: Some(PathBuf::from("/tmp/pictures/cat.webp")),
            ..Default::default()
        };
        assert_eq!(display_name(&file), "cat.webp");
        assert!(is_image_file(&file));
    }
}
