use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::{EngineError, EngineResult};
use crate::geometry::Area;
use crate::surface::Surface;

/// Pixels of `surface`, cropped to `area` when one is given
pub fn crop(surface: &Surface, area: Option<&Area>) -> EngineResult<RgbaImage> {
    match area {
        None => Ok(surface.image().clone()),
        Some(area) => surface
            .copy_area(area)
            .ok_or_else(|| EngineError::Export(format!("selection {area:?} is outside the canvas"))),
    }
}

pub fn encode_png(image: RgbaImage) -> EngineResult<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// `filename` with a `.png` extension, stripped of any directory part
pub fn png_file_name(filename: &str) -> EngineResult<String> {
    let base = Path::new(filename.trim())
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| EngineError::Export(format!("invalid file name: {filename:?}")))?;
    let has_png = Path::new(base)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    Ok(if has_png {
        base.to_owned()
    } else {
        format!("{base}.png")
    })
}

/// Writes the (cropped) surface as `<dir>/<filename>.png`
pub fn save_png(surface: &Surface, area: Option<&Area>, dir: &Path, filename: &str) -> EngineResult<PathBuf> {
    let image = crop(surface, area)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(png_file_name(filename)?);
    std::fs::write(&path, encode_png(image)?)?;
    log::info!("Saved canvas to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_get_png_extension() {
        assert_eq!(png_file_name("my image").unwrap(), "my image.png");
        assert_eq!(png_file_name("shot.PNG").unwrap(), "shot.PNG");
        assert_eq!(png_file_name("../escape").unwrap(), "escape.png");
        assert!(png_file_name("   ").is_err());
    }
}
