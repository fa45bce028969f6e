use std::path::{Path, PathBuf};

use image::{ColorType, DynamicImage};
use optolab_core::acquisition::Frame;

/// File extensions offered in the opening widget
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "tif", "tiff", "bmp"];

#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("Image file not found: {0}")]
    NotFound(PathBuf),

    #[error("Cannot decode '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image '{0}' has no pixels")]
    Empty(PathBuf),
}

/// Decode an image file into a grayscale frame.
///
/// 8-bit sources keep their values; anything deeper is converted to 16-bit luma.
pub fn load_frame(path: &Path) -> Result<Frame, ImageLoadError> {
    if !path.is_file() {
        return Err(ImageLoadError::NotFound(path.to_path_buf()));
    }
    let decoded = image::open(path).map_err(|source| ImageLoadError::Decode { path: path.to_path_buf(), source })?;
    log::debug!("Decoded {} as {:?}", path.display(), decoded.color());
    frame_from_image(&decoded).ok_or_else(|| ImageLoadError::Empty(path.to_path_buf()))
}

fn frame_from_image(decoded: &DynamicImage) -> Option<Frame> {
    let (width, height) = (decoded.width(), decoded.height());
    if width == 0 || height == 0 {
        return None;
    }
    if is_high_depth(decoded.color()) {
        Frame::new(width, height, 16, decoded.to_luma16().into_raw())
    } else {
        let pixels = decoded.to_luma8().into_raw().into_iter().map(u16::from).collect();
        Frame::new(width, height, 8, pixels)
    }
}

fn is_high_depth(color: ColorType) -> bool {
    matches!(
        color,
        ColorType::L16
            | ColorType::La16
            | ColorType::Rgb16
            | ColorType::Rgba16
            | ColorType::Rgb32F
            | ColorType::Rgba32F
    )
}

/// Image files directly inside `dir`, sorted by name
pub fn list_images(dir: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot list images in {}: {}", dir.display(), e);
            return Vec::new();
        }
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .filter_map(|path| path.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .collect();
    names.sort();
    names
}
