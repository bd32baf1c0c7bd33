use std::path::Path;

use image::{DynamicImage, ImageReader};
use tracing::debug;

use crate::error::{DetectError, Result};

/// Read and decode an image, guessing the format from its contents.
pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    let img = ImageReader::open(path)
        .map_err(|e| DetectError::InvalidImage(format!("cannot open {}: {}", path.display(), e)))?
        .with_guessed_format()
        .map_err(|e| DetectError::InvalidImage(format!("cannot read {}: {}", path.display(), e)))?
        .decode()
        .map_err(|e| {
            DetectError::InvalidImage(format!("failed to decode {}: {}", path.display(), e))
        })?;

    if img.width() == 0 || img.height() == 0 {
        return Err(DetectError::InvalidImage(format!(
            "{} has no pixels",
            path.display()
        )));
    }

    debug!(path = %path.display(), width = img.width(), height = img.height(), "image loaded");
    Ok(img)
}

/// Encode `img` in the format implied by the file extension.
pub fn save_image(path: impl AsRef<Path>, img: &DynamicImage) -> Result<()> {
    let path = path.as_ref();
    let write_error = |reason: String| DetectError::WriteError {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
    }
    img.save(path).map_err(|e| write_error(e.to_string()))?;

    debug!(path = %path.display(), "image saved");
    Ok(())
}
