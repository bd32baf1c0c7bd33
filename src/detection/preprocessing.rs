use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use tracing::instrument;

use crate::error::{DetectError, Result};

/// Convert image to single-channel luminance
pub fn to_grayscale(img: &DynamicImage) -> Result<GrayImage> {
    if img.width() == 0 || img.height() == 0 {
        return Err(DetectError::InvalidImage(format!(
            "empty raster ({}x{})",
            img.width(),
            img.height()
        )));
    }
    Ok(img.to_luma8())
}

/// Apply Gaussian blur to reduce noise
pub fn apply_blur(img: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(img, sigma)
}

/// Detect edges using Canny edge detector.
///
/// Output pixels are either 0 or 255.
#[instrument(skip(img), fields(width = img.width(), height = img.height()))]
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}
