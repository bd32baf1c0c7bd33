use cardscan::{ArtifactKind, ArtifactSink, Result};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Solid white axis-aligned rectangle on a black background.
pub fn white_rectangle(
    canvas_w: u32,
    canvas_h: u32,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> DynamicImage {
    let img = RgbImage::from_fn(canvas_w, canvas_h, |px, py| {
        if (x..x + width).contains(&px) && (y..y + height).contains(&py) {
            Rgb([255u8, 255, 255])
        } else {
            Rgb([0u8, 0, 0])
        }
    });
    DynamicImage::ImageRgb8(img)
}

/// Filled light quadrilateral on a dark background, as a card photographed
/// at an angle would look.
pub fn skewed_card(canvas_w: u32, canvas_h: u32, corners: [(i32, i32); 4]) -> DynamicImage {
    let mut img = RgbImage::from_pixel(canvas_w, canvas_h, Rgb([20u8, 20, 30]));
    let poly: Vec<Point<i32>> = corners.iter().map(|&(x, y)| Point::new(x, y)).collect();
    draw_polygon_mut(&mut img, &poly, Rgb([235u8, 230, 220]));
    DynamicImage::ImageRgb8(img)
}

/// Saves `img` as a PNG temp file.
/// The file will be automatically cleaned up when dropped.
pub fn save_temp_png(img: &DynamicImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// Remembers which artifacts were reported, in order.
#[derive(Default)]
pub struct RecordingSink {
    pub saved: Mutex<Vec<(ArtifactKind, u32, u32)>>,
}

impl RecordingSink {
    pub fn kinds(&self) -> Vec<ArtifactKind> {
        self.saved.lock().unwrap().iter().map(|(k, _, _)| *k).collect()
    }
}

impl ArtifactSink for RecordingSink {
    fn save(&self, kind: ArtifactKind, image: &DynamicImage) -> Result<()> {
        self.saved
            .lock()
            .unwrap()
            .push((kind, image.width(), image.height()));
        Ok(())
    }
}
