use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, warp_into};
use tracing::{debug, instrument};

use crate::detection::homography::Homography;
use crate::error::{DetectError, Result};
use crate::models::{OrderedRect, Point2D, polygon_area};

/// Top-down crop of the detected document.
#[derive(Debug, Clone)]
pub struct Rectified {
    pub image: RgbImage,
    pub homography: Homography,
}

/// Output width and height: the longer of each pair of opposite sides,
/// rounded up to whole pixels.
pub fn output_size(rect: &OrderedRect) -> Result<(u32, u32)> {
    let width = rect
        .bottom_right
        .distance(&rect.bottom_left)
        .max(rect.top_right.distance(&rect.top_left))
        .ceil();
    let height = rect
        .top_right
        .distance(&rect.bottom_right)
        .max(rect.top_left.distance(&rect.bottom_left))
        .ceil();

    if !(width >= 1.0 && height >= 1.0) || width > u32::MAX as f64 || height > u32::MAX as f64 {
        return Err(DetectError::DegenerateGeometry(format!(
            "output size {width}x{height} is not a usable raster"
        )));
    }
    Ok((width as u32, height as u32))
}

/// Destination corners for an output of the given size, in TL, TR, BR, BL order.
pub fn destination_corners(width: u32, height: u32) -> [Point2D; 4] {
    let right = width as f64 - 1.0;
    let bottom = height as f64 - 1.0;
    [
        Point2D::new(0.0, 0.0),
        Point2D::new(right, 0.0),
        Point2D::new(right, bottom),
        Point2D::new(0.0, bottom),
    ]
}

/// Warp the region bounded by `rect` into an axis-aligned image.
///
/// Each output pixel is mapped back into `source` and bilinearly sampled;
/// samples falling outside the source get `background`.
#[instrument(skip(source, rect), fields(src_width = source.width(), src_height = source.height()))]
pub fn rectify(source: &RgbImage, rect: &OrderedRect, background: [u8; 3]) -> Result<Rectified> {
    if polygon_area(&rect.corners()) < 1e-9 {
        return Err(DetectError::DegenerateGeometry(
            "corners enclose no area".to_string(),
        ));
    }

    let (width, height) = output_size(rect)?;
    let homography =
        Homography::from_correspondences(&rect.corners(), &destination_corners(width, height))?;

    let mut image = RgbImage::new(width, height);
    warp_into(source, homography.projection(), Interpolation::Bilinear, Rgb(background), &mut image);

    debug!(width, height, "rectified");
    Ok(Rectified { image, homography })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(corners: [(f64, f64); 4]) -> OrderedRect {
        let [tl, tr, br, bl] = corners.map(Point2D::from);
        OrderedRect {
            top_left: tl,
            top_right: tr,
            bottom_right: br,
            bottom_left: bl,
        }
    }

    fn assert_near(actual: &Rgb<u8>, expected: [u8; 3]) {
        for (a, e) in actual.0.iter().zip(expected.iter()) {
            assert!(a.abs_diff(*e) <= 1, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn size_uses_longest_sides_rounded_up() {
        let r = rect([(0.0, 0.0), (100.5, 0.0), (98.0, 40.2), (2.0, 39.0)]);
        assert_eq!(output_size(&r).unwrap(), (101, 41));
    }

    #[test]
    fn horizontally_collinear_corners_fail() {
        let r = rect([(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0)]);
        let src = RgbImage::new(40, 40);
        let err = rectify(&src, &r, [0, 0, 0]).unwrap_err();
        assert!(matches!(err, DetectError::DegenerateGeometry(_)));
    }

    #[test]
    fn diagonally_collinear_corners_fail() {
        let r = rect([(0.0, 0.0), (10.0, 10.0), (20.0, 20.0), (30.0, 30.0)]);
        let src = RgbImage::new(40, 40);
        let err = rectify(&src, &r, [0, 0, 0]).unwrap_err();
        assert!(matches!(err, DetectError::DegenerateGeometry(_)));
    }

    #[test]
    fn coincident_corners_have_no_size() {
        let r = rect([(5.0, 5.0); 4]);
        assert!(matches!(output_size(&r), Err(DetectError::DegenerateGeometry(_))));
    }

    #[test]
    fn axis_aligned_crop_copies_pixels() {
        let src = RgbImage::from_fn(60, 40, |x, y| {
            if (10..=49).contains(&x) && (5..=24).contains(&y) {
                Rgb([200, 100, 50])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let r = rect([(10.0, 5.0), (49.0, 5.0), (49.0, 24.0), (10.0, 24.0)]);
        let out = rectify(&src, &r, [0, 0, 0]).unwrap();

        assert_eq!(out.image.dimensions(), (39, 19));
        assert_near(out.image.get_pixel(1, 1), [200, 100, 50]);
        assert_near(out.image.get_pixel(20, 10), [200, 100, 50]);
    }

    #[test]
    fn samples_outside_the_source_use_background() {
        let src = RgbImage::from_pixel(20, 20, Rgb([255, 255, 255]));
        let r = rect([(-30.0, -30.0), (10.0, -30.0), (10.0, 10.0), (-30.0, 10.0)]);
        let out = rectify(&src, &r, [1, 2, 3]).unwrap();

        assert_eq!(*out.image.get_pixel(2, 2), Rgb([1, 2, 3]));
        assert_near(out.image.get_pixel(36, 36), [255, 255, 255]);
    }
}
