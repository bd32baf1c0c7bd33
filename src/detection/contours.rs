use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::point::Point;
use tracing::debug;

use crate::models::{Contour, Point2D};

/// Trace the external boundaries of the white regions in a binary edge map.
///
/// Uses Suzuki-Abe border following and keeps only outer borders that are
/// not nested inside another region. Contours come back in raster order of
/// their first border pixel (top to bottom, left to right), and each one is
/// reduced to the endpoints of its straight runs.
pub fn find_external_contours(edges: &GrayImage) -> Vec<Contour> {
    let borders = find_contours::<i32>(edges);
    let total = borders.len();

    let contours: Vec<Contour> = borders
        .into_iter()
        .filter(|b| b.border_type == BorderType::Outer && b.parent.is_none())
        .filter_map(|b| Contour::new(compress_runs(&b.points)))
        .collect();

    debug!(borders = total, external = contours.len(), "boundary tracing complete");
    contours
}

/// Drop every point that continues the step direction of the point before it,
/// leaving only the endpoints of horizontal, vertical and diagonal runs.
///
/// The input is a closed 8-connected chain.
pub fn compress_runs(chain: &[Point<i32>]) -> Vec<Point2D> {
    let n = chain.len();
    let step = |from: Point<i32>, to: Point<i32>| ((to.x - from.x).signum(), (to.y - from.y).signum());

    (0..n)
        .filter(|&i| {
            let prev = chain[(i + n - 1) % n];
            let here = chain[i];
            let next = chain[(i + 1) % n];
            step(prev, here) != step(here, next)
        })
        .map(|i| Point2D::new(chain[i].x as f64, chain[i].y as f64))
        .collect()
}
