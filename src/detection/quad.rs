use tracing::{debug, instrument};

use crate::error::{DetectError, Result};
use crate::models::{Contour, Point2D, Quad};

/// The contour that won quad selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedQuad {
    pub quad: Quad,
    /// Area of the source contour (not of the simplified quad).
    pub contour_area: f64,
    /// Position of the source contour in the traced set.
    pub contour_index: usize,
}

/// Pick the largest contour that simplifies to exactly four vertices.
///
/// Contours are ranked by area with a stable sort, so equal areas keep their
/// tracing order. Contours below `min_area` are noise and never considered.
#[instrument(skip(contours), fields(count = contours.len()))]
pub fn select_quad(contours: &[Contour], min_area: f64, epsilon_ratio: f64) -> Result<SelectedQuad> {
    let mut ranked: Vec<(usize, f64)> = contours
        .iter()
        .enumerate()
        .map(|(i, c)| (i, c.area()))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut candidates = 0;
    for (index, area) in ranked {
        // Sorted descending: everything after this is smaller too.
        if area < min_area {
            break;
        }
        candidates += 1;

        let contour = &contours[index];
        let epsilon = epsilon_ratio * contour.perimeter();
        let polygon = approximate_polygon(contour.points(), epsilon);

        match Quad::try_from(polygon) {
            Ok(quad) => {
                debug!(index, area, epsilon, "selected 4-vertex contour");
                return Ok(SelectedQuad {
                    quad,
                    contour_area: area,
                    contour_index: index,
                });
            }
            Err(vertices) => debug!(index, area, vertices, "contour is not a quadrilateral"),
        }
    }

    Err(DetectError::NoQuadFound { candidates })
}

/// Simplify a closed curve with the Douglas-Peucker algorithm.
///
/// The curve is split at two far-apart anchor points and each half is reduced
/// independently; a last pass removes vertices lying within `epsilon` of the
/// line through their neighbours. The output keeps the input's winding order.
pub fn approximate_polygon(points: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    let n = points.len();
    if n <= 3 {
        return points.to_vec();
    }

    let first = farthest_from(points, 0);
    let second = farthest_from(points, first);
    if first == second {
        // every point coincides
        return vec![points[0]];
    }

    let mut keep = vec![false; n];
    keep[first] = true;
    keep[second] = true;
    simplify_chain(points, first, second, epsilon, &mut keep);
    simplify_chain(points, second, first, epsilon, &mut keep);

    let mut polygon: Vec<Point2D> = (0..n)
        .map(|k| (first + k) % n)
        .filter(|&i| keep[i])
        .map(|i| points[i])
        .collect();
    remove_flat_vertices(&mut polygon, epsilon);
    polygon
}

fn farthest_from(points: &[Point2D], origin: usize) -> usize {
    let anchor = points[origin];
    let mut best = origin;
    let mut best_dist = 0.0;
    for (i, p) in points.iter().enumerate() {
        let d = p.distance(&anchor);
        if d > best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

/// Marks the vertices to keep on the cyclic chain running from `start` to
/// `end`. Uses an explicit work stack instead of recursion.
fn simplify_chain(points: &[Point2D], start: usize, end: usize, epsilon: f64, keep: &mut [bool]) {
    let n = points.len();
    let mut stack = vec![(start, end)];

    while let Some((s, e)) = stack.pop() {
        let span = (e + n - s) % n;
        if span < 2 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_index = s;
        for k in 1..span {
            let i = (s + k) % n;
            let d = distance_to_line(&points[i], &points[s], &points[e]);
            if d > max_dist {
                max_dist = d;
                max_index = i;
            }
        }

        if max_dist > epsilon {
            keep[max_index] = true;
            stack.push((s, max_index));
            stack.push((max_index, e));
        }
    }
}

fn remove_flat_vertices(polygon: &mut Vec<Point2D>, epsilon: f64) {
    while polygon.len() > 3 {
        let n = polygon.len();
        let flat = (0..n).find(|&i| {
            let prev = polygon[(i + n - 1) % n];
            let next = polygon[(i + 1) % n];
            distance_to_line(&polygon[i], &prev, &next) <= epsilon
        });
        match flat {
            Some(i) => {
                polygon.remove(i);
            }
            None => break,
        }
    }
}

/// Perpendicular distance from `p` to the line through `a` and `b`, or the
/// distance to `a` when the two coincide.
fn distance_to_line(p: &Point2D, a: &Point2D, b: &Point2D) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-12 {
        return p.distance(a);
    }
    ((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / len
}
