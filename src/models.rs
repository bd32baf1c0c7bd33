use imageproc::geometry::{arc_length, contour_area, oriented_contour_area};
use imageproc::point::Point;

use crate::error::DetectError;

/// A point in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn as_f32(&self) -> (f32, f32) {
        (self.x as f32, self.y as f32)
    }
}

impl From<Point2D> for Point<f64> {
    fn from(p: Point2D) -> Self {
        Point::new(p.x, p.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A traced closed boundary. The last point connects back to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    points: Vec<Point2D>,
}

impl Contour {
    /// Returns `None` for fewer than 3 points, which cannot enclose an area.
    pub fn new(points: Vec<Point2D>) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        Some(Self { points })
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// Absolute shoelace area of the closed curve, in squared pixels.
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }

    /// Length of the closed curve, including the closing segment.
    pub fn perimeter(&self) -> f64 {
        arc_length(&to_points(&self.points), true)
    }
}

fn to_points(points: &[Point2D]) -> Vec<Point<f64>> {
    points.iter().copied().map(Point::from).collect()
}

/// Signed shoelace area; positive when the points run clockwise in
/// y-down image coordinates.
pub fn signed_area(points: &[Point2D]) -> f64 {
    oriented_contour_area(&to_points(points))
}

pub fn polygon_area(points: &[Point2D]) -> f64 {
    contour_area(&to_points(points))
}

/// A simplified contour with exactly four vertices, in the winding order of
/// the contour it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub vertices: [Point2D; 4],
}

impl Quad {
    pub fn new(vertices: [Point2D; 4]) -> Self {
        Self { vertices }
    }
}

impl TryFrom<Vec<Point2D>> for Quad {
    type Error = usize;

    /// Fails with the actual vertex count when it is not 4.
    fn try_from(points: Vec<Point2D>) -> Result<Self, Self::Error> {
        let count = points.len();
        let vertices: [Point2D; 4] = points.try_into().map_err(|_| count)?;
        Ok(Self { vertices })
    }
}

/// Quad corners bound to their roles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedRect {
    pub top_left: Point2D,
    pub top_right: Point2D,
    pub bottom_right: Point2D,
    pub bottom_left: Point2D,
}

impl OrderedRect {
    /// Picks the corners out of `quad` by vertex index, rejecting any
    /// assignment that reuses a vertex.
    pub fn from_indices(quad: &Quad, [tl, tr, br, bl]: [usize; 4]) -> Result<Self, DetectError> {
        let mut seen = [false; 4];
        for idx in [tl, tr, br, bl] {
            if idx >= 4 || seen[idx] {
                return Err(DetectError::DegenerateQuad(format!(
                    "corner roles are not a permutation of the vertices (tl={tl}, tr={tr}, br={br}, bl={bl})"
                )));
            }
            seen[idx] = true;
        }
        let v = &quad.vertices;
        Ok(Self {
            top_left: v[tl],
            top_right: v[tr],
            bottom_right: v[br],
            bottom_left: v[bl],
        })
    }

    /// Corners in TL, TR, BR, BL order.
    pub fn corners(&self) -> [Point2D; 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point2D> {
        raw.iter().copied().map(Point2D::from).collect()
    }

    #[test]
    fn contour_rejects_fewer_than_three_points() {
        assert!(Contour::new(pts(&[(0.0, 0.0), (1.0, 1.0)])).is_none());
        assert!(Contour::new(pts(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)])).is_some());
    }

    #[test]
    fn contour_area_and_perimeter_of_rectangle() {
        let c = Contour::new(pts(&[(0.0, 0.0), (40.0, 0.0), (40.0, 25.0), (0.0, 25.0)])).unwrap();
        assert_eq!(c.area(), 1000.0);
        assert_eq!(c.perimeter(), 130.0);
    }

    #[test]
    fn signed_area_is_positive_for_clockwise_on_screen() {
        let cw = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let mut ccw = cw.clone();
        ccw.reverse();
        assert!(signed_area(&cw) > 0.0);
        assert!(signed_area(&ccw) < 0.0);
    }

    #[test]
    fn quad_try_from_reports_vertex_count() {
        let five = pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 1.0), (1.0, 2.0), (0.0, 1.0)]);
        assert_eq!(Quad::try_from(five), Err(5));
    }

    #[test]
    fn ordered_rect_rejects_duplicate_roles() {
        let quad = Quad::new([
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.0, 1.0),
        ]);
        let err = OrderedRect::from_indices(&quad, [0, 1, 1, 3]).unwrap_err();
        assert!(matches!(err, DetectError::DegenerateQuad(_)));
    }
}
