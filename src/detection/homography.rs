use imageproc::geometric_transformations::Projection;

use crate::error::{DetectError, Result};
use crate::models::Point2D;

/// Planar projective transform from source-image pixels to output pixels.
#[derive(Debug, Clone, Copy)]
pub struct Homography {
    projection: Projection,
}

impl Homography {
    /// Solve the transform that maps each `src[i]` onto `dst[i]`.
    ///
    /// Fails with [`DetectError::DegenerateGeometry`] when the four pairs do
    /// not determine an invertible transform, e.g. the source points are
    /// collinear.
    pub fn from_correspondences(src: &[Point2D; 4], dst: &[Point2D; 4]) -> Result<Self> {
        let from = src.map(|p| p.as_f32());
        let to = dst.map(|p| p.as_f32());

        let projection = Projection::from_control_points(from, to).ok_or_else(|| {
            DetectError::DegenerateGeometry(
                "point correspondences do not determine a homography".to_string(),
            )
        })?;
        Ok(Self { projection })
    }

    /// Map a point through the transform.
    pub fn apply(&self, p: &Point2D) -> Point2D {
        let (x, y) = self.projection * p.as_f32();
        Point2D::new(x as f64, y as f64)
    }

    /// The `imageproc` transform used for warping.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }
}
