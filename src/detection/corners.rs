use tracing::debug;

use crate::error::{DetectError, Result};
use crate::models::{OrderedRect, Point2D, Quad};

/// Assign the quad's vertices to top-left, top-right, bottom-right and
/// bottom-left, whatever their original order or winding.
///
/// The top-left corner has the smallest `x + y` and the bottom-right the
/// largest; the top-right corner has the smallest `y - x` and the bottom-left
/// the largest. Ties go to the first vertex found. The result is rejected
/// with [`DetectError::DegenerateQuad`] when two roles land on the same vertex
/// or when the ordered corners do not form a convex clockwise outline, which
/// is what happens for quads rotated close to 45 degrees.
pub fn order_corners(quad: &Quad) -> Result<OrderedRect> {
    let v = &quad.vertices;
    let sum = |p: &Point2D| p.x + p.y;
    let diff = |p: &Point2D| p.y - p.x;

    let top_left = arg_extreme(v, sum, Extreme::Min);
    let bottom_right = arg_extreme(v, sum, Extreme::Max);
    let top_right = arg_extreme(v, diff, Extreme::Min);
    let bottom_left = arg_extreme(v, diff, Extreme::Max);

    let rect = OrderedRect::from_indices(quad, [top_left, top_right, bottom_right, bottom_left])?;
    ensure_convex_clockwise(&rect)?;

    debug!(?rect, "corners ordered");
    Ok(rect)
}

#[derive(Clone, Copy)]
enum Extreme {
    Min,
    Max,
}

fn arg_extreme(vertices: &[Point2D; 4], key: impl Fn(&Point2D) -> f64, extreme: Extreme) -> usize {
    let mut best = 0;
    for i in 1..vertices.len() {
        let better = match extreme {
            Extreme::Min => key(&vertices[i]) < key(&vertices[best]),
            Extreme::Max => key(&vertices[i]) > key(&vertices[best]),
        };
        if better {
            best = i;
        }
    }
    best
}

/// In y-down image coordinates TL -> TR -> BR -> BL turns clockwise, so every
/// corner's cross product must be strictly positive.
fn ensure_convex_clockwise(rect: &OrderedRect) -> Result<()> {
    let c = rect.corners();
    for i in 0..4 {
        let a = c[i];
        let b = c[(i + 1) % 4];
        let d = c[(i + 2) % 4];
        let cross = (b.x - a.x) * (d.y - b.y) - (b.y - a.y) * (d.x - b.x);
        if cross <= 0.0 {
            return Err(DetectError::DegenerateQuad(format!(
                "ordered corners are not a convex clockwise outline (turn at {:?} has cross product {})",
                b, cross
            )));
        }
    }
    Ok(())
}
