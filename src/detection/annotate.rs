use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::models::Quad;

/// Draw the closed outline of `quad` onto a copy of `image`.
///
/// Thick outlines are built from parallel one-pixel segments offset
/// perpendicular to each edge.
pub fn draw_quad_outline(image: &RgbImage, quad: &Quad, color: [u8; 3], thickness: u32) -> RgbImage {
    let mut canvas = image.clone();
    let color = Rgb(color);
    let half = (thickness.max(1) as f32 - 1.0) / 2.0;
    let v = &quad.vertices;

    for i in 0..4 {
        let (x0, y0) = v[i].as_f32();
        let (x1, y1) = v[(i + 1) % 4].as_f32();
        let (dx, dy) = (x1 - x0, y1 - y0);
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            continue;
        }
        let (nx, ny) = (-dy / len, dx / len);

        let mut offset = -half;
        while offset <= half + f32::EPSILON {
            let (ox, oy) = (nx * offset, ny * offset);
            draw_line_segment_mut(&mut canvas, (x0 + ox, y0 + oy), (x1 + ox, y1 + oy), color);
            offset += 1.0;
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point2D;

    fn square() -> Quad {
        Quad::new([
            Point2D::new(10.0, 10.0),
            Point2D::new(50.0, 10.0),
            Point2D::new(50.0, 40.0),
            Point2D::new(10.0, 40.0),
        ])
    }

    #[test]
    fn outline_is_drawn_on_a_copy() {
        let original = RgbImage::new(64, 64);
        let annotated = draw_quad_outline(&original, &square(), [0, 255, 0], 3);

        assert!(original.pixels().all(|p| *p == Rgb([0, 0, 0])));
        assert_eq!(*annotated.get_pixel(30, 10), Rgb([0, 255, 0]));
        assert_eq!(*annotated.get_pixel(50, 25), Rgb([0, 255, 0]));
        assert_eq!(*annotated.get_pixel(30, 25), Rgb([0, 0, 0]));
    }

    #[test]
    fn thickness_spans_three_pixels() {
        let annotated = draw_quad_outline(&RgbImage::new(64, 64), &square(), [0, 255, 0], 3);
        let painted: Vec<u32> = (5..16)
            .filter(|&y| *annotated.get_pixel(30, y) == Rgb([0, 255, 0]))
            .collect();
        assert_eq!(painted, vec![9, 10, 11]);
    }
}
