pub mod annotate;
pub mod contours;
pub mod corners;
pub mod homography;
pub mod preprocessing;
pub mod quad;
pub mod rectify;

use image::{DynamicImage, GrayImage, RgbImage};
use tracing::{info, instrument};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{OrderedRect, Quad};
use crate::pipeline::{ArtifactKind, ArtifactSink};
use homography::Homography;

/// Everything one detection run produced.
#[derive(Debug, Clone)]
pub struct Detection {
    pub edges: GrayImage,
    pub quad: Quad,
    /// Area of the contour the quad was simplified from.
    pub contour_area: f64,
    pub corners: OrderedRect,
    pub homography: Homography,
    pub annotated: RgbImage,
    pub rectified: RgbImage,
}

/// Finds a card-like quadrilateral in a photo and unwarps it.
#[derive(Debug, Clone, Default)]
pub struct CardDetector {
    config: PipelineConfig,
}

impl CardDetector {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline on an image.
    ///
    /// Stage images are handed to `sink` as soon as the stage producing them
    /// succeeds: the edge map right after edge extraction, the annotated image
    /// once a quad is selected, the rectified crop last. A failure in a later
    /// stage therefore never reaches the sink with a partial result.
    #[instrument(skip_all, fields(width = img.width(), height = img.height()))]
    pub fn detect(&self, img: &DynamicImage, sink: &dyn ArtifactSink) -> Result<Detection> {
        let cfg = &self.config;
        cfg.validate()?;

        // Step 1: Preprocess image
        let gray = preprocessing::to_grayscale(img)?;
        sink.save(ArtifactKind::Grayscale, &DynamicImage::ImageLuma8(gray.clone()))?;
        let blurred = preprocessing::apply_blur(&gray, cfg.blur_sigma);
        sink.save(ArtifactKind::Blurred, &DynamicImage::ImageLuma8(blurred.clone()))?;

        // Step 2: Detect edges
        let edges = preprocessing::detect_edges(&blurred, cfg.canny_low, cfg.canny_high);
        sink.save(ArtifactKind::EdgeMap, &DynamicImage::ImageLuma8(edges.clone()))?;

        // Step 3: Find contours
        let contours = contours::find_external_contours(&edges);
        info!(contours = contours.len(), "external contours traced");

        // Step 4: Pick the quadrilateral
        let selected = quad::select_quad(&contours, cfg.min_contour_area, cfg.approx_epsilon_ratio)?;
        info!(
            area = selected.contour_area,
            index = selected.contour_index,
            "card contour detected"
        );

        let original = img.to_rgb8();
        let annotated = annotate::draw_quad_outline(
            &original,
            &selected.quad,
            cfg.outline_color,
            cfg.outline_thickness,
        );
        sink.save(ArtifactKind::Annotated, &DynamicImage::ImageRgb8(annotated.clone()))?;

        // Step 5: Assign corner roles
        let corners = corners::order_corners(&selected.quad)?;

        // Step 6: Unwarp
        let rectified = rectify::rectify(&original, &corners, cfg.background)?;
        info!(
            width = rectified.image.width(),
            height = rectified.image.height(),
            "perspective corrected"
        );
        sink.save(ArtifactKind::Rectified, &DynamicImage::ImageRgb8(rectified.image.clone()))?;

        Ok(Detection {
            edges,
            quad: selected.quad,
            contour_area: selected.contour_area,
            corners,
            homography: rectified.homography,
            annotated,
            rectified: rectified.image,
        })
    }
}
