use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DetectError, Result};

/// Tunable parameters of the detection pipeline.
///
/// Missing fields in a JSON file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Gaussian sigma for the smoothing step; 1.0 yields a 5-tap kernel.
    pub blur_sigma: f32,
    /// Hysteresis thresholds on the 0-255 gradient scale.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Contours enclosing less than this many squared pixels are noise.
    pub min_contour_area: f64,
    /// Simplification tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_ratio: f64,
    pub outline_color: [u8; 3],
    pub outline_thickness: u32,
    /// Fill for rectified pixels that map outside the source image.
    pub background: [u8; 3],
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.0,
            canny_low: 50.0,
            canny_high: 150.0,
            min_contour_area: 1000.0,
            approx_epsilon_ratio: 0.02,
            outline_color: [0, 255, 0],
            outline_thickness: 3,
            background: [0, 0, 0],
        }
    }
}

impl PipelineConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DetectError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| DetectError::InvalidConfig(format!("malformed JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DetectError::InvalidConfig(format!("cannot serialize: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.blur_sigma > 0.0) {
            return Err(DetectError::InvalidConfig(format!(
                "blur_sigma must be positive, got {}",
                self.blur_sigma
            )));
        }
        if !(self.canny_low >= 0.0) || self.canny_low > self.canny_high {
            return Err(DetectError::InvalidConfig(format!(
                "canny thresholds must satisfy 0 <= low <= high, got low={} high={}",
                self.canny_low, self.canny_high
            )));
        }
        if !(self.min_contour_area >= 0.0) {
            return Err(DetectError::InvalidConfig(format!(
                "min_contour_area must be non-negative, got {}",
                self.min_contour_area
            )));
        }
        if !(self.approx_epsilon_ratio > 0.0 && self.approx_epsilon_ratio < 1.0) {
            return Err(DetectError::InvalidConfig(format!(
                "approx_epsilon_ratio must be in (0, 1), got {}",
                self.approx_epsilon_ratio
            )));
        }
        if self.outline_thickness == 0 {
            return Err(DetectError::InvalidConfig(
                "outline_thickness must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
