// THEORY:
// Every number that decides what counts as "motion" lives here. The pipeline
// stages never hard-code a threshold; they read it from a `MotionConfig`, so each
// knob can be tuned or tested on its own without touching the algorithm.
//
// The defaults are tuned for frames whose longer side is about 640 pixels, which
// is exactly what the preprocessor bounds every frame to.

use thiserror::Error;

/// Longer-side cap applied before any analysis.
pub const MAX_DIMENSION: u32 = 640;
/// Side length of the square Gaussian kernel used to smooth sensor noise.
pub const BLUR_KERNEL_SIZE: u32 = 21;
/// Per-pixel intensity change that marks a pixel as "changed".
pub const DELTA_THRESHOLD: u8 = 25;
/// Passes of 3x3 dilation applied to the change mask.
pub const DILATE_ITERATIONS: u32 = 2;
/// Regions enclosing less area than this are treated as noise.
pub const MIN_REGION_AREA: f64 = 500.0;
/// Scores at or above this are "small" movement.
pub const SMALL_MOTION_SCORE: u64 = 1000;
/// Scores at or above this are "large" movement.
pub const LARGE_MOTION_SCORE: u64 = 5000;
/// Centroid shift (pixels) that must be exceeded before a direction is reported.
pub const DIRECTION_MARGIN: i32 = 15;

/// Configuration for the detection pipeline, allowing for tunable behavior.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionConfig {
    /// Frames whose longer side exceeds this are scaled down to it, preserving aspect ratio.
    pub max_dimension: u32,
    /// Gaussian kernel size; must be odd. Sigma is derived from it.
    pub blur_kernel_size: u32,
    /// A pixel is "changed" when the absolute intensity delta is strictly greater than this.
    pub delta_threshold: u8,
    /// Number of 3x3 dilation passes used to merge nearby fragments.
    pub dilate_iterations: u32,
    /// Minimum enclosed area for a region to contribute to the score.
    pub min_region_area: f64,
    /// Lower bound (inclusive) of the "small movement" band.
    pub small_motion_score: u64,
    /// Lower bound (inclusive) of the "large movement" band.
    pub large_motion_score: u64,
    /// Centroid shift that must be exceeded on an axis to report a direction on it.
    pub direction_margin: i32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
            blur_kernel_size: BLUR_KERNEL_SIZE,
            delta_threshold: DELTA_THRESHOLD,
            dilate_iterations: DILATE_ITERATIONS,
            min_region_area: MIN_REGION_AREA,
            small_motion_score: SMALL_MOTION_SCORE,
            large_motion_score: LARGE_MOTION_SCORE,
            direction_margin: DIRECTION_MARGIN,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("max_dimension must be positive")]
    ZeroMaxDimension,
    #[error("blur_kernel_size must be odd and positive, got {0}")]
    InvalidKernelSize(u32),
    #[error("small_motion_score ({small}) exceeds large_motion_score ({large})")]
    InvertedScoreBands { small: u64, large: u64 },
    #[error("min_region_area must be a non-negative number, got {0}")]
    InvalidRegionArea(f64),
    #[error("direction_margin must be non-negative, got {0}")]
    NegativeDirectionMargin(i32),
}

impl MotionConfig {
    /// Checks the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_dimension == 0 {
            return Err(ConfigError::ZeroMaxDimension);
        }
        if self.blur_kernel_size % 2 == 0 {
            return Err(ConfigError::InvalidKernelSize(self.blur_kernel_size));
        }
        if self.small_motion_score > self.large_motion_score {
            return Err(ConfigError::InvertedScoreBands {
                small: self.small_motion_score,
                large: self.large_motion_score,
            });
        }
        if self.min_region_area.is_nan() || self.min_region_area < 0.0 {
            return Err(ConfigError::InvalidRegionArea(self.min_region_area));
        }
        if self.direction_margin < 0 {
            return Err(ConfigError::NegativeDirectionMargin(self.direction_margin));
        }
        Ok(())
    }
}
