// THEORY:
// The `motion_detector` is the engine of the pipeline. It compares two intensity
// buffers of the same size and answers three questions: did anything move, how
// much, and where.
//
// Algorithm steps:
// 1.  **Change mask**: absolute per-pixel difference between the buffers, then a
//     binary threshold. Anything above `delta_threshold` is "changed" (255).
// 2.  **Dilation**: a few passes of a 3x3 square dilation. The edges of a moving
//     object are jagged and noisy after thresholding; without this step a single
//     object shatters into many tiny contours.
// 3.  **Region extraction**: outer borders of the mask are traced and only the
//     outermost ones are kept. Each becomes a `Region` with an enclosed area and a
//     centroid.
// 4.  **Summary**: regions below `min_region_area` are noise. The rest add their area
//     to the motion score, and their centroids are folded into one point with a
//     running pairwise average. Regions are visited bottom-up, the reverse of the
//     raster order in which their borders are first met. That average is not
//     area-weighted and later regions pull harder; direction classification
//     downstream is tuned against exactly this estimator.
// 5.  **Stateless utility**: the detector never sees more than the two buffers it is
//     handed. Remembering the previous frame is the session's job.

use crate::config::MotionConfig;
use crate::core_modules::preprocessor::IntensityBuffer;
use crate::core_modules::region::{Centroid, Region};
use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, find_contours};
use imageproc::distance_transform::Norm;
use imageproc::morphology::dilate;
use tracing::debug;

/// Coarse amount of motion in one frame comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionLevel {
    None,
    Small,
    Large,
}

impl MotionLevel {
    pub fn from_score(score: u64, config: &MotionConfig) -> Self {
        if score < config.small_motion_score {
            MotionLevel::None
        } else if score < config.large_motion_score {
            MotionLevel::Small
        } else {
            MotionLevel::Large
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MotionLevel::None => "No significant movement",
            MotionLevel::Small => "Small movement detected",
            MotionLevel::Large => "Large movement detected",
        }
    }
}

/// The detector's verdict for one pair of frames.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionSummary {
    /// Total enclosed area of all regions that survived the noise filter, rounded.
    pub score: u64,
    pub level: MotionLevel,
    /// Merged centre of the surviving regions.
    pub centroid: Option<Centroid>,
}

/// Marks every pixel whose intensity moved by more than `threshold` between frames.
pub fn change_mask(prev: &IntensityBuffer, cur: &IntensityBuffer, threshold: u8) -> GrayImage {
    debug_assert_eq!(prev.dimensions(), cur.dimensions());

    let (width, height) = cur.dimensions();
    let mut mask = GrayImage::new(width, height);
    for ((out, p), c) in mask.pixels_mut().zip(prev.pixels()).zip(cur.pixels()) {
        let delta = p[0].abs_diff(c[0]);
        *out = Luma([if delta > threshold { 255 } else { 0 }]);
    }
    mask
}

/// Grows changed areas by one pixel in every direction per iteration.
pub fn dilate_mask(mask: &GrayImage, iterations: u32) -> GrayImage {
    let mut grown = mask.clone();
    for _ in 0..iterations {
        grown = dilate(&grown, Norm::LInf, 1);
    }
    grown
}

/// Traces the outermost borders of the mask.
///
/// Regions come back in reverse raster order of their first pixel: the border met
/// last by a top-to-bottom scan is first in the list.
pub fn extract_regions(mask: &GrayImage) -> Vec<Region> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|contour| matches!(contour.border_type, BorderType::Outer) && contour.parent.is_none())
        .rev()
        .map(|contour| Region::from_contour(&contour.points))
        .collect()
}

/// Applies the noise filter, scores the surviving area and merges their centroids.
pub fn summarize(regions: &[Region], config: &MotionConfig) -> MotionSummary {
    let mut motion_area = 0.0;
    let mut merged: Option<Centroid> = None;

    for region in regions.iter().filter(|r| r.area >= config.min_region_area) {
        motion_area += region.area;

        if let Some(c) = region.centroid {
            merged = Some(match merged {
                Some(m) => m.merge(c),
                None => c,
            });
        }
    }

    let score = motion_area.round() as u64;
    MotionSummary {
        score,
        level: MotionLevel::from_score(score, config),
        centroid: merged,
    }
}

/// Runs the full comparison between the previous and current intensity buffers.
pub fn detect(prev: &IntensityBuffer, cur: &IntensityBuffer, config: &MotionConfig) -> MotionSummary {
    let mask = change_mask(prev, cur, config.delta_threshold);
    let mask = dilate_mask(&mask, config.dilate_iterations);
    let regions = extract_regions(&mask);
    let summary = summarize(&regions, config);

    debug!(
        regions = regions.len(),
        score = summary.score,
        centroid = ?summary.centroid,
        "compared frames"
    );

    summary
}
