// THEORY:
// The preprocessor turns a decoded colour frame into the one thing the motion
// detector compares: a smoothed, single-channel intensity buffer.
//
// 1.  **Bounding resize**: frames larger than `max_dimension` on their longer side
//     are scaled down uniformly. This caps per-frame cost and also keeps the
//     absolute area thresholds meaningful, since they are tuned for ~640px frames.
// 2.  **Grayscale**: colour is irrelevant to temporal differencing; luma is enough.
//     The weights are Rec.601 in 14-bit fixed point, the same weighting the delta
//     threshold was tuned against.
// 3.  **Gaussian smoothing**: a wide (21x21) separable blur washes out single-pixel
//     sensor noise so that it never survives the delta threshold. Both passes run
//     in `f32` and the result is rounded once, so a flat frame stays exactly flat.

use crate::config::MotionConfig;
use crate::core_modules::decoder::{DecodeError, PixelBuffer};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Rgb};
use imageproc::filter::separable_filter_equal;
use imageproc::map::map_colors;

/// Single-channel, eight-bit intensity grid compared between frames.
pub type IntensityBuffer = GrayImage;

/// Returns the downscaled dimensions for a frame, or `None` if it already fits.
pub fn bounded_dimensions(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    let longer = width.max(height);
    if longer <= max_dimension {
        return None;
    }

    let scale = max_dimension as f64 / longer as f64;
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    Some((scaled(width), scaled(height)))
}

/// Rec.601 luma, rounded to the nearest level.
pub fn rec601_luma(Rgb([r, g, b]): Rgb<u8>) -> u8 {
    let weighted = r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868;
    ((weighted + (1 << 13)) >> 14) as u8
}

/// Sigma used when a Gaussian kernel is specified by size alone.
pub fn sigma_for_kernel(kernel_size: u32) -> f64 {
    0.3 * ((kernel_size as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Builds a normalized 1D Gaussian kernel of `kernel_size` taps.
pub fn gaussian_kernel(kernel_size: u32) -> Vec<f32> {
    let sigma = sigma_for_kernel(kernel_size);
    let center = (kernel_size / 2) as f64;
    let weights: Vec<f64> = (0..kernel_size)
        .map(|i| {
            let d = i as f64 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();

    weights.into_iter().map(|w| (w / total) as f32).collect()
}

/// Resizes, converts and smooths a frame into an intensity buffer.
pub fn prepare(img: &PixelBuffer, config: &MotionConfig) -> Result<IntensityBuffer, DecodeError> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage);
    }

    let resized;
    let frame = match bounded_dimensions(width, height, config.max_dimension) {
        Some((w, h)) => {
            resized = imageops::resize(img, w, h, FilterType::Triangle);
            &resized
        }
        None => img,
    };

    let luma = map_colors(frame, |p| Luma([rec601_luma(p) as f32]));
    let blurred = separable_filter_equal(&luma, &gaussian_kernel(config.blur_kernel_size));
    Ok(map_colors(&blurred, |p: Luma<f32>| Luma([p[0].round().clamp(0.0, 255.0) as u8])))
}
