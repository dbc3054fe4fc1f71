//! Synthetic frames and payloads shared by the unit tests.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use std::io::Cursor;

/// A frame filled with one colour.
pub(crate) fn solid_frame(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(rgb))
}

/// A black frame with a white `side` x `side` square whose top-left corner is at (`x0`, `y0`).
pub(crate) fn square_frame(width: u32, height: u32, x0: u32, y0: u32, side: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if x >= x0 && x < x0 + side && y >= y0 && y < y0 + side {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    })
}

/// A binary mask with a filled `w` x `h` rectangle of 255 at (`x0`, `y0`).
pub(crate) fn rect_mask(width: u32, height: u32, x0: u32, y0: u32, w: u32, h: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        if x >= x0 && x < x0 + w && y >= y0 && y < y0 + h {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Encodes a frame as PNG and wraps it the way a browser canvas would.
pub(crate) fn data_url(frame: &RgbImage) -> String {
    let mut bytes = Cursor::new(Vec::new());
    frame
        .write_to(&mut bytes, ImageFormat::Png)
        .expect("Error encoding frame.");
    format!("data:image/png;base64,{}", STANDARD.encode(bytes.into_inner()))
}
