// THEORY:
// The decoder is the front door of the pipeline. Frames arrive the way a browser
// produces them from a canvas: a data URL of the form
// `data:image/jpeg;base64,<payload>`. The header is only a label; the bytes are
// sniffed by the `image` crate, so a PNG mislabelled as JPEG still decodes.
//
// It is a pure function. Nothing here knows about previous frames.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbImage;
use thiserror::Error;

/// Raw three-channel, eight-bit pixel grid produced by the decoder.
pub type PixelBuffer = RgbImage;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload has no ',' between header and data")]
    MissingSeparator,
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not a supported image: {0}")]
    Image(#[from] image::ImageError),
    #[error("image has zero width or height")]
    EmptyImage,
}

/// Splits a data URL into its header and its encoded body.
pub fn split_data_url(payload: &str) -> Result<(&str, &str), DecodeError> {
    payload.split_once(',').ok_or(DecodeError::MissingSeparator)
}

/// Decodes a `<header>,<base64>` payload into an RGB pixel buffer.
pub fn decode(payload: &str) -> Result<PixelBuffer, DecodeError> {
    let (_header, encoded) = split_data_url(payload)?;
    let bytes = STANDARD.decode(encoded.trim())?;
    let img = image::load_from_memory(&bytes)?;

    if img.width() == 0 || img.height() == 0 {
        return Err(DecodeError::EmptyImage);
    }

    Ok(img.to_rgb8())
}
