//! Decoding of source bytes into [`SourceImage`] rasters.
//!
//! The accepted input formats are JPEG, PNG, GIF and BMP. Decoding preserves
//! the source color mode (8-bit modes pass through, deeper modes are reduced)
//! so the compressor can see what it has to normalize; no EXIF orientation
//! correction is applied.
//!
//! This module also provides [`verify_jpeg`], the structural re-decode used
//! to check an encoded buffer after compression.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};
use thiserror::Error;

use crate::SourceImage;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The byte stream is not one of the accepted image formats.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image data is corrupted or incomplete.
    #[error("Corrupted or incomplete image data: {0}")]
    CorruptedFile(String),
}

/// Decode image bytes into a [`SourceImage`].
///
/// The format is sniffed from the content, not from a file name. Only JPEG,
/// PNG, GIF and BMP are accepted; anything else is `InvalidFormat`.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` for unrecognized or unaccepted
/// formats and `DecodeError::CorruptedFile` when the data fails to decode.
pub fn decode_image(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    match reader.format() {
        Some(ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Gif | ImageFormat::Bmp) => {}
        _ => return Err(DecodeError::InvalidFormat),
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    Ok(SourceImage::from_dynamic(img))
}

/// Verify that an encoded buffer is a structurally valid JPEG.
///
/// Performs a full re-decode of the buffer. This is a format-conformance
/// check, not a pixel comparison; it exists to catch encoder corruption
/// before a buffer is handed to the caller.
///
/// # Errors
///
/// Returns `DecodeError::CorruptedFile` when the buffer does not decode as
/// a JPEG.
pub fn verify_jpeg(bytes: &[u8]) -> Result<(), DecodeError> {
    image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .map(|_| ())
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}
