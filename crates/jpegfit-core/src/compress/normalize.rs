//! Stage-0 normalization: dimension cap and color-mode conversion.

use crate::resize::{fit_within, resize};
use crate::{ColorMode, SourceImage};

use super::types::{CompressError, CompressorOptions};

/// Bring an image into the form every encode attempt expects.
///
/// Two adjustments, applied once before the search starts:
///
/// 1. If the image exceeds the configured dimension cap, resample it down
///    with the configured filter, preserving aspect ratio.
/// 2. If the pixel format is not 3-channel full color (alpha-bearing,
///    grayscale, or palette-expanded), convert it. Transparency is
///    discarded, not composited against a background.
///
/// Running this twice is a no-op: the output always fits the cap and is
/// always `Rgb8`.
pub fn normalize(
    image: &SourceImage,
    options: &CompressorOptions,
) -> Result<SourceImage, CompressError> {
    let fitted = match fit_within(image.width, image.height, options.limit) {
        Some((width, height)) => resize(image, width, height, options.filter)?,
        None => image.clone(),
    };

    if fitted.color.is_opaque_color() {
        return Ok(fitted);
    }

    let dynamic = fitted
        .to_dynamic()
        .ok_or(CompressError::InvalidInput("pixel buffer length does not match dimensions"))?;
    let rgb = image::DynamicImage::ImageRgb8(dynamic.into_rgb8());
    Ok(SourceImage::from_dynamic(rgb))
}
