//! Resampling and dimension-fitting helpers.
//!
//! Normalization and the downscale loop both go through [`resize`], which
//! resamples in the source's own color mode. [`fit_within`] computes the
//! aspect-preserving target dimensions for the configurable pre-encode
//! dimension cap.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{FilterType, SourceImage};

/// Errors from resampling operations.
#[derive(Debug, Error)]
pub enum ResizeError {
    /// Target width or height is zero.
    #[error("Invalid target dimensions: {width}x{height}")]
    InvalidTarget { width: u32, height: u32 },

    /// The source pixel buffer does not match its stated dimensions.
    #[error("Pixel buffer does not match image dimensions")]
    MalformedSource,
}

/// Dimension cap policy applied before any encode attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DimensionLimit {
    /// Constrain the longest edge to at most this many pixels.
    Edge(u32),
    /// Constrain only the width; height follows the aspect ratio.
    Width(u32),
}

/// Compute capped dimensions for an image under the given limit.
///
/// Returns `None` when the image already fits. Otherwise the scale ratio is
/// `min(cap/width, cap/height)` for [`DimensionLimit::Edge`] and `cap/width`
/// for [`DimensionLimit::Width`]; each new dimension is the rounded product,
/// clamped to a minimum of 1.
pub fn fit_within(width: u32, height: u32, limit: DimensionLimit) -> Option<(u32, u32)> {
    let ratio = match limit {
        DimensionLimit::Edge(cap) => {
            if width <= cap && height <= cap {
                return None;
            }
            (cap as f64 / width as f64).min(cap as f64 / height as f64)
        }
        DimensionLimit::Width(cap) => {
            if width <= cap {
                return None;
            }
            cap as f64 / width as f64
        }
    };

    let new_width = ((width as f64 * ratio).round() as u32).max(1);
    let new_height = ((height as f64 * ratio).round() as u32).max(1);
    Some((new_width, new_height))
}

/// Resize an image to exact dimensions.
///
/// Resampling happens in the source's color mode; the result carries the
/// same [`crate::ColorMode`] as the input. If the dimensions already match,
/// the input is cloned without resampling.
///
/// # Errors
///
/// Returns `ResizeError::InvalidTarget` for zero target dimensions and
/// `ResizeError::MalformedSource` when the source buffer is inconsistent.
pub fn resize(
    image: &SourceImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<SourceImage, ResizeError> {
    if width == 0 || height == 0 {
        return Err(ResizeError::InvalidTarget { width, height });
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let dynamic = image.to_dynamic().ok_or(ResizeError::MalformedSource)?;
    let resized = dynamic.resize_exact(width, height, filter.to_image_filter());

    Ok(SourceImage::from_dynamic(resized))
}
