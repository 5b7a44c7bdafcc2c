//! JPEG encoding for the recompression search.
//!
//! This module wraps the pure-Rust `jpeg-encoder` crate, which exposes the
//! two encoder switches the search always runs with: progressive scan layout
//! and optimized Huffman tables. Input is always 3-channel RGB; color-mode
//! conversion happens during normalization, before any encode attempt.

use jpeg_encoder::{ColorType, Encoder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest dimension the JPEG format can represent.
const JPEG_MAX_DIMENSION: u32 = u16::MAX as u32;

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Width or height exceeds what a JPEG frame header can hold
    #[error("Dimensions {width}x{height} exceed the JPEG limit of 65535")]
    DimensionsTooLarge { width: u32, height: u32 },

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encoder settings for a single attempt.
///
/// The defaults match how the recompressor always encodes: quality 95 with
/// progressive scans and optimized Huffman tables. Only `quality` varies
/// during the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeOptions {
    /// JPEG quality (1-100, where 100 is highest quality).
    pub quality: u8,
    /// Emit a progressive scan layout instead of baseline.
    pub progressive: bool,
    /// Use optimized Huffman tables (second pass over the statistics).
    pub optimized_huffman: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: 95,
            progressive: true,
            optimized_huffman: true,
        }
    }
}

impl EncodeOptions {
    /// Default settings at the given quality level.
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality,
            ..Self::default()
        }
    }
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `options` - Quality and scan-layout settings
///
/// # Returns
///
/// JPEG-encoded bytes on success, or an error if encoding fails.
/// Quality values outside 1-100 are clamped into range.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    options: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    // Validate dimensions
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    if width > JPEG_MAX_DIMENSION || height > JPEG_MAX_DIMENSION {
        return Err(EncodeError::DimensionsTooLarge { width, height });
    }

    // Validate pixel data length
    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let quality = options.quality.clamp(1, 100);

    let mut buffer = Vec::new();
    let mut encoder = Encoder::new(&mut buffer, quality);
    encoder.set_progressive(options.progressive);
    encoder.set_optimized_huffman_tables(options.optimized_huffman);

    encoder
        .encode(pixels, width as u16, height as u16, ColorType::Rgb)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for generating image dimensions (keep small for speed).
    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=50, 1u32..=50)
    }

    /// Strategy for generating quality values.
    fn quality_strategy() -> impl Strategy<Value = u8> {
        1u8..=100
    }

    proptest! {
        /// Property: Encoding always produces a well-formed JPEG container
        /// for valid input, for every scan layout.
        #[test]
        fn prop_valid_input_produces_valid_jpeg(
            (width, height) in dimensions_strategy(),
            quality in quality_strategy(),
            progressive in any::<bool>(),
            optimized in any::<bool>(),
        ) {
            let size = (width as usize) * (height as usize) * 3;
            let pixels = vec![128u8; size];
            let options = EncodeOptions {
                quality,
                progressive,
                optimized_huffman: optimized,
            };

            let result = encode_jpeg(&pixels, width, height, &options);
            prop_assert!(result.is_ok(), "Valid input should produce valid output");
            let jpeg_bytes = result.unwrap();

            prop_assert_eq!(&jpeg_bytes[0..2], &[0xFF, 0xD8], "Should have SOI marker");

            let len = jpeg_bytes.len();
            prop_assert!(len >= 4, "JPEG should have at least 4 bytes");
            prop_assert_eq!(&jpeg_bytes[len - 2..], &[0xFF, 0xD9], "Should have EOI marker");
        }

        /// Property: Same input always produces same output (deterministic).
        #[test]
        fn prop_deterministic_output(
            (width, height) in (1u32..=20, 1u32..=20),
            quality in quality_strategy(),
        ) {
            let size = (width as usize) * (height as usize) * 3;
            let pixels = vec![100u8; size]; // Use a fixed value for reproducibility
            let options = EncodeOptions::with_quality(quality);

            let result1 = encode_jpeg(&pixels, width, height, &options);
            let result2 = encode_jpeg(&pixels, width, height, &options);

            prop_assert!(result1.is_ok() && result2.is_ok());
            prop_assert_eq!(result1.unwrap(), result2.unwrap(), "Same input should produce same output");
        }

        /// Property: Quality affects file size (generally higher quality =
        /// larger file). Tolerance-based since JPEG is not perfectly
        /// monotonic.
        #[test]
        fn prop_quality_size_monotonic_with_tolerance(
            (width, height) in (20u32..=40, 20u32..=40),
        ) {
            // Create a complex image (gradient) where quality difference is visible
            let size = (width as usize) * (height as usize) * 3;
            let mut pixels = Vec::with_capacity(size);

            for y in 0..height {
                for x in 0..width {
                    pixels.push(((x * 255) / width) as u8);
                    pixels.push(((y * 255) / height) as u8);
                    pixels.push(((x + y) * 127 / (width + height)) as u8);
                }
            }

            let low_q = encode_jpeg(&pixels, width, height, &EncodeOptions::with_quality(10));
            let high_q = encode_jpeg(&pixels, width, height, &EncodeOptions::with_quality(100));

            prop_assert!(low_q.is_ok() && high_q.is_ok());

            let low_size = low_q.unwrap().len();
            let high_size = high_q.unwrap().len();

            // Either high quality is larger OR they're within 50% of each other
            prop_assert!(
                high_size > low_size || (low_size as f64 / high_size as f64) < 1.5,
                "Quality should affect size: low={}, high={}",
                low_size,
                high_size
            );
        }

        /// Property: Invalid pixel data length always returns error.
        #[test]
        fn prop_invalid_pixel_length_returns_error(
            (width, height) in dimensions_strategy(),
            quality in quality_strategy(),
            extra_or_missing in -10i32..=10,
        ) {
            prop_assume!(extra_or_missing != 0); // Skip zero, as that's valid

            let expected_size = (width as usize) * (height as usize) * 3;
            let actual_size = if extra_or_missing > 0 {
                expected_size + extra_or_missing as usize
            } else {
                expected_size.saturating_sub((-extra_or_missing) as usize)
            };

            // Skip if we would get the correct size
            prop_assume!(actual_size != expected_size);

            let pixels = vec![128u8; actual_size];
            let result = encode_jpeg(&pixels, width, height, &EncodeOptions::with_quality(quality));

            prop_assert!(
                matches!(result, Err(EncodeError::InvalidPixelData { .. })),
                "Mismatched pixel data should return InvalidPixelData error"
            );
        }

        /// Property: Various pixel patterns encode successfully.
        #[test]
        fn prop_various_pixel_patterns(
            (width, height) in (5u32..=20, 5u32..=20),
            pattern in 0u8..=4,
        ) {
            let size = (width as usize) * (height as usize) * 3;
            let pixels: Vec<u8> = match pattern {
                0 => vec![0u8; size],        // Black
                1 => vec![255u8; size],      // White
                2 => vec![128u8; size],      // Gray
                3 => (0..size).map(|i| (i % 256) as u8).collect(), // Gradient
                _ => (0..size).map(|i| ((i * 37) % 256) as u8).collect(), // Pseudo-random
            };

            let result = encode_jpeg(&pixels, width, height, &EncodeOptions::default());
            prop_assert!(result.is_ok(), "Pattern {} should encode successfully", pattern);

            let jpeg = result.unwrap();
            prop_assert_eq!(&jpeg[0..2], &[0xFF, 0xD8], "Should have valid JPEG header");
        }
    }
}
