//! Options, result and error types for the recompressor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::{EncodeError, EncodeOptions};
use crate::resize::{DimensionLimit, ResizeError};
use crate::FilterType;

/// Tuning knobs for the recompression search.
///
/// All parameters are call-time values; there is no hidden global state.
/// The defaults reproduce the standard policy: a 1920-pixel edge cap, a
/// quality ladder from 95 down to 30 in steps of 5, Lanczos resampling,
/// and progressive, Huffman-optimized encodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressorOptions {
    /// Dimension cap applied during normalization.
    pub limit: DimensionLimit,
    /// First (highest) quality probed.
    pub quality_start: u8,
    /// Lowest quality the ladder descends to; also the quality of every
    /// fallback and downscale encode.
    pub quality_floor: u8,
    /// Step between ladder qualities.
    pub quality_step: u8,
    /// Resampling filter for normalization and downscaling.
    pub filter: FilterType,
    /// Emit progressive scan layouts.
    pub progressive: bool,
    /// Use optimized Huffman tables.
    pub optimized_huffman: bool,
    /// Re-decode the winning buffer before returning it.
    pub verify_output: bool,
}

impl Default for CompressorOptions {
    fn default() -> Self {
        Self {
            limit: DimensionLimit::Edge(1920),
            quality_start: 95,
            quality_floor: 30,
            quality_step: 5,
            filter: FilterType::Lanczos3,
            progressive: true,
            optimized_huffman: true,
            verify_output: true,
        }
    }
}

impl CompressorOptions {
    /// Encoder settings for an attempt at the given quality.
    pub(crate) fn encode_options(&self, quality: u8) -> EncodeOptions {
        EncodeOptions {
            quality,
            progressive: self.progressive,
            optimized_huffman: self.optimized_huffman,
        }
    }
}

/// Final product of a successful compression.
///
/// Ownership of the buffer transfers to the caller; persistence and
/// transport are the caller's concern.
#[derive(Debug, Clone)]
pub struct CompressionResult {
    /// The encoded JPEG.
    pub bytes: Vec<u8>,
    /// Quality level of the final encode (1-100).
    pub quality: u8,
    /// Final pixel width.
    pub width: u32,
    /// Final pixel height.
    pub height: u32,
}

impl CompressionResult {
    /// Encoded size in bytes. Never exceeds the budget it was produced for.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Errors from the recompression search.
///
/// Oversized probe results are not errors - they drive the search onward.
/// Only exhaustion of every stage, invalid input, or a failing collaborator
/// surfaces here.
#[derive(Debug, Error)]
pub enum CompressError {
    /// Zero dimension, zero budget, or a degenerate search configuration.
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    /// Every stage was exhausted without meeting the budget.
    #[error("No encoding met the byte budget: requested {budget}, best achieved {achieved}")]
    BudgetUnattainable { budget: usize, achieved: usize },

    /// The winning buffer failed the post-encode integrity check.
    #[error("Encoded output failed integrity verification: {0}")]
    CorruptOutput(String),

    /// The encode collaborator failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The decode collaborator failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Resampling failed.
    #[error(transparent)]
    Resize(#[from] ResizeError),
}
