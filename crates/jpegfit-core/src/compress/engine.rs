//! The staged search over quality and dimensions.
//!
//! Every stage is a function returning a tagged outcome over [`Candidate`]
//! values; the dispatcher in [`compress_observed`] composes them in strict
//! priority order. Probes encode to a scratch buffer, are measured, and are
//! dropped on rejection - nothing partial ever reaches the result.

use crate::decode::verify_jpeg;
use crate::encode::encode_jpeg;
use crate::resize::resize;
use crate::{ColorMode, SourceImage};

use super::normalize::normalize;
use super::observer::{Attempt, CompressObserver, NoopObserver, Stage};
use super::types::{CompressError, CompressionResult, CompressorOptions};

/// A trial encode together with the parameters that produced it.
struct Candidate {
    bytes: Vec<u8>,
    quality: u8,
    width: u32,
    height: u32,
}

impl Candidate {
    fn fits(&self, budget: usize) -> bool {
        self.bytes.len() <= budget
    }
}

/// How the downscale loop ended.
enum SearchOutcome {
    /// A halved candidate met the budget.
    Fit(Candidate),
    /// Dimensions bottomed out; carries the last resized attempt's size.
    Exhausted(Option<usize>),
}

/// Compress an image to fit a byte budget, with default options.
///
/// See [`compress_with`].
pub fn compress(image: &SourceImage, budget: usize) -> Result<CompressionResult, CompressError> {
    compress_with(image, budget, &CompressorOptions::default())
}

/// Compress an image to fit a byte budget.
///
/// The input is never mutated; the result owns a freshly encoded buffer.
/// On success the result's size is `<= budget` - an over-budget buffer is
/// never returned silently.
///
/// # Errors
///
/// * `CompressError::InvalidInput` - zero dimension or budget, inconsistent
///   pixel buffer, or a degenerate ladder configuration.
/// * `CompressError::BudgetUnattainable` - every stage exhausted; carries
///   the requested budget and the best size actually achieved.
/// * `CompressError::CorruptOutput` - the winning buffer failed re-decode.
/// * Collaborator failures propagate as their own variants.
pub fn compress_with(
    image: &SourceImage,
    budget: usize,
    options: &CompressorOptions,
) -> Result<CompressionResult, CompressError> {
    compress_observed(image, budget, options, &mut NoopObserver)
}

/// [`compress_with`], reporting every trial encode to an observer.
pub fn compress_observed(
    image: &SourceImage,
    budget: usize,
    options: &CompressorOptions,
    observer: &mut dyn CompressObserver,
) -> Result<CompressionResult, CompressError> {
    validate(image, budget, options)?;

    let normalized = normalize(image, options)?;

    // Stage 1: descending quality ladder on the normalized image.
    if let Some(candidate) = quality_ladder(&normalized, budget, options, observer)? {
        return finish(candidate, options);
    }

    // Stage 2: floor-quality fallback, kept tentatively regardless of size.
    let fallback = probe(
        &normalized,
        options.quality_floor,
        Stage::FloorFallback,
        budget,
        options,
        observer,
    )?;
    if fallback.fits(budget) {
        return finish(fallback, options);
    }
    let fallback_size = fallback.bytes.len();

    // Stage 3: halve dimensions until something fits or nothing is left.
    match downscale_search(&normalized, budget, options, observer)? {
        SearchOutcome::Fit(candidate) => finish(candidate, options),
        SearchOutcome::Exhausted(last_size) => Err(CompressError::BudgetUnattainable {
            budget,
            achieved: last_size.unwrap_or(fallback_size),
        }),
    }
}

fn validate(
    image: &SourceImage,
    budget: usize,
    options: &CompressorOptions,
) -> Result<(), CompressError> {
    if image.width == 0 || image.height == 0 {
        return Err(CompressError::InvalidInput("image dimensions must be positive"));
    }
    let expected =
        (image.width as usize) * (image.height as usize) * image.color.channel_count();
    if image.pixels.len() != expected {
        return Err(CompressError::InvalidInput(
            "pixel buffer length does not match dimensions",
        ));
    }
    if budget == 0 {
        return Err(CompressError::InvalidInput("byte budget must be positive"));
    }
    if options.quality_step == 0 {
        return Err(CompressError::InvalidInput("quality step must be at least 1"));
    }
    if options.quality_floor == 0 || options.quality_start > 100 {
        return Err(CompressError::InvalidInput("quality levels must be within 1-100"));
    }
    if options.quality_floor > options.quality_start {
        return Err(CompressError::InvalidInput(
            "quality floor must not exceed quality start",
        ));
    }
    Ok(())
}

/// Encode one candidate and report it to the observer.
fn probe(
    image: &SourceImage,
    quality: u8,
    stage: Stage,
    budget: usize,
    options: &CompressorOptions,
    observer: &mut dyn CompressObserver,
) -> Result<Candidate, CompressError> {
    debug_assert_eq!(image.color, ColorMode::Rgb8, "probe input must be normalized");

    let bytes = encode_jpeg(
        &image.pixels,
        image.width,
        image.height,
        &options.encode_options(quality),
    )?;

    observer.attempt(&Attempt {
        stage,
        quality,
        width: image.width,
        height: image.height,
        size: bytes.len(),
        fits: bytes.len() <= budget,
    });

    Ok(Candidate {
        bytes,
        quality,
        width: image.width,
        height: image.height,
    })
}

/// Stage 1: probe the start quality, then the descending arithmetic
/// sequence down to the floor, re-encoding the same normalized image each
/// time. The first fit is the highest fitting quality.
fn quality_ladder(
    normalized: &SourceImage,
    budget: usize,
    options: &CompressorOptions,
    observer: &mut dyn CompressObserver,
) -> Result<Option<Candidate>, CompressError> {
    let first = probe(
        normalized,
        options.quality_start,
        Stage::QualityLadder,
        budget,
        options,
        observer,
    )?;
    if first.fits(budget) {
        return Ok(Some(first));
    }

    let mut quality = options.quality_start.saturating_sub(options.quality_step);
    while quality >= options.quality_floor {
        let candidate = probe(
            normalized,
            quality,
            Stage::QualityLadder,
            budget,
            options,
            observer,
        )?;
        if candidate.fits(budget) {
            return Ok(Some(candidate));
        }
        quality = quality.saturating_sub(options.quality_step);
    }

    Ok(None)
}

/// Stage 3: floor-quality encodes of the normalized image at divisors
/// 1, 2, 4, 8, ... until a candidate fits or a dimension would fall below
/// one pixel. Candidate dimensions are the integer quotients of the
/// normalized dimensions, so the loop runs at most
/// `ceil(log2(max(width, height))) + 1` times.
fn downscale_search(
    normalized: &SourceImage,
    budget: usize,
    options: &CompressorOptions,
    observer: &mut dyn CompressObserver,
) -> Result<SearchOutcome, CompressError> {
    let mut divisor: u64 = 1;
    let mut last_size = None;

    loop {
        let width = (normalized.width as u64 / divisor) as u32;
        let height = (normalized.height as u64 / divisor) as u32;
        if width < 1 || height < 1 {
            return Ok(SearchOutcome::Exhausted(last_size));
        }

        let resized = resize(normalized, width, height, options.filter)?;
        let candidate = probe(
            &resized,
            options.quality_floor,
            Stage::Downscale,
            budget,
            options,
            observer,
        )?;
        if candidate.fits(budget) {
            return Ok(SearchOutcome::Fit(candidate));
        }

        last_size = Some(candidate.bytes.len());
        divisor *= 2;
    }
}

/// Re-decode the winning buffer, then hand it over.
fn finish(
    candidate: Candidate,
    options: &CompressorOptions,
) -> Result<CompressionResult, CompressError> {
    if options.verify_output {
        verify_jpeg(&candidate.bytes).map_err(|e| CompressError::CorruptOutput(e.to_string()))?;
    }

    Ok(CompressionResult {
        bytes: candidate.bytes,
        quality: candidate.quality,
        width: candidate.width,
        height: candidate.height,
    })
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn options_for_tests() -> CompressorOptions {
        let mut options = CompressorOptions::default();
        // Keep probe dimensions small so the suite stays fast.
        options.limit = crate::resize::DimensionLimit::Edge(64);
        options
    }

    fn image_strategy() -> impl Strategy<Value = SourceImage> {
        ((1u32..=24, 1u32..=24), 0u8..=3).prop_map(|((width, height), pattern)| {
            let size = (width as usize) * (height as usize) * 3;
            let pixels: Vec<u8> = match pattern {
                0 => vec![128u8; size],
                1 => (0..size).map(|i| (i % 256) as u8).collect(),
                2 => (0..size)
                    .map(|i| ((i as u32).wrapping_mul(2654435761) >> 13) as u8)
                    .collect(),
                _ => (0..size).map(|i| ((i * 37) % 256) as u8).collect(),
            };
            SourceImage::new(width, height, crate::ColorMode::Rgb8, pixels)
        })
    }

    proptest! {
        /// Property: a success never exceeds the budget and always reports
        /// a quality within the configured ladder; a budget failure always
        /// reports a size that genuinely exceeds the budget.
        #[test]
        fn prop_result_respects_budget(
            image in image_strategy(),
            budget in 1usize..=4096,
        ) {
            let options = options_for_tests();
            match compress_with(&image, budget, &options) {
                Ok(result) => {
                    prop_assert!(result.size() <= budget);
                    prop_assert!(result.quality >= options.quality_floor);
                    prop_assert!(result.quality <= options.quality_start);
                    prop_assert!(result.width >= 1 && result.height >= 1);
                }
                Err(CompressError::BudgetUnattainable { budget: b, achieved }) => {
                    prop_assert_eq!(b, budget);
                    prop_assert!(achieved > budget);
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }

        /// Property: compression is deterministic.
        #[test]
        fn prop_deterministic(image in image_strategy(), budget in 64usize..=4096) {
            let options = options_for_tests();
            let first = compress_with(&image, budget, &options);
            let second = compress_with(&image, budget, &options);

            match (first, second) {
                (Ok(a), Ok(b)) => {
                    prop_assert_eq!(a.bytes, b.bytes);
                    prop_assert_eq!(a.quality, b.quality);
                }
                (Err(_), Err(_)) => {}
                _ => prop_assert!(false, "non-deterministic outcome"),
            }
        }

        /// Property: normalization is idempotent for every color mode.
        #[test]
        fn prop_normalize_idempotent(
            (width, height) in (1u32..=40, 1u32..=40),
            mode_index in 0usize..4,
        ) {
            let modes = [
                crate::ColorMode::Luma8,
                crate::ColorMode::LumaAlpha8,
                crate::ColorMode::Rgb8,
                crate::ColorMode::Rgba8,
            ];
            let color = modes[mode_index];
            let size = (width as usize) * (height as usize) * color.channel_count();
            let pixels: Vec<u8> = (0..size).map(|i| ((i * 31) % 256) as u8).collect();
            let image = SourceImage::new(width, height, color, pixels);

            let options = options_for_tests();
            let once = normalize(&image, &options);
            prop_assert!(once.is_ok());

            let once = once.unwrap();
            let twice = normalize(&once, &options);
            prop_assert!(twice.is_ok());

            prop_assert_eq!(once, twice.unwrap());
        }
    }
}
