//! The bounded recompressor.
//!
//! Given a [`crate::SourceImage`] and a byte budget, [`compress`] returns a
//! JPEG buffer whose size does not exceed the budget, or a definitive error.
//! The search runs in strict stage order:
//!
//! 1. **Normalization** - cap the dimensions and convert to 3-channel color
//!    (once, before any encode attempt).
//! 2. **Quality ladder** - probe the start quality, then descend in fixed
//!    steps down to the floor; the first fit wins, which is also the highest
//!    fitting quality.
//! 3. **Floor fallback** - encode at the floor quality, kept tentatively
//!    regardless of size.
//! 4. **Downscale search** - halve the dimensions (doubling divisor) and
//!    re-encode at the floor quality until a candidate fits or a dimension
//!    would drop below one pixel.
//!
//! Every accepted buffer is re-decoded before it is returned, so a corrupt
//! encode can never pass through silently. Probes are encode-to-scratch
//! only; a rejected attempt leaves no state behind.
//!
//! Each call is an independent, synchronous computation with no shared
//! state, safe to run concurrently on different images.

mod engine;
mod normalize;
mod observer;
mod types;

pub use engine::{compress, compress_observed, compress_with};
pub use normalize::normalize;
pub use observer::{Attempt, CompressObserver, NoopObserver, Stage};
pub use types::{CompressError, CompressionResult, CompressorOptions};
