//! jpegfit Core - Size-bounded JPEG recompression
//!
//! This crate takes a decoded raster image and a byte budget and produces a
//! JPEG buffer that fits the budget while giving up as little visual quality
//! as possible. The search is deterministic and bounded: a descending quality
//! ladder, a floor-quality fallback, and a halving downscale loop, in that
//! order. See the [`compress`] module for the full pipeline.
//!
//! Decoding of common source formats and the JPEG encode itself live in the
//! [`decode`] and [`encode`] modules; [`resize`] holds the resampling and
//! dimension-fitting helpers shared by normalization and the downscale loop.

pub mod compress;
pub mod decode;
pub mod encode;
pub mod resize;

pub use compress::{
    compress, compress_observed, compress_with, Attempt, CompressError, CompressObserver,
    CompressionResult, CompressorOptions, NoopObserver, Stage,
};
pub use resize::{fit_within, resize, DimensionLimit};

/// Pixel layout of a [`SourceImage`] buffer.
///
/// All modes are 8 bits per channel; deeper or floating-point sources are
/// reduced to 8-bit on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ColorMode {
    /// Single-channel grayscale.
    Luma8,
    /// Grayscale with an alpha channel.
    LumaAlpha8,
    /// 3-channel full color.
    Rgb8,
    /// Full color with an alpha channel.
    Rgba8,
}

impl ColorMode {
    /// Number of bytes per pixel in this mode.
    pub fn channel_count(self) -> usize {
        match self {
            ColorMode::Luma8 => 1,
            ColorMode::LumaAlpha8 => 2,
            ColorMode::Rgb8 => 3,
            ColorMode::Rgba8 => 4,
        }
    }

    /// Whether this is the 3-channel full-color mode JPEG encoding expects.
    pub fn is_opaque_color(self) -> bool {
        matches!(self, ColorMode::Rgb8)
    }
}

/// Filter type for image resizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    #[default]
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// A decoded raster image.
///
/// This is the value every pipeline step exchanges. The recompressor never
/// mutates a caller's `SourceImage`; resizing and color conversion produce
/// derived copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel layout of `pixels`.
    pub color: ColorMode,
    /// Pixel data in row-major order.
    /// Length should be width * height * color.channel_count().
    pub pixels: Vec<u8>,
}

impl SourceImage {
    /// Create a new SourceImage from a raw pixel buffer.
    pub fn new(width: u32, height: u32, color: ColorMode, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize) * color.channel_count(),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            color,
            pixels,
        }
    }

    /// Create a SourceImage from an image::DynamicImage.
    ///
    /// 8-bit variants keep their mode; deeper variants are reduced to
    /// 8-bit full color, keeping the alpha channel if the source had one.
    pub fn from_dynamic(image: image::DynamicImage) -> Self {
        use image::DynamicImage;

        match image {
            DynamicImage::ImageLuma8(buf) => {
                let (width, height) = buf.dimensions();
                Self::new(width, height, ColorMode::Luma8, buf.into_raw())
            }
            DynamicImage::ImageLumaA8(buf) => {
                let (width, height) = buf.dimensions();
                Self::new(width, height, ColorMode::LumaAlpha8, buf.into_raw())
            }
            DynamicImage::ImageRgb8(buf) => {
                let (width, height) = buf.dimensions();
                Self::new(width, height, ColorMode::Rgb8, buf.into_raw())
            }
            DynamicImage::ImageRgba8(buf) => {
                let (width, height) = buf.dimensions();
                Self::new(width, height, ColorMode::Rgba8, buf.into_raw())
            }
            other => {
                if other.color().has_alpha() {
                    let buf = other.into_rgba8();
                    let (width, height) = buf.dimensions();
                    Self::new(width, height, ColorMode::Rgba8, buf.into_raw())
                } else {
                    let buf = other.into_rgb8();
                    let (width, height) = buf.dimensions();
                    Self::new(width, height, ColorMode::Rgb8, buf.into_raw())
                }
            }
        }
    }

    /// Convert to an image::DynamicImage for resampling or color conversion.
    ///
    /// Returns `None` if the pixel buffer does not match the dimensions.
    pub fn to_dynamic(&self) -> Option<image::DynamicImage> {
        use image::DynamicImage;

        let pixels = self.pixels.clone();
        match self.color {
            ColorMode::Luma8 => image::GrayImage::from_raw(self.width, self.height, pixels)
                .map(DynamicImage::ImageLuma8),
            ColorMode::LumaAlpha8 => {
                image::GrayAlphaImage::from_raw(self.width, self.height, pixels)
                    .map(DynamicImage::ImageLumaA8)
            }
            ColorMode::Rgb8 => image::RgbImage::from_raw(self.width, self.height, pixels)
                .map(DynamicImage::ImageRgb8),
            ColorMode::Rgba8 => image::RgbaImage::from_raw(self.width, self.height, pixels)
                .map(DynamicImage::ImageRgba8),
        }
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
