//! In-memory image backend built on the `image` crate ecosystem.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::with_guessed_format` + `into_dimensions` |
//! | Decode (JPEG, PNG, WebP, GIF, TIFF, BMP) | `image::load_from_memory_with_format` |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality 1–100) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (lossless; quality ignored) |
//! | Encode → WebP | `webp::Encoder` (libwebp, lossy at the requested quality) |

use super::backend::{BackendError, Dimensions, ImageBackend, SourceInfo};
use super::params::{OutputFormat, Quality, RenderParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;

/// Pure Rust backend (plus libwebp for lossy WebP).
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode the full pixel buffer.
fn load_image(bytes: &[u8], format: image::ImageFormat) -> Result<DynamicImage, BackendError> {
    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| BackendError::Decode(format!("Failed to decode {format:?} data: {e}")))
}

/// PNG stores 8- and 16-bit integer samples. Float layouts drop to 16-bit;
/// everything else is written as decoded.
fn to_png_layout(img: &DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageRgba32F(_) => DynamicImage::ImageRgba16(img.to_rgba16()),
        DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb16(img.to_rgb16()),
        other => other.clone(),
    }
}

fn encode(img: &DynamicImage, format: OutputFormat, quality: Quality) -> Result<Vec<u8>, BackendError> {
    match format {
        OutputFormat::Jpeg => encode_jpeg(img, quality),
        OutputFormat::Png => encode_png(img),
        OutputFormat::Webp => encode_webp(img, quality),
    }
}

/// JPEG has no alpha channel: flatten to RGB first.
fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.for_jpeg());
    rgb.write_with_encoder(encoder)
        .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, BackendError> {
    let img = to_png_layout(img);
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    img.write_with_encoder(encoder)
        .map_err(|e| BackendError::Encode(format!("PNG encode failed: {e}")))?;
    Ok(buf)
}

/// libwebp only takes interleaved RGB8 / RGBA8.
fn encode_webp(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let (width, height) = img.dimensions();
    let encoded = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), width, height)
            .encode_simple(false, quality.for_webp())
            .map_err(|e| BackendError::Encode(format!("WebP encode failed: {e:?}")))?
            .to_vec()
    } else {
        let rgb = img.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), width, height)
            .encode_simple(false, quality.for_webp())
            .map_err(|e| BackendError::Encode(format!("WebP encode failed: {e:?}")))?
            .to_vec()
    };
    Ok(encoded)
}

impl ImageBackend for RustBackend {
    fn identify(&self, bytes: &[u8]) -> Result<SourceInfo, BackendError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| BackendError::Decode(format!("Failed to read image header: {e}")))?;
        let format = reader
            .format()
            .ok_or_else(|| BackendError::Decode("Unrecognized image data".to_string()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| BackendError::Decode(format!("Failed to read dimensions: {e}")))?;
        Ok(SourceInfo {
            format,
            dimensions: Dimensions { width, height },
        })
    }

    fn render(&self, bytes: &[u8], params: &RenderParams) -> Result<Vec<u8>, BackendError> {
        let img = load_image(bytes, params.source_format)?;
        let img = if img.dimensions() == (params.width, params.height) {
            img
        } else {
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };
        encode(&img, params.output_format, params.quality)
    }
}
