//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify (header-level format and dimensions) and render
//! (decode, resize, encode in one pass).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Everything operates on
//! in-memory buffers; no backend touches the filesystem or the network.

use super::params::RenderParams;
use image::ImageFormat;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The bytes are not a decodable image.
    #[error("Decode failed: {0}")]
    Decode(String),
    /// The codec could not produce (or re-read) output.
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub format: ImageFormat,
    pub dimensions: Dimensions,
}

/// Trait for image processing backends.
///
/// Backends are shared across concurrent requests, hence `Sync`; they hold no
/// per-request state.
pub trait ImageBackend: Sync {
    /// Detect container format and pixel dimensions without a full decode.
    fn identify(&self, bytes: &[u8]) -> Result<SourceInfo, BackendError>;

    /// Decode `bytes`, resize to `params.width × params.height` when that
    /// differs from the source, and encode as `params.output_format`.
    fn render(&self, bytes: &[u8], params: &RenderParams) -> Result<Vec<u8>, BackendError>;
}
