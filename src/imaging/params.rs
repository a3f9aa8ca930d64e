//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the request-facing resolver ([`crate::query`]), the
//! high-level [`operations`](super::operations) module (which decides the
//! output geometry and codec) and the [`backend`](super::backend) (which does
//! the actual pixel work).
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality. The documented domain is 1–100
//!   (default 80) but the value is carried as given; each codec adapter maps
//!   it into its own range.
//! - [`OutputFormat`] — The closed set of codecs this service emits.
//! - [`TransformConfig`] — Normalized per-request transform settings.
//! - [`RenderParams`] — Full specification for one decode → resize → encode pass.

use image::ImageFormat;
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding.
///
/// Not clamped on construction: out-of-range values reach the codec layer,
/// which decides what they mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub i32);

impl Quality {
    pub const DEFAULT: Quality = Quality(80);

    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(self) -> i32 {
        self.0
    }

    /// JPEG quality. The JPEG encoder only understands 1–100.
    pub fn for_jpeg(self) -> u8 {
        self.0.clamp(1, 100) as u8
    }

    /// libwebp quality factor, 0.0–100.0.
    pub fn for_webp(self) -> f32 {
        self.0.clamp(0, 100) as f32
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Codecs the service can encode to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
    Webp,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::Webp];

    /// Parse a `format` request value. Case-sensitive; `jpg` is an alias of `jpeg`.
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Map a detected container format onto the supported set.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::WebP => Some(Self::Webp),
            _ => None,
        }
    }

    /// Canonical wire name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// File extension used when the CLI writes output next to its input.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalized transform settings for a single request.
///
/// Built once by [`crate::query::resolve`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransformConfig {
    /// Bounding-box width. `None` means unconstrained.
    pub width: Option<u32>,
    /// Bounding-box height. `None` means unconstrained.
    pub height: Option<u32>,
    pub quality: Quality,
    /// Explicit codec override. `None` preserves the input's format.
    pub output_format: Option<OutputFormat>,
    /// The raw `format` value when it was present but not recognized.
    /// Reported back to callers only; encoding behaves as if no format was given.
    pub unrecognized_format: Option<String>,
}

impl TransformConfig {
    pub fn wants_resize(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }
}

/// Parameters for one decode → resize → encode pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    /// Format the source bytes were detected as.
    pub source_format: ImageFormat,
    /// Final pixel dimensions. Equal to the source dimensions when no resize applies.
    pub width: u32,
    pub height: u32,
    pub output_format: OutputFormat,
    pub quality: Quality,
}
