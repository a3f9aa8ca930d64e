//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take the resolved [`TransformConfig`], compute render parameters, and
//! call the backend.

use super::backend::{BackendError, ImageBackend, SourceInfo};
use super::calculations::calculate_fit_dimensions;
use super::params::{OutputFormat, RenderParams, TransformConfig};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Encoded output of a transform.
///
/// `width`, `height`, and `output_format` are read back from `encoded_bytes`,
/// not taken from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    pub encoded_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub output_format: OutputFormat,
}

impl TransformResult {
    pub fn media_type(&self) -> &'static str {
        self.output_format.media_type()
    }

    pub fn size_bytes(&self) -> usize {
        self.encoded_bytes.len()
    }
}

/// Pick the codec for a request.
///
/// An explicit override wins; otherwise the source format is preserved when it
/// is one we can encode, and `fallback` is used for everything else.
pub fn select_output_format(
    source: &SourceInfo,
    config: &TransformConfig,
    fallback: OutputFormat,
) -> OutputFormat {
    match config.output_format {
        Some(format) => format,
        None => OutputFormat::from_image_format(source.format).unwrap_or(fallback),
    }
}

/// Plan a render without executing it.
///
/// Useful for testing parameter generation.
pub fn plan_render(source: &SourceInfo, config: &TransformConfig, fallback: OutputFormat) -> RenderParams {
    let original = (source.dimensions.width, source.dimensions.height);
    let (width, height) = if config.wants_resize() {
        calculate_fit_dimensions(original, (config.width, config.height))
    } else {
        original
    };

    RenderParams {
        source_format: source.format,
        width,
        height,
        output_format: select_output_format(source, config, fallback),
        quality: config.quality,
    }
}

/// Run the full transform: identify → plan → render → read back.
pub fn transform(
    backend: &impl ImageBackend,
    bytes: &[u8],
    config: &TransformConfig,
    fallback: OutputFormat,
) -> Result<TransformResult> {
    let source = backend.identify(bytes)?;
    let params = plan_render(&source, config, fallback);
    let encoded_bytes = backend.render(bytes, &params)?;

    // Codecs may adjust geometry; trust only what was actually written
    let written = backend
        .identify(&encoded_bytes)
        .map_err(|e| BackendError::Encode(format!("Encoded output is unreadable: {e}")))?;
    let output_format = OutputFormat::from_image_format(written.format).ok_or_else(|| {
        BackendError::Encode(format!(
            "Encoder produced {:?}, expected {}",
            written.format, params.output_format
        ))
    })?;

    Ok(TransformResult {
        encoded_bytes,
        width: written.dimensions.width,
        height: written.dimensions.height,
        output_format,
    })
}
