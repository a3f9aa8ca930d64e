//! The request pipeline: validate → resolve → transform → assemble.
//!
//! A [`Pipeline`] is built once from static configuration and shared by every
//! request. It holds no mutable state, so concurrent calls need no locking and
//! an abandoned call leaves nothing behind.
//!
//! ```text
//! RECEIVED ─validate─▶ VALIDATED ─resolve─▶ CONFIGURED ─transform─▶ TRANSFORMED ─assemble─▶ RESPONDED
//!     │                    │                     │
//!     └────────────────────┴─────────────────────┴──────────────▶ ERROR_RESPONDED
//! ```

use crate::imaging::{BackendError, ImageBackend, OutputFormat, Quality, RustBackend, TransformConfig, TransformResult};
use crate::query::{ParamError, RawParams, ResolvePolicy, resolve};
use crate::response::{ErrorResponse, SuccessResponse, assemble, assemble_error};
use crate::upload::{UploadPolicy, UploadedFile, ValidationError, validate};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Upload(#[from] ValidationError),
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error("failed to decode image")]
    Decode(String),
    #[error("failed to encode image")]
    Encode(String),
}

impl From<BackendError> for PipelineError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Decode(msg) => Self::Decode(msg),
            BackendError::Encode(msg) => Self::Encode(msg),
        }
    }
}

/// The three failure kinds a client can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationError,
    DecodeError,
    EncodeError,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::DecodeError => "DECODE_ERROR",
            Self::EncodeError => "ENCODE_ERROR",
        }
    }

    /// HTTP status: client-caused validation failures are 400, engine failures 500.
    pub fn status(self) -> u16 {
        match self {
            Self::ValidationError => 400,
            Self::DecodeError | Self::EncodeError => 500,
        }
    }
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Upload(_) | Self::Param(_) => ErrorKind::ValidationError,
            Self::Decode(_) => ErrorKind::DecodeError,
            Self::Encode(_) => ErrorKind::EncodeError,
        }
    }

    /// Underlying cause for the `details` field.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Upload(err) => err.detail(),
            Self::Param(err) => Some(format!("{}: '{}'", err.name, err.value)),
            Self::Decode(msg) | Self::Encode(msg) => Some(msg.clone()),
        }
    }
}

/// Static settings a [`Pipeline`] is constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub max_upload_bytes: u64,
    pub default_quality: Quality,
    pub strict_params: bool,
    /// Codec for inputs whose own format cannot be re-encoded.
    pub fallback_format: OutputFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: UploadPolicy::default().max_upload_bytes,
            default_quality: Quality::default(),
            strict_params: false,
            fallback_format: OutputFormat::Png,
        }
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct Processed {
    pub file: UploadedFile,
    pub config: TransformConfig,
    pub result: TransformResult,
}

impl Processed {
    pub fn to_response(&self) -> SuccessResponse {
        assemble(&self.file, &self.config, &self.result)
    }
}

/// A finished response: payload plus HTTP status.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PipelineResponse {
    Success(SuccessResponse),
    Error(ErrorResponse),
}

impl PipelineResponse {
    pub fn status(&self) -> u16 {
        match self {
            Self::Success(_) => 200,
            Self::Error(err) => err.kind.status(),
        }
    }

    pub fn from_error(err: &PipelineError) -> Self {
        Self::Error(assemble_error(err.kind(), err.to_string(), err.detail()))
    }
}

pub struct Pipeline<B: ImageBackend = RustBackend> {
    config: PipelineConfig,
    backend: B,
}

impl Pipeline<RustBackend> {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_backend(config, RustBackend::new())
    }
}

impl<B: ImageBackend> Pipeline<B> {
    pub fn with_backend(config: PipelineConfig, backend: B) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage, stopping at the first error.
    pub fn run(&self, file: Option<UploadedFile>, raw: &RawParams) -> Result<Processed, PipelineError> {
        let policy = UploadPolicy {
            max_upload_bytes: self.config.max_upload_bytes,
        };
        validate(file.as_ref(), &policy)?;
        let file = file.ok_or(ValidationError::Missing)?;

        let config = resolve(
            raw,
            &ResolvePolicy {
                default_quality: self.config.default_quality,
                strict: self.config.strict_params,
            },
        )?;

        let result = crate::imaging::transform(
            &self.backend,
            &file.content,
            &config,
            self.config.fallback_format,
        )?;

        Ok(Processed { file, config, result })
    }

    /// Run the pipeline and turn the outcome into a response payload, logging it.
    pub fn respond(&self, file: Option<UploadedFile>, raw: &RawParams) -> PipelineResponse {
        match self.run(file, raw) {
            Ok(processed) => {
                tracing::info!(
                    file = %processed.file.original_name,
                    input_bytes = processed.file.size_bytes,
                    output_bytes = processed.result.size_bytes(),
                    format = %processed.result.output_format,
                    width = processed.result.width,
                    height = processed.result.height,
                    "Image processed"
                );
                PipelineResponse::Success(processed.to_response())
            }
            Err(err) => {
                let code = err.kind().code();
                match err.kind() {
                    ErrorKind::ValidationError => {
                        tracing::warn!(error = %err, code, detail = ?err.detail(), "Request rejected");
                    }
                    ErrorKind::DecodeError | ErrorKind::EncodeError => {
                        tracing::error!(error = %err, code, detail = ?err.detail(), "Image processing failed");
                    }
                }
                PipelineResponse::from_error(&err)
            }
        }
    }
}
