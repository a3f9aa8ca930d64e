//! Uploaded files and the checks run on them before any decoding.
//!
//! Validation looks only at the metadata the uploader declared: presence,
//! size, and media type. A file can pass here and still fail to decode later;
//! that is reported as a different error kind by the pipeline.

use thiserror::Error;

/// Largest upload accepted by default: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no file provided")]
    Missing,
    #[error("payload too large")]
    TooLarge { size: u64, limit: u64 },
    /// The request body exceeded the transport's limit before the file was read.
    #[error("payload too large")]
    BodyTooLarge(String),
    #[error("unsupported media type")]
    UnsupportedMediaType(String),
    /// The transport gave up reading the upload.
    #[error("malformed upload")]
    Malformed(String),
    /// The query string could not be split into parameters (e.g. a repeated key).
    #[error("malformed query string")]
    MalformedQuery(String),
}

impl ValidationError {
    /// Human-readable context for the `details` field of an error response.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Missing => None,
            Self::TooLarge { size, limit } => Some(format!(
                "file is {size} bytes; the limit is {limit} bytes ({} MiB)",
                limit / (1024 * 1024)
            )),
            Self::UnsupportedMediaType(declared) => {
                Some(format!("declared type '{declared}' is not an image/* type"))
            }
            Self::BodyTooLarge(reason) | Self::Malformed(reason) | Self::MalformedQuery(reason) => {
                Some(reason.clone())
            }
        }
    }
}

/// A file received from the multipart decoder (or read from disk by the CLI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub original_name: String,
    pub size_bytes: u64,
    pub declared_media_type: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(
        original_name: impl Into<String>,
        declared_media_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            size_bytes: content.len() as u64,
            declared_media_type: declared_media_type.into(),
            content,
        }
    }
}

/// Limits applied by [`validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_upload_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Check an upload's declared metadata against `policy`.
///
/// Checks run in order: presence, size, media type.
pub fn validate<'a>(
    file: Option<&'a UploadedFile>,
    policy: &UploadPolicy,
) -> Result<&'a UploadedFile, ValidationError> {
    let file = file.ok_or(ValidationError::Missing)?;

    if file.size_bytes > policy.max_upload_bytes {
        return Err(ValidationError::TooLarge {
            size: file.size_bytes,
            limit: policy.max_upload_bytes,
        });
    }

    if !file.declared_media_type.starts_with("image/") {
        return Err(ValidationError::UnsupportedMediaType(
            file.declared_media_type.clone(),
        ));
    }

    Ok(file)
}
