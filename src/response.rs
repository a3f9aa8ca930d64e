//! Response payloads for the processing endpoint.
//!
//! The assembler is the single place where a pipeline outcome becomes a
//! client-visible shape. Field names follow the service's established wire
//! contract:
//!
//! ```json
//! {
//!   "success": true,
//!   "message": "Image processed successfully",
//!   "original":  { "nome": "cat.png", "tamanho": 48213, "tipo": "image/png" },
//!   "processed": { "largura": 300, "altura": 150, "tamanho": 9120,
//!                  "qualidade": 80, "formato": "png", "tipo": "image/png" },
//!   "image": "data:image/png;base64,iVBORw0KGgo..."
//! }
//! ```
//!
//! Errors always carry `success: false`, a message, the error code, and an
//! optional `details` string.

use crate::imaging::{TransformConfig, TransformResult};
use crate::pipeline::ErrorKind;
use crate::upload::UploadedFile;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

pub const SUCCESS_MESSAGE: &str = "Image processed successfully";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OriginalInfo {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tamanho")]
    pub size: u64,
    #[serde(rename = "tipo")]
    pub media_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedInfo {
    #[serde(rename = "largura")]
    pub width: u32,
    #[serde(rename = "altura")]
    pub height: u32,
    #[serde(rename = "tamanho")]
    pub size: usize,
    #[serde(rename = "qualidade")]
    pub quality: i32,
    #[serde(rename = "formato")]
    pub format: String,
    #[serde(rename = "tipo")]
    pub media_type: String,
    /// Echo of a `format` value that was not recognized and therefore ignored.
    #[serde(rename = "formatoSolicitado", skip_serializing_if = "Option::is_none")]
    pub requested_format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
    pub original: OriginalInfo,
    pub processed: ProcessedInfo,
    /// Encoded output as a `data:` URL.
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip)]
    pub kind: ErrorKind,
}

/// Encode bytes as a base64 `data:` URL.
pub fn data_url(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
}

/// Package a successful transform. Reads its inputs, never mutates them.
pub fn assemble(file: &UploadedFile, config: &TransformConfig, result: &TransformResult) -> SuccessResponse {
    SuccessResponse {
        success: true,
        message: SUCCESS_MESSAGE.to_string(),
        original: OriginalInfo {
            name: file.original_name.clone(),
            size: file.size_bytes,
            media_type: file.declared_media_type.clone(),
        },
        processed: ProcessedInfo {
            width: result.width,
            height: result.height,
            size: result.size_bytes(),
            quality: config.quality.value(),
            format: result.output_format.name().to_string(),
            media_type: result.media_type().to_string(),
            requested_format: config.unrecognized_format.clone(),
        },
        image: data_url(result.media_type(), &result.encoded_bytes),
    }
}

pub fn assemble_error(kind: ErrorKind, message: impl Into<String>, details: Option<String>) -> ErrorResponse {
    ErrorResponse {
        success: false,
        error: message.into(),
        code: kind.code(),
        details,
        kind,
    }
}
