//! HTTP surface: routing, multipart decoding, and status mapping.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /` | service info and endpoint list |
//! | `GET /health` | liveness probe |
//! | `POST /process` | multipart upload (`image` field, `file` accepted) + query params |
//!
//! The pipeline is CPU-bound, so each call runs on tokio's blocking pool and
//! never stalls the async workers serving other requests.

use crate::pipeline::{Pipeline, PipelineError, PipelineResponse};
use crate::query::RawParams;
use crate::upload::{UploadedFile, ValidationError};
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;

/// Multipart field names that carry the upload.
const UPLOAD_FIELDS: &[&str] = &["image", "file"];

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub version: &'static str,
}

impl AppState {
    pub fn new(pipeline: Pipeline, version: &'static str) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            version,
        }
    }
}

/// Build the router. `max_request_bytes` caps how much of a body is buffered.
pub fn router(state: AppState, max_request_bytes: usize) -> Router {
    Router::new()
        .route("/", get(info))
        .route("/health", get(health))
        .route("/process", post(process))
        .layer(DefaultBodyLimit::max(max_request_bytes))
        .with_state(state)
}

impl IntoResponse for PipelineResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Image processing service running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn info(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Image Processing Service",
        "version": state.version,
        "endpoints": {
            "health": "/health",
            "process": "/process (POST)",
        },
    }))
}

async fn process(
    State(state): State<AppState>,
    query: Result<Query<RawParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> PipelineResponse {
    let raw = match query {
        Ok(Query(raw)) => raw,
        Err(rejection) => {
            let err = PipelineError::Upload(ValidationError::MalformedQuery(rejection.body_text()));
            tracing::warn!(error = %err, detail = ?err.detail(), "Query string rejected");
            return PipelineResponse::from_error(&err);
        }
    };

    let file = match multipart {
        Ok(multipart) => match read_upload(multipart).await {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!(error = %err, detail = ?err.detail(), "Upload could not be read");
                return PipelineResponse::from_error(&err);
            }
        },
        // Not a multipart body at all: nothing was uploaded
        Err(rejection) => {
            tracing::debug!(%rejection, "Request without multipart body");
            None
        }
    };

    let pipeline = Arc::clone(&state.pipeline);
    match tokio::task::spawn_blocking(move || pipeline.respond(file, &raw)).await {
        Ok(response) => response,
        Err(join_err) => {
            tracing::error!(error = %join_err, "Processing task failed");
            PipelineResponse::from_error(&PipelineError::Encode(format!(
                "processing task failed: {join_err}"
            )))
        }
    }
}

/// Pull the upload out of a multipart body.
///
/// Returns `Ok(None)` when no upload field is present, or when the field is an
/// empty, unnamed part (what browsers send for an untouched file input).
async fn read_upload(mut multipart: Multipart) -> Result<Option<UploadedFile>, PipelineError> {
    let mut upload = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(multipart_error(e.status(), e.body_text())),
        };

        let is_upload = field.name().is_some_and(|name| UPLOAD_FIELDS.contains(&name));
        if !is_upload || upload.is_some() {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let media_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e.status(), e.body_text()))?;

        if data.is_empty() && name.is_empty() {
            continue;
        }

        let name = if name.is_empty() { "upload".to_string() } else { name };
        upload = Some(UploadedFile::new(name, media_type, data.to_vec()));
    }

    Ok(upload)
}

fn multipart_error(status: StatusCode, body: String) -> PipelineError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        PipelineError::Upload(ValidationError::BodyTooLarge(body))
    } else {
        PipelineError::Upload(ValidationError::Malformed(body))
    }
}
