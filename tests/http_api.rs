//! HTTP surface tests: the axum router driven in-process with `tower::oneshot`.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{decode_data_url, jpeg, png, probe};
use image::ImageFormat;
use imgpress::pipeline::{Pipeline, PipelineConfig};
use imgpress::server::{AppState, router};
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "imgpress-test-boundary";
const BODY_LIMIT: usize = 32 * 1024 * 1024;

fn app_with_limit(limit: usize) -> Router {
    let state = AppState::new(Pipeline::new(PipelineConfig::default()), "test");
    router(state, limit)
}

fn app() -> Router {
    app_with_limit(BODY_LIMIT)
}

/// One multipart part: field name, optional filename, content type, bytes.
struct Part<'a> {
    field: &'a str,
    filename: Option<&'a str>,
    content_type: &'a str,
    data: Vec<u8>,
}

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let disposition = match part.filename {
            Some(name) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{name}\"\r\n",
                part.field
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.field),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload(field: &'static str, filename: &'static str, content_type: &'static str, data: Vec<u8>) -> Part<'static> {
    Part {
        field,
        filename: Some(filename),
        content_type,
        data,
    }
}

fn process_request(query: &str, parts: &[Part]) -> Request<Body> {
    let uri = if query.is_empty() {
        "/process".to_string()
    } else {
        format!("/process?{query}")
    };
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// =============================================================================
// Informational routes
// =============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let request = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["message"].is_string());
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn root_lists_endpoints() {
    let request = Request::get("/").body(Body::empty()).unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], "test");
    assert_eq!(body["endpoints"]["process"], "/process (POST)");
    assert_eq!(body["endpoints"]["health"], "/health");
}

// =============================================================================
// POST /process
// =============================================================================

#[tokio::test]
async fn resizes_uploaded_png() {
    let request = process_request(
        "width=300",
        &[upload("image", "wide.png", "image/png", png(1000, 500))],
    );
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["original"]["nome"], "wide.png");
    assert_eq!(body["processed"]["largura"], 300);
    assert_eq!(body["processed"]["altura"], 150);
    assert_eq!(body["processed"]["formato"], "png");

    let (media_type, bytes) = decode_data_url(body["image"].as_str().unwrap());
    assert_eq!(media_type, "image/png");
    assert_eq!(probe(&bytes), (ImageFormat::Png, 300, 150));
}

#[tokio::test]
async fn converts_to_webp() {
    let request = process_request(
        "format=webp&quality=50",
        &[upload("image", "photo.jpg", "image/jpeg", jpeg(120, 80))],
    );
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processed"]["tipo"], "image/webp");
    assert_eq!(body["processed"]["qualidade"], 50);
}

#[tokio::test]
async fn file_field_is_accepted() {
    let request = process_request("", &[upload("file", "a.png", "image/png", png(20, 20))]);
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["original"]["nome"], "a.png");
}

#[tokio::test]
async fn other_fields_are_skipped() {
    let request = process_request(
        "",
        &[
            Part {
                field: "caption",
                filename: None,
                content_type: "text/plain",
                data: b"holiday".to_vec(),
            },
            upload("image", "a.png", "image/png", png(20, 20)),
        ],
    );
    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_file_is_400() {
    let request = process_request(
        "",
        &[Part {
            field: "caption",
            filename: None,
            content_type: "text/plain",
            data: b"no image here".to_vec(),
        }],
    );
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no file provided");
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn empty_file_input_counts_as_missing() {
    let request = process_request("", &[upload("image", "", "application/octet-stream", Vec::new())]);
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no file provided");
}

#[tokio::test]
async fn non_multipart_body_is_missing_file() {
    let request = Request::post("/process")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no file provided");
}

#[tokio::test]
async fn non_image_type_is_400() {
    let request = process_request(
        "",
        &[upload("image", "notes.txt", "text/plain", b"hello".to_vec())],
    );
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unsupported media type");
}

#[tokio::test]
async fn oversized_upload_is_400() {
    let request = process_request(
        "",
        &[upload("image", "big.png", "image/png", vec![0u8; 15 * 1024 * 1024])],
    );
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "payload too large");
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn body_over_transport_limit_is_400() {
    let request = process_request(
        "",
        &[upload("image", "big.png", "image/png", vec![0u8; 64 * 1024])],
    );
    let (status, body) = send(app_with_limit(1024), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn repeated_query_key_gets_json_error() {
    let request = process_request(
        "width=10&width=20",
        &[upload("image", "a.png", "image/png", png(20, 20))],
    );
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "malformed query string");
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["details"].as_str().unwrap().contains("width"));
}

#[tokio::test]
async fn undecodable_image_is_500() {
    let request = process_request(
        "",
        &[upload("image", "fake.jpg", "image/jpeg", b"plain text, not a jpeg".to_vec())],
    );
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "DECODE_ERROR");
    assert!(body["details"].is_string());
}
