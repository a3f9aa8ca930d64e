//! # imgpress
//!
//! A single-endpoint image transformation service. A client uploads a raster
//! image, optionally asks for a smaller size and/or a different format and
//! quality, and gets back the re-encoded image (base64, inline) together with
//! metadata about the original and the result.
//!
//! # Architecture: Four-Stage Pipeline
//!
//! Every request makes exactly one pass through four stages. Any stage can
//! stop the pass with an error; nothing partial is ever returned.
//!
//! ```text
//! 1. Validate   UploadedFile        →  ok | VALIDATION_ERROR   (declared metadata only)
//! 2. Resolve    query params        →  TransformConfig          (lenient by default)
//! 3. Transform  bytes + config      →  TransformResult | DECODE_ERROR | ENCODE_ERROR
//! 4. Assemble   file+config+result  →  JSON success / error payload
//! ```
//!
//! The pipeline holds no cross-request state. Its only inputs besides the
//! request are the static limits it was constructed with (max upload size,
//! default quality, parameter strictness, fallback codec).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`upload`] | `UploadedFile` and the upload validator (presence, size, media type) |
//! | [`query`] | Raw query parameters → [`imaging::TransformConfig`] |
//! | [`imaging`] | Transform engine: fit-inside resize math, codec selection, `image`/`webp` backend |
//! | [`response`] | Success and error payloads, base64 `data:` URL |
//! | [`pipeline`] | Stage orchestration, error kinds, HTTP status mapping |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`server`] | axum routes: `POST /process`, `GET /health`, `GET /` |
//! | [`output`] | Terminal formatting for the `transform` CLI command |
//!
//! # Design Decisions
//!
//! ## Fit Inside, Never Enlarge
//!
//! `width` and `height` describe a bounding box. The image is scaled by the
//! smaller of the implied factors so it fits on both axes, aspect ratio is
//! kept, and a factor above 1.0 leaves the image at its original size. See
//! [`imaging::calculate_fit_dimensions`].
//!
//! ## Read Back What Was Written
//!
//! The reported width, height, and format come from identifying the encoded
//! output, not from the numbers the resize was asked for.
//!
//! ## Lenient Parameters
//!
//! Malformed numeric parameters are ignored rather than rejected, and an
//! unknown `format` keeps the input format. `transform.strict_params = true`
//! flips this to 400 responses.

pub mod config;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod query;
pub mod response;
pub mod server;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;
