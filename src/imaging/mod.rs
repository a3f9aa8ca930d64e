//! Image transform engine — decode, fit-inside resize, re-encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader` (format sniffing + header dimensions) |
//! | **Resize** | Lanczos3 via `image::DynamicImage::resize_exact` |
//! | **Encode** | `image` (JPEG, PNG) and `webp` (lossy WebP) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, SourceInfo};
pub use calculations::calculate_fit_dimensions;
pub use operations::{TransformResult, plan_render, select_output_format, transform};
pub use params::{OutputFormat, Quality, RenderParams, TransformConfig};
pub use rust_backend::RustBackend;
