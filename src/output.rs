//! CLI output formatting for the `transform` command.
//!
//! # Output Format
//!
//! ```text
//! cat.png → cat.processed.webp
//!     Original: 1000x500 image/png, 48.2 KB
//!     Processed: 300x150 image/webp, 9.1 KB (quality 50)
//!     Saved: 81%
//! ```
//!
//! Errors print as:
//!
//! ```text
//! VALIDATION_ERROR: unsupported media type
//!     declared type 'text/plain' is not an image/* type
//! ```
//!
//! # Architecture
//!
//! Each `format_*` function returns `Vec<String>` for testability, and a
//! `print_*` wrapper writes to stdout/stderr. Format functions are pure:
//! no I/O, no side effects.

use crate::imaging::Dimensions;
use crate::pipeline::{PipelineError, Processed};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte size: `512 B`, `48.2 KB`, `3.1 MB`.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

/// Format a successful transform.
///
/// `original` is the source geometry when known (the pipeline does not
/// report it; the CLI identifies the input separately).
pub fn format_transform_output(
    processed: &Processed,
    original: Option<Dimensions>,
    output_path: &Path,
) -> Vec<String> {
    let file = &processed.file;
    let result = &processed.result;
    let output_name = output_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| output_path.display().to_string());

    let mut lines = vec![format!("{} → {}", file.original_name, output_name)];

    let geometry = original
        .map(|d| format!("{}x{} ", d.width, d.height))
        .unwrap_or_default();
    lines.push(format!(
        "{}Original: {}{}, {}",
        indent(1),
        geometry,
        file.declared_media_type,
        format_size(file.size_bytes)
    ));
    lines.push(format!(
        "{}Processed: {}x{} {}, {} (quality {})",
        indent(1),
        result.width,
        result.height,
        result.media_type(),
        format_size(result.size_bytes() as u64),
        processed.config.quality.value()
    ));
    if let Some(requested) = &processed.config.unrecognized_format {
        lines.push(format!(
            "{}Ignored format: {} (kept {})",
            indent(1),
            requested,
            result.output_format
        ));
    }
    if file.size_bytes > 0 {
        let saved = 100.0 - (result.size_bytes() as f64 / file.size_bytes as f64 * 100.0);
        if saved >= 0.0 {
            lines.push(format!("{}Saved: {:.0}%", indent(1), saved));
        } else {
            lines.push(format!("{}Grew: {:.0}%", indent(1), -saved));
        }
    }

    lines
}

/// Format a pipeline failure.
pub fn format_error(err: &PipelineError) -> Vec<String> {
    let mut lines = vec![format!("{}: {}", err.kind().code(), err)];
    if let Some(detail) = err.detail() {
        lines.push(format!("{}{}", indent(1), detail));
    }
    lines
}

pub fn print_transform_output(processed: &Processed, original: Option<Dimensions>, output_path: &Path) {
    for line in format_transform_output(processed, original, output_path) {
        println!("{}", line);
    }
}

pub fn print_error(err: &PipelineError) {
    for line in format_error(err) {
        eprintln!("{}", line);
    }
}
