//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the dimensions of a "fit inside" resize.
///
/// Scales `source` so it fits within the bounding box described by `bounds`
/// while keeping its aspect ratio. A missing bound leaves that axis
/// unconstrained; the other axis is derived proportionally. When both bounds
/// are given the smaller scale factor wins, so the limiting axis lands exactly
/// on its bound.
///
/// Never enlarges: if the scale factor would be ≥ 1.0, or no bound is given,
/// `source` is returned unchanged.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bounds` - Requested (width, height) bounds, each optional
///
/// # Returns
/// * `(width, height)` - Output dimensions, each at least 1
///
/// # Examples
/// ```
/// # use imgpress::imaging::calculate_fit_dimensions;
/// // 1000x500 constrained to width 300 → 300x150
/// assert_eq!(calculate_fit_dimensions((1000, 500), (Some(300), None)), (300, 150));
///
/// // Never upscales
/// assert_eq!(calculate_fit_dimensions((200, 100), (Some(800), None)), (200, 100));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (Option<u32>, Option<u32>)) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 {
        return source;
    }

    let scale_w = bounds.0.map(|w| w as f64 / src_w as f64);
    let scale_h = bounds.1.map(|h| h as f64 / src_h as f64);

    let (scale, width_limits) = match (scale_w, scale_h) {
        (Some(sw), Some(sh)) => (sw.min(sh), sw <= sh),
        (Some(sw), None) => (sw, true),
        (None, Some(sh)) => (sh, false),
        (None, None) => return source,
    };

    if scale >= 1.0 {
        return source;
    }

    if width_limits {
        // Width is the limiting axis: pin it to the bound exactly
        let w = bounds.0.unwrap_or(src_w);
        let h = (src_h as f64 * scale).round().max(1.0) as u32;
        (w, h)
    } else {
        let h = bounds.1.unwrap_or(src_h);
        let w = (src_w as f64 * scale).round().max(1.0) as u32;
        (w, h)
    }
}
