//! Request transform parameters and their resolution into a [`TransformConfig`].
//!
//! Resolution is lenient by default: a missing or malformed `width`/`height`
//! means "not specified", a missing or malformed `quality` means the default,
//! and an unknown `format` means "keep the original format". Nothing fails.
//!
//! [`ResolvePolicy::strict`] turns present-but-malformed values into
//! [`ParamError`]s instead.

use crate::imaging::{OutputFormat, Quality, TransformConfig};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid parameter")]
pub struct ParamError {
    pub name: &'static str,
    pub value: String,
}

/// Raw query-string values, exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawParams {
    pub width: Option<String>,
    pub height: Option<String>,
    pub quality: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvePolicy {
    pub default_quality: Quality,
    /// Reject malformed values instead of ignoring them.
    pub strict: bool,
}

impl Default for ResolvePolicy {
    fn default() -> Self {
        Self {
            default_quality: Quality::default(),
            strict: false,
        }
    }
}

/// A present value that did not parse. Empty strings count as absent.
enum Parsed<T> {
    Absent,
    Value(T),
    Malformed(String),
}

fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_dimension(raw: &Option<String>) -> Parsed<u32> {
    match present(raw) {
        None => Parsed::Absent,
        Some(s) => match s.parse::<u32>() {
            Ok(v) if v > 0 => Parsed::Value(v),
            _ => Parsed::Malformed(s.to_string()),
        },
    }
}

fn parse_quality(raw: &Option<String>) -> Parsed<Quality> {
    match present(raw) {
        None => Parsed::Absent,
        // Integers beyond i32 saturate; the codec layer clamps further
        Some(s) => match s.parse::<i64>() {
            Ok(v) => Parsed::Value(Quality::new(v.clamp(i32::MIN as i64, i32::MAX as i64) as i32)),
            Err(_) => Parsed::Malformed(s.to_string()),
        },
    }
}

impl<T> Parsed<T> {
    fn settle(self, name: &'static str, strict: bool) -> Result<Option<T>, ParamError> {
        match self {
            Parsed::Absent => Ok(None),
            Parsed::Value(v) => Ok(Some(v)),
            Parsed::Malformed(value) if strict => Err(ParamError { name, value }),
            Parsed::Malformed(_) => Ok(None),
        }
    }
}

/// Normalize raw parameters into a [`TransformConfig`].
///
/// Never fails unless `policy.strict` is set.
pub fn resolve(raw: &RawParams, policy: &ResolvePolicy) -> Result<TransformConfig, ParamError> {
    let width = parse_dimension(&raw.width).settle("width", policy.strict)?;
    let height = parse_dimension(&raw.height).settle("height", policy.strict)?;
    let quality = parse_quality(&raw.quality)
        .settle("quality", policy.strict)?
        .unwrap_or(policy.default_quality);

    let (output_format, unrecognized_format) = match present(&raw.format) {
        None => (None, None),
        Some(s) => match OutputFormat::from_param(s) {
            Some(format) => (Some(format), None),
            None if policy.strict => {
                return Err(ParamError {
                    name: "format",
                    value: s.to_string(),
                });
            }
            None => (None, Some(s.to_string())),
        },
    };

    Ok(TransformConfig {
        width,
        height,
        quality,
        output_format,
        unrecognized_format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(width: Option<&str>, height: Option<&str>, quality: Option<&str>, format: Option<&str>) -> RawParams {
        RawParams {
            width: width.map(String::from),
            height: height.map(String::from),
            quality: quality.map(String::from),
            format: format.map(String::from),
        }
    }

    fn lenient(params: RawParams) -> TransformConfig {
        resolve(&params, &ResolvePolicy::default()).unwrap()
    }

    fn strict() -> ResolvePolicy {
        ResolvePolicy {
            strict: true,
            ..Default::default()
        }
    }

    #[test]
    fn empty_params_resolve_to_defaults() {
        let config = lenient(RawParams::default());
        assert_eq!(config, TransformConfig::default());
        assert_eq!(config.quality.value(), 80);
    }

    #[test]
    fn numeric_values_are_parsed() {
        let config = lenient(raw(Some("300"), Some("200"), Some("55"), Some("png")));
        assert_eq!(config.width, Some(300));
        assert_eq!(config.height, Some(200));
        assert_eq!(config.quality.value(), 55);
        assert_eq!(config.output_format, Some(OutputFormat::Png));
    }

    #[test]
    fn malformed_dimensions_become_absent() {
        let config = lenient(raw(Some("abc"), Some("12px"), None, None));
        assert_eq!(config.width, None);
        assert_eq!(config.height, None);
    }

    #[test]
    fn zero_and_negative_dimensions_become_absent() {
        let config = lenient(raw(Some("0"), Some("-20"), None, None));
        assert_eq!(config.width, None);
        assert_eq!(config.height, None);
    }

    #[test]
    fn malformed_quality_falls_back_to_default() {
        let config = lenient(raw(None, None, Some("high"), None));
        assert_eq!(config.quality.value(), 80);
    }

    #[test]
    fn configured_default_quality_is_used() {
        let policy = ResolvePolicy {
            default_quality: Quality::new(65),
            strict: false,
        };
        let config = resolve(&RawParams::default(), &policy).unwrap();
        assert_eq!(config.quality.value(), 65);
    }

    #[test]
    fn out_of_range_quality_passes_through() {
        assert_eq!(lenient(raw(None, None, Some("150"), None)).quality.value(), 150);
        assert_eq!(lenient(raw(None, None, Some("0"), None)).quality.value(), 0);
        assert_eq!(lenient(raw(None, None, Some("-5"), None)).quality.value(), -5);
    }

    #[test]
    fn quality_beyond_i32_saturates() {
        assert_eq!(lenient(raw(None, None, Some("3000000000"), None)).quality.value(), i32::MAX);
        assert_eq!(lenient(raw(None, None, Some("-3000000000"), None)).quality.value(), i32::MIN);
        let config = resolve(&raw(None, None, Some("3000000000"), None), &strict()).unwrap();
        assert_eq!(config.quality.for_jpeg(), 100);
    }

    #[test]
    fn jpg_normalizes_to_jpeg() {
        let config = lenient(raw(None, None, None, Some("jpg")));
        assert_eq!(config.output_format, Some(OutputFormat::Jpeg));
        assert_eq!(config.output_format.unwrap().name(), "jpeg");
    }

    #[test]
    fn unknown_format_is_echoed_but_not_applied() {
        let config = lenient(raw(None, None, None, Some("WEBP")));
        assert_eq!(config.output_format, None);
        assert_eq!(config.unrecognized_format.as_deref(), Some("WEBP"));
    }

    #[test]
    fn blank_values_are_absent() {
        let config = lenient(raw(Some(""), Some("  "), Some(""), Some("")));
        assert_eq!(config, TransformConfig::default());
    }

    // =========================================================================
    // strict mode
    // =========================================================================

    #[test]
    fn strict_rejects_malformed_width() {
        let err = resolve(&raw(Some("wide"), None, None, None), &strict()).unwrap_err();
        assert_eq!(err.name, "width");
        assert_eq!(err.value, "wide");
    }

    #[test]
    fn strict_rejects_malformed_quality() {
        let err = resolve(&raw(None, None, Some("best"), None), &strict()).unwrap_err();
        assert_eq!(err.name, "quality");
    }

    #[test]
    fn strict_rejects_unknown_format() {
        let err = resolve(&raw(None, None, None, Some("bmp")), &strict()).unwrap_err();
        assert_eq!(err.name, "format");
    }

    #[test]
    fn strict_accepts_well_formed_and_absent_values() {
        let config = resolve(&raw(Some("10"), None, Some("90"), Some("webp")), &strict()).unwrap();
        assert_eq!(config.width, Some(10));
        assert_eq!(config.height, None);
        assert_eq!(config.output_format, Some(OutputFormat::Webp));
    }
}
