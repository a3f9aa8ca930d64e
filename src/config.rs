//! Service configuration module.
//!
//! Handles loading, validating, and merging a `config.toml`. User values are
//! layered key-by-key over the stock defaults, so a config file only needs
//! the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [server]
//! bind = "0.0.0.0:3000"        # Listen address (--port / PORT override the port)
//!
//! [limits]
//! max_upload_bytes = 10485760  # Largest accepted image (10 MiB)
//! max_request_bytes = 33554432 # Largest request body the transport will read
//!
//! [transform]
//! default_quality = 80         # Quality when the request gives none
//! strict_params = false        # Reject malformed width/height/quality/format
//! fallback_format = "png"      # Output codec for inputs we can't re-encode as-is
//!
//! [logging]
//! level = "info"               # tracing filter when RUST_LOG is unset
//! json = false                 # Emit JSON lines instead of human-readable logs
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{OutputFormat, Quality};
use crate::pipeline::PipelineConfig;
use crate::upload::DEFAULT_MAX_UPLOAD_BYTES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Service configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Listener settings.
    pub server: ServerConfig,
    /// Upload and request size limits.
    pub limits: LimitsConfig,
    /// Transform defaults and parameter policy.
    pub transform: TransformSettings,
    /// Log filter and format.
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "server.bind '{}' is not a socket address",
                self.server.bind
            )));
        }
        if self.limits.max_upload_bytes == 0 {
            return Err(ConfigError::Validation(
                "limits.max_upload_bytes must be non-zero".into(),
            ));
        }
        if self.limits.max_request_bytes < self.limits.max_upload_bytes {
            return Err(ConfigError::Validation(
                "limits.max_request_bytes must be >= limits.max_upload_bytes".into(),
            ));
        }
        if !(1..=100).contains(&self.transform.default_quality) {
            return Err(ConfigError::Validation(
                "transform.default_quality must be 1-100".into(),
            ));
        }
        Ok(())
    }

    /// The listen address. Valid after [`validate`](Self::validate).
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|e| ConfigError::Validation(format!("server.bind: {e}")))
    }

    /// Settings handed to the pipeline at construction.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_upload_bytes: self.limits.max_upload_bytes,
            default_quality: Quality::new(self.transform.default_quality),
            strict_params: self.transform.strict_params,
            fallback_format: self.transform.fallback_format,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Largest image accepted by the upload validator.
    pub max_upload_bytes: u64,
    /// Largest request body the HTTP layer will buffer. Must cover the image
    /// plus multipart framing, so it sits above `max_upload_bytes`.
    pub max_request_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_request_bytes: 32 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformSettings {
    /// Quality used when a request does not specify one.
    pub default_quality: i32,
    /// Reject malformed numeric parameters and unknown formats instead of
    /// ignoring them.
    pub strict_params: bool,
    /// Codec used when the input's own format can't be re-encoded.
    pub fallback_format: OutputFormat,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            default_quality: Quality::DEFAULT.value(),
            strict_params: false,
            fallback_format: OutputFormat::Png,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub level: String,
    /// JSON-formatted log lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ServiceConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ServiceConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ServiceConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the service config.
///
/// `None` yields the validated stock defaults. A given path must exist.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let overlay = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# imgpress Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# HTTP listener
# ---------------------------------------------------------------------------
[server]
# Listen address. `--port` or the PORT environment variable replace the port.
bind = "0.0.0.0:3000"

# ---------------------------------------------------------------------------
# Size limits
# ---------------------------------------------------------------------------
[limits]
# Largest image the processing endpoint accepts (bytes). Default 10 MiB.
max_upload_bytes = 10485760
# Largest request body the HTTP layer will read (bytes). Must be at least
# max_upload_bytes; the slack covers multipart framing so oversized images
# get a proper "payload too large" response.
max_request_bytes = 33554432

# ---------------------------------------------------------------------------
# Transform defaults
# ---------------------------------------------------------------------------
[transform]
# Encoding quality when the request has no `quality` parameter (1-100).
default_quality = 80
# When false, malformed width/height/quality values are ignored and unknown
# formats keep the original format. When true, they are rejected with 400.
strict_params = false
# Output codec for inputs whose own format can't be re-encoded (GIF, TIFF,
# BMP) when no `format` parameter is given: "jpeg", "png", or "webp".
fallback_format = "png"

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# tracing filter directive, used when RUST_LOG is not set.
level = "info"
# Emit JSON lines instead of human-readable output.
json = false
"##
}
