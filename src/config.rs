//! Configuration management for Tally
//!
//! Configuration is loaded from environment variables.

use anyhow::{Context, Result};
use std::env;

/// Cross-origin policy applied to every route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Any origin, any method, any header, credentials allowed (development posture)
    Permissive,
    /// No CORS headers are emitted
    Disabled,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Upper bound for request bodies (uploads); `None` means unlimited
    pub max_upload_bytes: Option<usize>,

    /// Cross-origin policy
    pub cors: CorsPolicy,

    /// Emit logs as JSON lines instead of the human-readable format
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            host: env::var("TALLY_HOST").unwrap_or(defaults.host),
            port: match env::var("TALLY_PORT") {
                Ok(v) => v.parse().context("Invalid TALLY_PORT")?,
                Err(_) => defaults.port,
            },

            max_upload_bytes: match env::var("TALLY_MAX_UPLOAD_BYTES") {
                Ok(v) => Some(v.parse().context("Invalid TALLY_MAX_UPLOAD_BYTES")?),
                Err(_) => defaults.max_upload_bytes,
            },

            cors: match env::var("TALLY_CORS_PERMISSIVE") {
                Ok(v) if is_falsy(&v) => CorsPolicy::Disabled,
                _ => CorsPolicy::Permissive,
            },

            log_json: env::var("TALLY_LOG_JSON")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.log_json),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: None,
            cors: CorsPolicy::Permissive,
            log_json: false,
        }
    }
}

fn is_falsy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no" | "off")
}
