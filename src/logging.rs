//! Request logging utilities
//!
//! Provides structured logging with short correlation IDs for tokenize
//! requests, and records the matching request metrics.

use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::metrics::{record_request, record_tokens};
use crate::tokens::Encoding;

/// Context for tracking a request through the system
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request (for log correlation)
    pub trace_id: String,
    /// When the request started
    pub start_time: Instant,
    /// Endpoint being called
    pub endpoint: &'static str,
    /// Model name the caller asked for
    pub model: Option<String>,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string()[..8].to_string(), // Short ID for readability
            start_time: Instant::now(),
            endpoint,
            model: None,
        }
    }

    /// Set the model for this request
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Log the incoming request
    pub fn log_request(&self, payload_bytes: usize) {
        debug!(
            trace_id = %self.trace_id,
            endpoint = %self.endpoint,
            model = ?self.model,
            payload_bytes = payload_bytes,
            "Tokenize request received"
        );
    }

    /// Log a completed request and record its metrics
    pub fn log_success(&self, encoding: Encoding, token_count: usize) {
        let elapsed = self.start_time.elapsed();
        info!(
            trace_id = %self.trace_id,
            endpoint = %self.endpoint,
            model = ?self.model,
            encoding = %encoding,
            token_count = token_count,
            latency_ms = elapsed.as_millis() as u64,
            "Tokenize request completed"
        );
        record_request(self.endpoint, "ok", elapsed.as_secs_f64());
        record_tokens(self.endpoint, encoding.name(), token_count as u64);
    }

    /// Log a failed request and record its metrics
    pub fn log_error(&self, error: &dyn std::fmt::Display) {
        warn!(
            trace_id = %self.trace_id,
            endpoint = %self.endpoint,
            model = ?self.model,
            latency_ms = self.elapsed_ms(),
            error = %error,
            "Tokenize request failed"
        );
        record_request(self.endpoint, "error", self.start_time.elapsed().as_secs_f64());
    }
}
