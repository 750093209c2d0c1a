//! Tally - token counting service for language-model prompts
//!
//! This library provides the core functionality for the Tally server: model
//! name to tokenizer resolution, text extraction from uploaded documents, and
//! the HTTP handlers that tie them together.

pub mod config;
pub mod docs;
pub mod error;
pub mod extract;
pub mod logging;
pub mod metrics;
pub mod routes;
pub mod tokens;

use std::time::Instant;

pub use crate::config::{Config, CorsPolicy};
pub use crate::extract::{extract_text, DocumentKind};
pub use crate::tokens::{resolve_encoding, EncoderRegistry, Encoding};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub start_time: Instant,
    /// Cached tiktoken encoders, shared by every request
    pub tokenizers: EncoderRegistry,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            tokenizers: EncoderRegistry::new(),
        }
    }
}
