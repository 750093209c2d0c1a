//! Token counting module
//!
//! Resolves model names to tiktoken encodings and encodes text with them.

pub mod resolver;

pub use resolver::{resolve_encoding, EncoderRegistry, Encoding, FALLBACK_ENCODING};
