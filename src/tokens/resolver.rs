//! Tokenizer resolution
//!
//! Maps model names onto tiktoken encodings and keeps one built encoder per
//! encoding. Unknown model names resolve to `cl100k_base`.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use tiktoken_rs::{
    tokenizer::{get_tokenizer, Tokenizer},
    CoreBPE,
};

use crate::error::AppResult;

/// Encoding used when the catalog does not know a model name
pub const FALLBACK_ENCODING: Encoding = Encoding::Cl100kBase;

/// Model families newer than the tiktoken-rs table. Each entry matches the
/// exact name or the name followed by `-` (e.g. `o3-mini`, `gpt-4.1-nano`).
const MODEL_FAMILIES: &[(&str, Encoding)] = &[
    ("o1", Encoding::O200kBase),
    ("o3", Encoding::O200kBase),
    ("o4-mini", Encoding::O200kBase),
    ("gpt-5", Encoding::O200kBase),
    ("gpt-4.1", Encoding::O200kBase),
    ("gpt-4.5", Encoding::O200kBase),
    ("chatgpt-4o", Encoding::O200kBase),
];

/// A tiktoken vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    O200kBase,
    Cl100kBase,
    P50kBase,
    P50kEdit,
    R50kBase,
}

impl Encoding {
    /// Canonical tiktoken name of the encoding
    pub fn name(self) -> &'static str {
        match self {
            Encoding::O200kBase => "o200k_base",
            Encoding::Cl100kBase => "cl100k_base",
            Encoding::P50kBase => "p50k_base",
            Encoding::P50kEdit => "p50k_edit",
            Encoding::R50kBase => "r50k_base",
        }
    }

    fn build(self) -> anyhow::Result<CoreBPE> {
        match self {
            Encoding::O200kBase => tiktoken_rs::o200k_base(),
            Encoding::Cl100kBase => tiktoken_rs::cl100k_base(),
            Encoding::P50kBase => tiktoken_rs::p50k_base(),
            Encoding::P50kEdit => tiktoken_rs::p50k_edit(),
            Encoding::R50kBase => tiktoken_rs::r50k_base(),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve the encoding for a model name.
///
/// Known names (exact or by a known prefix such as `gpt-4o-2024-08-06`) use
/// their dedicated encoding; everything else gets [`FALLBACK_ENCODING`].
/// `MODEL_FAMILIES` is consulted before the tiktoken-rs table.
pub fn resolve_encoding(model: &str) -> Encoding {
    if let Some(encoding) = family_encoding(model) {
        return encoding;
    }

    match get_tokenizer(model) {
        Some(tokenizer) => from_tokenizer(tokenizer),
        None => {
            tracing::debug!(
                model = %model,
                fallback = %FALLBACK_ENCODING,
                "Unknown model, using fallback encoding"
            );
            FALLBACK_ENCODING
        }
    }
}

fn family_encoding(model: &str) -> Option<Encoding> {
    MODEL_FAMILIES
        .iter()
        .find(|(family, _)| match model.strip_prefix(*family) {
            Some(rest) => rest.is_empty() || rest.starts_with('-'),
            None => false,
        })
        .map(|&(_, encoding)| encoding)
}

#[allow(unreachable_patterns)]
fn from_tokenizer(tokenizer: Tokenizer) -> Encoding {
    match tokenizer {
        Tokenizer::O200kBase => Encoding::O200kBase,
        Tokenizer::Cl100kBase => Encoding::Cl100kBase,
        Tokenizer::P50kBase => Encoding::P50kBase,
        Tokenizer::P50kEdit => Encoding::P50kEdit,
        // gpt2 shares the r50k vocabulary
        Tokenizer::R50kBase | Tokenizer::Gpt2 => Encoding::R50kBase,
        _ => FALLBACK_ENCODING,
    }
}

/// Thread-safe cache of built encoders, keyed by encoding
///
/// Building a `CoreBPE` parses a whole vocabulary, so each one is built at most
/// once and shared. Cloning the registry shares the cache.
#[derive(Clone, Default)]
pub struct EncoderRegistry {
    encoders: Arc<RwLock<HashMap<Encoding, Arc<CoreBPE>>>>,
}

impl EncoderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the encoder for a model, building it on first use
    pub fn encoder_for(&self, model: &str) -> AppResult<(Encoding, Arc<CoreBPE>)> {
        let encoding = resolve_encoding(model);
        Ok((encoding, self.encoder(encoding)?))
    }

    /// Get or build the encoder for an encoding
    pub fn encoder(&self, encoding: Encoding) -> AppResult<Arc<CoreBPE>> {
        {
            let encoders = self
                .encoders
                .read()
                .map_err(|e| anyhow::anyhow!("Failed to acquire encoder cache lock: {}", e))?;
            if let Some(encoder) = encoders.get(&encoding) {
                return Ok(encoder.clone());
            }
        }

        // Built outside the lock; a concurrent build of the same encoding is
        // harmless since the first insert wins.
        let built = Arc::new(encoding.build()?);
        tracing::info!(encoding = %encoding, "Built tokenizer encoding");

        let mut encoders = self
            .encoders
            .write()
            .map_err(|e| anyhow::anyhow!("Failed to acquire encoder cache lock: {}", e))?;
        Ok(encoders.entry(encoding).or_insert(built).clone())
    }

    /// Encode text into token ids using the encoder for `model`
    pub fn encode(&self, model: &str, text: &str) -> AppResult<Vec<u32>> {
        let (_, encoder) = self.encoder_for(model)?;
        Ok(encode_with(&encoder, text))
    }

    /// Count tokens in a text string
    pub fn count_tokens(&self, model: &str, text: &str) -> AppResult<usize> {
        Ok(self.encode(model, text)?.len())
    }

    /// Encodings built so far
    pub fn loaded(&self) -> Vec<Encoding> {
        self.encoders
            .read()
            .map(|encoders| encoders.keys().copied().collect())
            .unwrap_or_default()
    }
}

/// Encode text, treating special-token markers as ordinary text
pub fn encode_with(encoder: &CoreBPE, text: &str) -> Vec<u32> {
    encoder
        .encode_ordinary(text)
        .into_iter()
        .map(|token| token as u32)
        .collect()
}
