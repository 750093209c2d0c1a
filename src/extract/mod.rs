//! Text extraction from uploaded files
//!
//! Dispatches on the filename suffix and always produces a string: anything
//! that fails to parse degrades to empty text.

pub mod docx;
pub mod pdf;

use thiserror::Error;
use tracing::warn;

use crate::metrics::record_extraction_failure;

/// Suffixes decoded directly as UTF-8 text
const PLAIN_TEXT_SUFFIXES: &[&str] = &[
    ".txt", ".md", ".csv", ".json", ".py", ".js", ".html", ".css",
];

/// Errors raised by the document parsers
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("parser panicked: {0}")]
    Panicked(String),
}

/// Kind of document, decided by filename suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Docx,
    Pdf,
    Other,
}

impl DocumentKind {
    /// Classify a filename (suffix match is case-insensitive)
    pub fn from_filename(filename: &str) -> Self {
        let name = filename.to_lowercase();

        if PLAIN_TEXT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            DocumentKind::PlainText
        } else if name.ends_with(".docx") {
            DocumentKind::Docx
        } else if name.ends_with(".pdf") {
            DocumentKind::Pdf
        } else {
            DocumentKind::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::PlainText => "text",
            DocumentKind::Docx => "docx",
            DocumentKind::Pdf => "pdf",
            DocumentKind::Other => "other",
        }
    }
}

/// Extract the visible text of a file.
///
/// Never fails: undecodable bytes are dropped and unparseable documents
/// yield an empty string.
pub fn extract_text(filename: &str, content: &[u8]) -> String {
    let kind = DocumentKind::from_filename(filename);

    let extracted = match kind {
        DocumentKind::PlainText | DocumentKind::Other => Ok(decode_utf8_lossy_drop(content)),
        DocumentKind::Docx => docx::extract_paragraphs(content),
        DocumentKind::Pdf => pdf::extract_pages(content),
    };

    extracted.unwrap_or_else(|err| {
        warn!(
            filename = %filename,
            kind = kind.as_str(),
            error = %err,
            "Document could not be parsed, treating as empty text"
        );
        record_extraction_failure(kind.as_str());
        String::new()
    })
}

/// Decode UTF-8, silently dropping invalid byte sequences
pub fn decode_utf8_lossy_drop(content: &[u8]) -> String {
    let mut out = String::with_capacity(content.len());
    for chunk in content.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}
