//! PDF text extraction
//!
//! Text is pulled page by page in page order with `lopdf`. A page without a
//! readable text layer contributes an empty string. lopdf closes every text
//! object with a newline; that trailing newline is dropped so pages are
//! separated by exactly one `\n`.

use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::debug;

use super::ExtractError;

/// Extract the text of every page, joined by newlines
pub fn extract_pages(content: &[u8]) -> Result<String, ExtractError> {
    // lopdf can panic on malformed object streams
    panic::catch_unwind(AssertUnwindSafe(|| extract_pages_inner(content))).unwrap_or_else(
        |payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(ExtractError::Panicked(message))
        },
    )
}

fn extract_pages_inner(content: &[u8]) -> Result<String, ExtractError> {
    let document = Document::load_mem(content)?;

    let pages: Vec<String> = document
        .get_pages()
        .into_keys()
        .map(|page_number| {
            match document.extract_text(&[page_number]) {
                Ok(mut text) => {
                    if text.ends_with('\n') {
                        text.pop();
                    }
                    text
                }
                Err(e) => {
                    debug!(page = page_number, error = %e, "No extractable text on page");
                    String::new()
                }
            }
        })
        .collect();

    Ok(pages.join("\n"))
}
