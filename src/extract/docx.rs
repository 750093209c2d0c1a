//! DOCX paragraph extraction
//!
//! Reads `word/document.xml` out of the package and returns the text of each
//! body-level paragraph, one per line. Paragraphs inside tables, text boxes and
//! headers are not part of the body and are skipped.

use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use super::ExtractError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract body paragraphs from DOCX bytes, joined by newlines
pub fn extract_paragraphs(content: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(content))?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;

    Ok(paragraphs_from_xml(&xml)?.join("\n"))
}

/// Walk the main document part and collect paragraph texts in order
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);

    // Local names of currently open elements
    let mut stack: Vec<Vec<u8>> = Vec::new();
    // Index in `stack` of the open body paragraph, if any
    let mut paragraph_at: Option<usize> = None;
    let mut current = String::new();
    let mut paragraphs = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"p" && paragraph_at.is_none() && parent_is(&stack, b"body") {
                    paragraph_at = Some(stack.len());
                    current.clear();
                } else if let Some(at) = paragraph_at {
                    if is_run(&stack, at) {
                        push_run_marker(&e, &mut current);
                    }
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"p" && paragraph_at.is_none() && parent_is(&stack, b"body") {
                    paragraphs.push(String::new());
                } else if let Some(at) = paragraph_at {
                    if is_run(&stack, at) {
                        push_run_marker(&e, &mut current);
                    }
                }
            }
            Event::Text(t) => {
                if let Some(at) = paragraph_at {
                    if is_run_text(&stack, at) {
                        current.push_str(&t.unescape()?);
                    }
                }
            }
            Event::CData(t) => {
                if let Some(at) = paragraph_at {
                    if is_run_text(&stack, at) {
                        current.push_str(&String::from_utf8_lossy(&t));
                    }
                }
            }
            Event::End(_) => {
                stack.pop();
                if paragraph_at == Some(stack.len()) {
                    paragraphs.push(std::mem::take(&mut current));
                    paragraph_at = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn parent_is(stack: &[Vec<u8>], name: &[u8]) -> bool {
    stack.last().is_some_and(|top| top == name)
}

/// Index of the run element enclosing the top of the stack, if the top is a
/// run directly in the paragraph or in one of its hyperlinks
fn run_index(stack: &[Vec<u8>], paragraph_at: usize) -> Option<usize> {
    let direct = paragraph_at + 1;
    match stack.get(direct).map(Vec::as_slice) {
        Some(b"r") => Some(direct),
        Some(b"hyperlink") if matches!(stack.get(direct + 1).map(Vec::as_slice), Some(b"r")) => {
            Some(direct + 1)
        }
        _ => None,
    }
}

/// The top of the stack is a run in the open paragraph
fn is_run(stack: &[Vec<u8>], paragraph_at: usize) -> bool {
    run_index(stack, paragraph_at).is_some_and(|run| run + 1 == stack.len())
}

/// The top of the stack is a `t` element of a run in the open paragraph
fn is_run_text(stack: &[Vec<u8>], paragraph_at: usize) -> bool {
    run_index(stack, paragraph_at)
        .is_some_and(|run| run + 2 == stack.len() && parent_is(stack, b"t"))
}

/// Render run-level markers (tabs, breaks) as text
fn push_run_marker(element: &BytesStart<'_>, out: &mut String) {
    match element.local_name().as_ref() {
        b"tab" | b"ptab" => out.push('\t'),
        b"cr" => out.push('\n'),
        b"noBreakHyphen" => out.push('-'),
        b"br" => {
            // Page and column breaks carry no text
            let break_type = element
                .attributes()
                .flatten()
                .find(|attr| attr.key.local_name().as_ref() == b"type")
                .map(|attr| attr.value.into_owned());
            match break_type.as_deref() {
                None | Some(b"textWrapping") => out.push('\n'),
                Some(_) => {}
            }
        }
        _ => {}
    }
}
