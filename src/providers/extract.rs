/*!
 * In-process text extraction for document payloads.
 *
 * Supported media types:
 * - `text/` types: decoded as UTF-8
 * - `text/html`: visible text, skipping script and style subtrees
 * - DOCX: paragraphs of `word/document.xml`
 *
 * PDF and legacy Word files need an external extraction service and are
 * reported as unsupported.
 */

use std::io::{Cursor, Read};

use async_trait::async_trait;
use kuchiki::traits::*;
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::errors::ProviderError;
use crate::providers::TextExtractor;
use crate::translation::model::BinaryPayload;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Extractor for formats that can be read without an external service
#[derive(Debug, Clone, Default)]
pub struct BasicExtractor;

impl BasicExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for BasicExtractor {
    async fn extract_text(&self, payload: &BinaryPayload) -> Result<String, ProviderError> {
        let media_type = payload.media_type.trim().to_ascii_lowercase();
        match media_type.as_str() {
            "text/html" => {
                let html = decode_utf8(&payload.bytes)?;
                Ok(html_visible_text(&html))
            }
            DOCX_MIME => docx_text(&payload.bytes),
            m if m.starts_with("text/") => decode_utf8(&payload.bytes),
            other => Err(ProviderError::Unsupported(format!(
                "no text extractor for media type '{}'",
                other
            ))),
        }
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<String, ProviderError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| ProviderError::ParseError(format!("payload is not valid UTF-8: {}", e)))
}

/// Whether an element's subtree never renders text
pub(crate) fn is_hidden_element(name: &str) -> bool {
    matches!(name, "script" | "style" | "noscript" | "template")
}

/// Visible text of an HTML document, one non-empty text node per line
pub fn html_visible_text(html: &str) -> String {
    let document = kuchiki::parse_html().one(html);
    let mut lines = Vec::new();

    for node in document.descendants() {
        let Some(text) = node.as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .as_element()
                .is_some_and(|element| is_hidden_element(element.name.local.as_ref()))
        });
        if hidden {
            continue;
        }
        let value = text.borrow();
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }

    lines.join("\n")
}

/// Paragraph text of a DOCX archive
fn docx_text(bytes: &[u8]) -> Result<String, ProviderError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ProviderError::ParseError(format!("failed to read docx archive: {}", e)))?;
    let mut xml = Vec::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ProviderError::ParseError(format!("docx has no document part: {}", e)))?
        .read_to_end(&mut xml)
        .map_err(|e| ProviderError::ParseError(format!("failed to read docx document part: {}", e)))?;

    let mut reader = Reader::from_reader(Cursor::new(xml));
    reader.trim_text(false);
    let mut buf = Vec::new();
    let mut in_text = false;
    let mut paragraphs = Vec::new();
    let mut current = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == b"w:t" {
                    in_text = true;
                }
            }
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" => current.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    if !current.trim().is_empty() {
                        paragraphs.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    let text = e
                        .unescape()
                        .map_err(|err| ProviderError::ParseError(format!("bad docx text: {}", err)))?;
                    current.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ProviderError::ParseError(format!(
                    "failed to parse docx xml at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
        buf.clear();
    }

    if !current.trim().is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs.join("\n"))
}
