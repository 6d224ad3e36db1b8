/*!
 * HTML strategy.
 *
 * Translated segments:
 * - every text node outside script, style, noscript and template subtrees
 *   (this includes the document title)
 * - `content` of `<meta name="description">`
 * - `alt` of images
 * - `placeholder` of inputs and textareas
 *
 * Markup and all other attributes are left as they are. A fragment is parsed
 * into a full document and written back without the wrapper. Head-only
 * elements such as `<title>` land in the head only while they come before any
 * body content; later ones stay in the body. Head children are therefore
 * written first without changing fragment order. Parsed trees cannot
 * be held across an await point, so the document is parsed once to collect
 * segments and once more to write the translations back; both walks visit
 * segments in the same order.
 */

use std::sync::Arc;

use async_trait::async_trait;
use kuchiki::traits::*;
use kuchiki::NodeRef;
use log::{debug, info};

use crate::errors::TranslationError;
use crate::providers::extract::is_hidden_element;
use crate::providers::TextTranslator;
use crate::resilience::ResiliencePolicy;
use crate::translation::model::{BinaryPayload, ContentType};
use super::{translate_segments, Translation, TranslationStrategy};

#[derive(Debug, Clone)]
pub struct HtmlStrategy {
    translator: Arc<dyn TextTranslator>,
    policy: ResiliencePolicy,
    concurrency: usize,
}

impl HtmlStrategy {
    pub fn new(translator: Arc<dyn TextTranslator>, policy: ResiliencePolicy, concurrency: usize) -> Self {
        Self {
            translator,
            policy,
            concurrency,
        }
    }

    /// Translate one HTML document or fragment
    pub async fn translate_html(
        &self,
        html: &str,
        source_language: &str,
        target_language: &str,
    ) -> Translation {
        let segments = collect_segments(html);
        debug!("Found {} translatable HTML segments", segments.len());
        if segments.is_empty() {
            return Translation::translated(html);
        }

        let translated = translate_segments(
            self.translator.as_ref(),
            &self.policy,
            self.concurrency,
            &segments,
            source_language,
            target_language,
        )
        .await;

        let fallback = translated.iter().any(|segment| segment.fallback);
        let texts: Vec<String> = translated.into_iter().map(|segment| segment.text).collect();
        Translation {
            text: apply_segments(html, &texts),
            fallback,
        }
    }
}

#[async_trait]
impl TranslationStrategy for HtmlStrategy {
    fn content_type(&self) -> ContentType {
        ContentType::Html
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<Translation>, TranslationError> {
        info!("Translating {} HTML texts using HtmlStrategy", texts.len());
        let mut output = Vec::with_capacity(texts.len());
        for html in texts {
            output.push(self.translate_html(html, source_language, target_language).await);
        }
        Ok(output)
    }

    async fn translate_binary(
        &self,
        payload: &BinaryPayload,
        source_language: &str,
        target_language: &str,
    ) -> Result<Translation, TranslationError> {
        let html = std::str::from_utf8(&payload.bytes)
            .map_err(|e| TranslationError::InvalidInput(format!("HTML payload is not valid UTF-8: {}", e)))?;
        Ok(self.translate_html(html, source_language, target_language).await)
    }
}

/// Attribute translated on an element, if any
fn translatable_attribute(node: &NodeRef) -> Option<&'static str> {
    let element = node.as_element()?;
    match element.name.local.as_ref() {
        "img" => Some("alt"),
        "input" | "textarea" => Some("placeholder"),
        "meta" => {
            let is_description = element
                .attributes
                .borrow()
                .get("name")
                .is_some_and(|name| name.eq_ignore_ascii_case("description"));
            is_description.then_some("content")
        }
        _ => None,
    }
}

fn in_hidden_subtree(node: &NodeRef) -> bool {
    node.ancestors().any(|ancestor| {
        ancestor
            .as_element()
            .is_some_and(|element| is_hidden_element(element.name.local.as_ref()))
    })
}

/// Visit every translatable, non-blank segment in document order
fn walk_segments(document: &NodeRef, mut visit: impl FnMut(&mut String)) {
    for node in document.descendants() {
        if in_hidden_subtree(&node) {
            continue;
        }
        if let Some(text) = node.as_text() {
            let mut value = text.borrow_mut();
            if !value.trim().is_empty() {
                visit(&mut *value);
            }
            continue;
        }
        if let Some(attribute) = translatable_attribute(&node) {
            if let Some(element) = node.as_element() {
                let mut attributes = element.attributes.borrow_mut();
                if let Some(value) = attributes.get_mut(attribute) {
                    if !value.trim().is_empty() {
                        visit(value);
                    }
                }
            }
        }
    }
}

/// Whether the input is a full document rather than a fragment
fn is_full_document(html: &str) -> bool {
    let lower = html.to_ascii_lowercase();
    lower.contains("<html") || lower.contains("<!doctype")
}

fn serialize(document: &NodeRef, full_document: bool) -> String {
    if full_document {
        return document.to_string();
    }
    // Fragments come back without the html/head/body wrapper the parser adds
    let mut output = String::new();
    if let Ok(head) = document.select_first("head") {
        for child in head.as_node().children() {
            output.push_str(&child.to_string());
        }
    }
    if let Ok(body) = document.select_first("body") {
        for child in body.as_node().children() {
            output.push_str(&child.to_string());
        }
    }
    output
}

/// Translatable segments of an HTML text, in document order
pub fn collect_segments(html: &str) -> Vec<String> {
    let document = kuchiki::parse_html().one(html);
    let mut segments = Vec::new();
    walk_segments(&document, |value| segments.push(value.clone()));
    segments
}

/// Write translated segments back into an HTML text.
///
/// `translations` must come from `collect_segments` on the same input.
pub fn apply_segments(html: &str, translations: &[String]) -> String {
    let document = kuchiki::parse_html().one(html);
    let mut next = translations.iter();
    walk_segments(&document, |value| {
        if let Some(translation) = next.next() {
            *value = translation.clone();
        }
    });
    serialize(&document, is_full_document(html))
}
