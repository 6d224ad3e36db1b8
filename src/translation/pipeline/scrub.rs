/*!
 * Sensitive-data redaction.
 *
 * Detectors run in a fixed order, each one on the output of the previous
 * one, so overlapping matches go to whichever category comes first:
 * CPF, CNPJ, email, phone, payment card.
 */

use async_trait::async_trait;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::TranslationError;
use crate::translation::excerpt;
use super::{PipelineContext, PipelineStage};

static CPF_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{3}\.?\d{3}\.?\d{3}-?\d{2}").expect("Invalid CPF regex")
});

static CNPJ_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{2}\.?\d{3}\.?\d{3}/?\d{4}-?\d{2}").expect("Invalid CNPJ regex")
});

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("Invalid email regex")
});

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(?\d{2}\)?\s?9?\d{4}-?\d{4}").expect("Invalid phone regex")
});

static CARD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}").expect("Invalid card regex")
});

pub const CPF_PLACEHOLDER: &str = "[CPF REDACTED]";
pub const CNPJ_PLACEHOLDER: &str = "[CNPJ REDACTED]";
pub const EMAIL_PLACEHOLDER: &str = "[EMAIL REDACTED]";
pub const PHONE_PLACEHOLDER: &str = "[PHONE REDACTED]";
pub const CARD_PLACEHOLDER: &str = "[CARD REDACTED]";

/// Detectors in application order
fn detectors() -> [(&'static Regex, &'static str); 5] {
    [
        (&*CPF_REGEX, CPF_PLACEHOLDER),
        (&*CNPJ_REGEX, CNPJ_PLACEHOLDER),
        (&*EMAIL_REGEX, EMAIL_PLACEHOLDER),
        (&*PHONE_REGEX, PHONE_PLACEHOLDER),
        (&*CARD_REGEX, CARD_PLACEHOLDER),
    ]
}

/// Redact every detector match; the flag is set when anything matched
pub fn scrub_text(text: &str) -> (String, bool) {
    let mut output = text.to_string();
    let mut found = false;
    for (regex, placeholder) in detectors() {
        if regex.is_match(&output) {
            found = true;
            output = regex.replace_all(&output, placeholder).into_owned();
        }
    }
    (output, found)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ScrubStage;

#[async_trait]
impl PipelineStage for ScrubStage {
    fn name(&self) -> &'static str {
        "RemoveSensitiveData"
    }

    async fn process(&self, mut ctx: PipelineContext) -> Result<PipelineContext, TranslationError> {
        if !ctx.options.remove_sensitive_data {
            info!("Sensitive data removal disabled");
            return Ok(ctx);
        }
        if ctx.is_binary() {
            debug!("Binary payload has no text to scrub");
            return Ok(ctx);
        }

        let mut found_count = 0;
        for i in 0..ctx.len() {
            let (scrubbed, found) = scrub_text(&ctx.unique_texts[i]);
            if found {
                debug!("Redacted sensitive data in '{}'", excerpt(&scrubbed));
                found_count += 1;
            }
            ctx.processed_texts[i] = scrubbed;
            ctx.had_sensitive_data[i] = found;
        }
        ctx.sensitive_data_removed = found_count;

        info!("Sensitive data found in {} of {} texts", found_count, ctx.len());
        Ok(ctx)
    }
}
