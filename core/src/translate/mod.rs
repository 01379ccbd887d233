/// Translation engine boundary
///
/// The model is a black box: an ordered batch of plain strings goes in, a
/// same-length ordered batch comes out. Everything else (chunking, error
/// substitution, document rewriting) lives in the driver.
pub mod driver;
pub mod http;
pub mod retry;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translator reported an error: {0}")]
    Failure(String),

    #[error("translator returned {actual} outputs for {expected} inputs")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("translator unavailable: {0}")]
    Unavailable(String),
}

pub trait Translator: Send {
    fn name(&self) -> &'static str;

    /// Translates a batch, preserving order and length.
    fn translate_batch(&mut self, inputs: &[String]) -> Result<Vec<String>, TranslationError>;
}

/// Engine used when no model is reachable: every text passes through
/// unchanged, so downstream documents still get built with the original text
/// in both halves.
#[derive(Debug, Default)]
pub struct PassthroughTranslator;

impl Translator for PassthroughTranslator {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn translate_batch(&mut self, inputs: &[String]) -> Result<Vec<String>, TranslationError> {
        Ok(inputs.to_vec())
    }
}

/// Builds the configured HTTP engine, degrading to passthrough with a single
/// diagnostic when the endpoint cannot be reached.
pub fn engine_or_passthrough(
    endpoint: Option<&str>,
    source_lang: &str,
    target_lang: &str,
) -> Box<dyn Translator> {
    match endpoint {
        Some(endpoint) => match http::HttpTranslator::connect(endpoint, source_lang, target_lang) {
            Ok(translator) => Box::new(translator),
            Err(err) => {
                log::warn!("translation engine unavailable, falling back to passthrough: {err}");
                Box::new(PassthroughTranslator)
            }
        },
        None => Box::new(PassthroughTranslator),
    }
}
