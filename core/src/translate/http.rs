/// HTTP-backed translation engine for a local inference server
///
/// Speaks a minimal JSON batch protocol: `{"texts": [...], "source": ...,
/// "target": ...}` in, `{"translations": [...]}` out. Transient failures are
/// retried per the retry policy; a length mismatch is never retried because
/// it signals a protocol fault, not a hiccup.
use super::retry::{evaluate_retry, parse_retry_after, RetryError, RetryPolicy};
use super::{TranslationError, Translator};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    texts: &'a [String],
    source: &'a str,
    target: &'a str,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    translations: Vec<String>,
}

pub struct HttpTranslator {
    endpoint: String,
    source_lang: String,
    target_lang: String,
    client: reqwest::blocking::Client,
    policy: RetryPolicy,
}

impl HttpTranslator {
    /// Builds the client and probes the endpoint once. A probe failure means
    /// the engine is unavailable and the caller should degrade to
    /// passthrough.
    pub fn connect(
        endpoint: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Self, TranslationError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| TranslationError::Unavailable(e.to_string()))?;

        // Any HTTP response proves the service is reachable; only transport
        // errors count as unavailable.
        client
            .get(endpoint)
            .send()
            .map_err(|e| TranslationError::Unavailable(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            client,
            policy: RetryPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn request(&self, inputs: &[String]) -> Result<Vec<String>, (RetryError, String)> {
        let body = BatchRequest {
            texts: inputs,
            source: &self.source_lang,
            target: &self.target_lang,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| (RetryError::Network, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_hint = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| parse_retry_after(v, SystemTime::now()));
            return Err((
                RetryError::Http { status, retry_hint },
                format!("service returned {status}"),
            ));
        }

        let parsed: BatchResponse = response
            .json()
            .map_err(|e| (RetryError::Fatal, format!("malformed response: {e}")))?;
        Ok(parsed.translations)
    }
}

impl Translator for HttpTranslator {
    fn name(&self) -> &'static str {
        "http"
    }

    fn translate_batch(&mut self, inputs: &[String]) -> Result<Vec<String>, TranslationError> {
        let mut attempts = 0u32;
        loop {
            match self.request(inputs) {
                Ok(outputs) => {
                    if outputs.len() != inputs.len() {
                        return Err(TranslationError::LengthMismatch {
                            expected: inputs.len(),
                            actual: outputs.len(),
                        });
                    }
                    return Ok(outputs);
                }
                Err((error, message)) => {
                    let decision = evaluate_retry(error, self.policy, attempts);
                    if !decision.should_retry {
                        return Err(TranslationError::Failure(message));
                    }
                    log::warn!(
                        "translation batch failed ({message}), retrying in {:?}",
                        decision.delay
                    );
                    std::thread::sleep(decision.delay);
                    attempts += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let texts = vec!["Hello".to_string()];
        let body = BatchRequest {
            texts: &texts,
            source: "English",
            target: "Russian",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["texts"][0], "Hello");
        assert_eq!(json["source"], "English");
        assert_eq!(json["target"], "Russian");
    }

    #[test]
    fn response_body_shape() {
        let parsed: BatchResponse =
            serde_json::from_str(r#"{"translations": ["Привет"]}"#).unwrap();
        assert_eq!(parsed.translations, vec!["Привет"]);
    }
}
