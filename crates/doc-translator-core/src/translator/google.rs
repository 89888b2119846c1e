use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::{ProviderInfo, TranslationProvider, TranslationRequest, TranslationResult};
use crate::config::{ApiKey, Lang, ProviderConfig};
use crate::error::{Error, Result};

/// Google Cloud Translation (v2) compatible client.
///
/// Each call is one POST; the key travels as the `key` query parameter.
pub struct GoogleTranslator {
    client: Client,
    /// Endpoint URL (e.g., "https://translation.googleapis.com/language/translate/v2")
    pub api_base: String,
    /// Extra attempts for transient failures
    pub retry_count: u32,
    /// Delay between attempts
    pub retry_delay: Duration,
}

#[derive(Debug, Serialize)]
struct RequestBody<'a> {
    q: Query<'a>,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    format: &'static str,
}

/// A lone string is sent as a plain string, several as an array.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Query<'a> {
    One(&'a str),
    Many(&'a [String]),
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    data: ResponseData,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(default)]
    translations: Vec<ResponseTranslation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseTranslation {
    translated_text: String,
    #[serde(default)]
    detected_source_language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

impl GoogleTranslator {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::ConfigInvalid {
                field: "provider".to_string(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            retry_count: config.retry_count,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    fn body(request: &TranslationRequest) -> RequestBody<'_> {
        let q = match request.texts.as_slice() {
            [single] => Query::One(single),
            many => Query::Many(many),
        };
        RequestBody {
            q,
            target: request.target.as_str(),
            source: request.source.as_ref().map(Lang::as_str),
            format: "text",
        }
    }

    async fn request_once(
        &self,
        credential: &ApiKey,
        request: &TranslationRequest,
    ) -> Result<TranslationResult> {
        let response = self
            .client
            .post(&self.api_base)
            .query(&[("key", credential.expose())])
            .json(&Self::body(request))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = parse_error_message(&body);
            warn!("Translation API error: {} - {:?}", status, message);
            return Err(Error::provider_failure(Some(status.as_u16()), message));
        }

        let parsed: ResponseBody = response.json().await.map_err(|e| {
            if e.is_timeout() {
                Error::ProviderTimeout
            } else {
                Error::ProviderInvalidResponse(e.to_string())
            }
        })?;

        into_result(parsed, request.texts.len())
    }
}

#[async_trait]
impl TranslationProvider for GoogleTranslator {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Google Translate",
            supports_auto_detect: true,
        }
    }

    async fn translate(
        &self,
        credential: &ApiKey,
        request: &TranslationRequest,
    ) -> Result<TranslationResult> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(
                "Translation request attempt {}/{} with {} string(s)",
                attempt,
                self.retry_count + 1,
                request.texts.len()
            );

            match self.request_once(credential, request).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_transient() && attempt <= self.retry_count => {
                    warn!("Transient translation failure, retrying: {}", e);
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::ProviderTimeout
    } else {
        warn!("Request failed: {}", e);
        Error::provider_failure(None, Some(e.to_string()))
    }
}

fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.message)
}

fn into_result(body: ResponseBody, expected: usize) -> Result<TranslationResult> {
    let translations = body.data.translations;
    if translations.len() != expected {
        return Err(Error::LengthMismatch {
            expected,
            actual: translations.len(),
        });
    }

    let detected_source_language = translations
        .iter()
        .find_map(|t| t.detected_source_language.clone())
        .map(Lang::new);

    Ok(TranslationResult {
        translations: translations.into_iter().map(|t| t.translated_text).collect(),
        detected_source_language,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_text_is_sent_as_string_without_source() {
        let request = TranslationRequest::new(vec!["Hello world".into()], &Lang::auto(), &Lang::new("es"));
        let value = serde_json::to_value(GoogleTranslator::body(&request)).unwrap();
        assert_eq!(value, json!({"q": "Hello world", "target": "es", "format": "text"}));
    }

    #[test]
    fn test_batch_is_sent_as_array_with_source() {
        let request = TranslationRequest::new(vec!["a".into(), "b".into()], &Lang::new("en"), &Lang::new("te"));
        let value = serde_json::to_value(GoogleTranslator::body(&request)).unwrap();
        assert_eq!(
            value,
            json!({"q": ["a", "b"], "target": "te", "source": "en", "format": "text"})
        );
    }

    #[test]
    fn test_response_is_parsed_in_order() {
        let body: ResponseBody = serde_json::from_value(json!({
            "data": {"translations": [
                {"translatedText": "Hola mundo", "detectedSourceLanguage": "en"},
                {"translatedText": "Adiós"}
            ]}
        }))
        .unwrap();
        let result = into_result(body, 2).unwrap();
        assert_eq!(result.translations, vec!["Hola mundo", "Adiós"]);
        assert_eq!(result.detected_source_language, Some(Lang::new("en")));
    }

    #[test]
    fn test_short_response_is_a_length_mismatch() {
        let body: ResponseBody = serde_json::from_value(json!({
            "data": {"translations": [{"translatedText": "A"}]}
        }))
        .unwrap();
        assert!(matches!(
            into_result(body, 2),
            Err(Error::LengthMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            parse_error_message(r#"{"error": {"code": 400, "message": "Invalid target language"}}"#),
            Some("Invalid target language".to_string())
        );
        assert_eq!(parse_error_message("<html>Bad Gateway</html>"), None);
        assert_eq!(parse_error_message(r#"{"error": {"code": 500}}"#), None);
    }
}
