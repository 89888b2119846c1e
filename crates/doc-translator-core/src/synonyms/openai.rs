use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::SynonymProvider;
use crate::config::{ApiKey, SynonymConfig};
use crate::error::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str = "You are a helpful assistant that provides contextually appropriate \
synonyms for multiple languages (Telugu and English). Always respond with only a \
comma-separated list of synonyms, nothing else.";

/// OpenAI-compatible chat completions backend for synonym suggestions.
/// Works with: Groq, OpenAI, Ollama, llama.cpp server, etc.
pub struct OpenAiSynonymProvider {
    client: Client,
    /// Base URL for the API (e.g., "https://api.groq.com/openai/v1")
    pub api_base: String,
    /// Model identifier
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
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

impl OpenAiSynonymProvider {
    pub fn new(config: &SynonymConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::ConfigInvalid {
                field: "synonyms".to_string(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Create the user prompt for a word and its surrounding text
    fn create_prompt(word: &str, context: &str) -> String {
        format!(
            "You must provide synonyms in the SAME LANGUAGE as the given word.\n\n\
             Word: \"{word}\"\n\
             Context: \"{context}\"\n\n\
             Task: Provide 5-7 synonyms for the word \"{word}\" in the SAME language \
             (Telugu, Hindi, English, etc.). The synonyms must be in the exact same script \
             and language as the original word.\n\n\
             IMPORTANT:\n\
             - If the word is in Telugu (తెలుగు), provide Telugu synonyms only\n\
             - If the word is in English, provide English synonyms only\n\
             - Return ONLY a comma-separated list of synonyms\n\
             - NO explanations, NO numbering, NO extra text\n\n\
             Example format: word1, word2, word3\n\n\
             Synonyms:"
        )
    }
}

#[async_trait]
impl SynonymProvider for OpenAiSynonymProvider {
    fn name(&self) -> &'static str {
        "OpenAI Compatible"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn request(&self, credential: &ApiKey, word: &str, context: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user",
                    content: Self::create_prompt(word, context),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!("Synonym request for {:?} to {}", word, url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", credential.expose()))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Synonym request failed: {}", e);
                Error::SynonymRequest(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            warn!("Synonym API error: {} - {}", status, message);
            return Err(Error::SynonymRequest(format!(
                "API Error: {} - {}",
                status.as_u16(),
                message
            )));
        }

        // A malformed body counts as "no suggestions", not as a failure.
        match response.json::<ChatResponse>().await {
            Ok(chat) => Ok(chat
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .unwrap_or_default()),
            Err(e) => {
                warn!("Failed to parse synonym response: {}", e);
                Ok(String::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_word_and_context() {
        let prompt = OpenAiSynonymProvider::create_prompt("happy", "I am happy");
        assert!(prompt.contains("Word: \"happy\""));
        assert!(prompt.contains("Context: \"I am happy\""));
        assert!(prompt.ends_with("Synonyms:"));
    }

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "m",
            messages: vec![Message {
                role: "user",
                content: "hi".to_string(),
            }],
            temperature: 0.5,
            max_tokens: 150,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["max_tokens"], 150);
        assert_eq!(value["temperature"], 0.5);
    }
}
