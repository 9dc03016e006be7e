//! OpenAI-compatible chat completions client
//!
//! Speaks the `/chat/completions` wire format, so any provider exposing an
//! OpenAI-compatible endpoint works. The configuration defaults point at
//! Gemini's compatibility endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;
use crate::error::{GenerationError, Result};
use crate::generation::TextGenerator;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// [`TextGenerator`] backed by an OpenAI-compatible HTTP endpoint
pub struct OpenAiCompatGenerator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenAiCompatGenerator {
    /// Build a generator from configuration, reading the API key from the
    /// environment variable the config names.
    ///
    /// Fails when the key is missing so the problem surfaces at startup
    /// instead of on the first question.
    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| GenerationError::MissingApiKey(config.api_key_env.clone()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(
            "Sending generation request to {} (model '{}')",
            self.endpoint,
            self.model
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(GenerationError::ApiFailure {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::RequestFailed(format!("Invalid response body: {}", e)))?;

        let answer = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(GenerationError::EmptyResponse)?
            .message
            .content;

        Ok(answer.trim().to_string())
    }
}
