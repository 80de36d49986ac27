//! Chat-completions backend
//!
//! Speaks the OpenAI-compatible `/chat/completions` wire format used by
//! Perplexity and most hosted inference gateways.

use async_trait::async_trait;
use referral_agent_config::LlmSettings;
use referral_agent_core::{LanguageModel, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::LlmError;

/// OpenAI-compatible chat backend
#[derive(Clone)]
pub struct ChatBackend {
    client: Client,
    settings: LlmSettings,
}

impl ChatBackend {
    /// Create a new backend
    pub fn new(settings: LlmSettings) -> std::result::Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, settings })
    }

    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.settings.endpoint.trim_end_matches('/'))
    }

    /// Execute a single request (used by the retry loop)
    async fn execute_request(
        &self,
        request: &ChatRequest,
    ) -> std::result::Result<ChatResponse, LlmError> {
        let mut builder = self.client.post(self.api_url()).json(request);
        if let Some(key) = &self.settings.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            // 5xx errors are retryable, 4xx are not
            if status.is_server_error() {
                return Err(LlmError::Network(format!("Server error {status}: {error}")));
            }
            return Err(LlmError::Api(error));
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    fn is_retryable(error: &LlmError) -> bool {
        matches!(error, LlmError::Network(_) | LlmError::Timeout)
    }

    async fn complete_inner(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> std::result::Result<String, LlmError> {
        let request = ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            max_tokens: self.settings.max_tokens,
        };

        let mut last_error = None;
        let mut backoff = self.settings.initial_backoff();

        for attempt in 0..=self.settings.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    "LLM request failed, retrying in {:?} (attempt {}/{})",
                    backoff,
                    attempt,
                    self.settings.max_retries
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute_request(&request).await {
                Ok(result) => {
                    let content = result
                        .choices
                        .into_iter()
                        .next()
                        .map(|c| c.message.content)
                        .ok_or_else(|| {
                            LlmError::InvalidResponse("response contained no choices".to_string())
                        })?;
                    return Ok(content);
                }
                Err(e) if Self::is_retryable(&e) => {
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Network("Max retries exceeded".to_string())))
    }
}

#[async_trait]
impl LanguageModel for ChatBackend {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        Ok(self.complete_inner(system_prompt, user_prompt).await?)
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}

// Chat-completions wire types
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
