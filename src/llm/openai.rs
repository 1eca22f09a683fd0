//! OpenAI chat-completions adapter.
//!
//! Unlike Anthropic, system messages ride in the messages array and
//! `structured` requests can use the native `json_object` response format.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::error::ProviderError;
use crate::llm::provider::{CompletionRequest, CompletionResponse, LlmProvider, Role};

/// Completion provider backed by the OpenAI chat-completions API.
pub struct OpenAiProvider {
    api_key: SecretString,
    model: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(
        api_key: SecretString,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::RequestFailed {
                provider: "openai".to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            api_key,
            model: model.into(),
            base_url: "https://api.openai.com".to_string(),
            timeout,
            client,
        })
    }

    /// Override the API base URL (for tests and proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_body(&self, request: &CompletionRequest) -> Value {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|message| {
                let role = match message.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                };
                serde_json::json!({ "role": role, "content": message.content })
            })
            .collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        if request.structured {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        body
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout {
                provider: "openai".to_string(),
                timeout: self.timeout,
            }
        } else {
            ProviderError::RequestFailed {
                provider: "openai".to_string(),
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let body = self.build_body(&request);
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::AuthFailed {
                provider: "openai".to_string(),
            });
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ProviderError::RequestFailed {
                provider: "openai".to_string(),
                reason: format!("HTTP {status}: {detail}"),
            });
        }

        let parsed: Value =
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    provider: "openai".to_string(),
                    reason: format!("body was not JSON: {e}"),
                })?;

        let content = parsed["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: "openai".to_string(),
                reason: "no message content in first choice".to_string(),
            })?;

        Ok(CompletionResponse { content })
    }
}
