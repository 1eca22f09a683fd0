//! Anthropic Messages API adapter.
//!
//! System messages go in the top-level `system` field, not the messages
//! array. Anthropic has no JSON output mode, so `structured` requests rely
//! on prompt instructions alone.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::error::ProviderError;
use crate::llm::provider::{CompletionRequest, CompletionResponse, LlmProvider, Role};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Completion provider backed by the Anthropic Messages API.
pub struct AnthropicProvider {
    api_key: SecretString,
    model: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(
        api_key: SecretString,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::RequestFailed {
                provider: "anthropic".to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            api_key,
            model: model.into(),
            base_url: "https://api.anthropic.com".to_string(),
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
        let mut system_parts: Vec<&str> = Vec::new();
        let mut api_messages: Vec<Value> = Vec::new();

        for message in &request.messages {
            let role = match message.role {
                Role::System => {
                    system_parts.push(&message.content);
                    continue;
                }
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            match api_messages.last_mut() {
                // The Messages API requires alternating roles; a transcript
                // can hold back-to-back user turns after a failed call, so
                // same-role neighbors are merged into one message.
                Some(last) if last["role"] == role => {
                    let merged = format!(
                        "{}\n\n{}",
                        last["content"].as_str().unwrap_or_default(),
                        message.content
                    );
                    last["content"] = Value::String(merged);
                }
                _ => api_messages.push(serde_json::json!({
                    "role": role,
                    "content": message.content,
                })),
            }
        }

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": api_messages,
            "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        });

        if !system_parts.is_empty() {
            body["system"] = Value::String(system_parts.join("\n\n"));
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }

        body
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout {
                provider: "anthropic".to_string(),
                timeout: self.timeout,
            }
        } else {
            ProviderError::RequestFailed {
                provider: "anthropic".to_string(),
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let body = self.build_body(&request);
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::AuthFailed {
                provider: "anthropic".to_string(),
            });
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ProviderError::RequestFailed {
                provider: "anthropic".to_string(),
                reason: format!("HTTP {status}: {detail}"),
            });
        }

        let parsed: Value =
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    provider: "anthropic".to_string(),
                    reason: format!("body was not JSON: {e}"),
                })?;

        let content = parsed["content"]
            .as_array()
            .and_then(|blocks| {
                blocks
                    .iter()
                    .find_map(|block| block["text"].as_str().map(str::to_string))
            })
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: "anthropic".to_string(),
                reason: "no text content block in response".to_string(),
            })?;

        Ok(CompletionResponse { content })
    }
}
