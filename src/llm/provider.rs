//! Provider-agnostic completion types and the `LlmProvider` trait.

use async_trait::async_trait;

use crate::error::ProviderError;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a completion request.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A completion request: ordered transcript plus generation knobs.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Ask the provider to constrain output to a JSON object where the
    /// backend supports it. Callers must still treat the output as untrusted.
    pub structured: bool,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            max_tokens: None,
            temperature: None,
            structured: false,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn structured(mut self) -> Self {
        self.structured = true;
        self
    }
}

/// One assistant turn returned by a provider.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
}

/// The completion capability consumed by the wizard and demo assistant.
///
/// Implementations must bound their own request time so a hung upstream
/// call fails into `ProviderError` instead of stalling the session.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// The model identifier this provider targets.
    fn model_name(&self) -> &str;

    /// Run one completion over the given transcript.
    async fn complete(&self, request: CompletionRequest)
    -> Result<CompletionResponse, ProviderError>;
}
