//! Completion provider integration.
//!
//! Supports:
//! - **Anthropic**: Messages API over reqwest
//! - **OpenAI**: chat-completions API over reqwest
//!
//! Both adapters carry a bounded request timeout so a hung upstream call
//! fails fast into `ProviderError` instead of stalling a session.

mod anthropic;
mod openai;
pub mod provider;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use provider::{ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, Role};

use std::sync::Arc;
use std::time::Duration;

use crate::error::ProviderError;

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    Anthropic,
    OpenAi,
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
    pub timeout: Duration,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, ProviderError> {
    let provider: Arc<dyn LlmProvider> = match config.backend {
        LlmBackend::Anthropic => Arc::new(AnthropicProvider::new(
            config.api_key.clone(),
            &config.model,
            config.timeout,
        )?),
        LlmBackend::OpenAi => Arc::new(OpenAiProvider::new(
            config.api_key.clone(),
            &config.model,
            config.timeout,
        )?),
    };
    tracing::info!(model = %config.model, "completion provider ready");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_anthropic_provider() {
        let config = LlmConfig {
            backend: LlmBackend::Anthropic,
            api_key: secrecy::SecretString::from("test-key"),
            model: "claude-sonnet-4-20250514".to_string(),
            timeout: Duration::from_secs(5),
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model_name(), "claude-sonnet-4-20250514");
    }

    #[test]
    fn create_openai_provider() {
        let config = LlmConfig {
            backend: LlmBackend::OpenAi,
            api_key: secrecy::SecretString::from("sk-test"),
            model: "gpt-4o".to_string(),
            timeout: Duration::from_secs(5),
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model_name(), "gpt-4o");
    }
}
