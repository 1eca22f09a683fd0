//! Error types for the lead engine.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Completion provider errors.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },
}

/// Lead sink errors. Non-fatal to the conversation — callers log and continue.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to open sink: {0}")]
    Open(String),

    #[error("Sink query failed: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors surfaced by the conversation engine to the inbound API.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Session {session_id} has not completed qualification")]
    DemoNotReady { session_id: String },
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, Error>;
