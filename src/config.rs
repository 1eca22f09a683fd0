//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Engine configuration.
///
/// The demo message limit is the one externally tunable knob
/// (`LEADBOT_DEMO_LIMIT`); everything else has fixed defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum accepted demo messages per session before the gate locks.
    pub demo_message_limit: u32,
    /// How many trailing demo turns are forwarded to the provider.
    pub demo_context_turns: usize,
    /// Upper bound on a single completion call before it fails fast.
    pub provider_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            demo_message_limit: 10,
            demo_context_turns: 6,
            provider_timeout: Duration::from_secs(30),
        }
    }
}

impl EngineConfig {
    /// Build a config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("LEADBOT_DEMO_LIMIT") {
            config.demo_message_limit =
                raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "LEADBOT_DEMO_LIMIT".to_string(),
                    message: format!("not a non-negative integer: {raw}"),
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate invariants that env parsing alone cannot catch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.demo_message_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "LEADBOT_DEMO_LIMIT".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }
        if self.demo_context_turns == 0 {
            return Err(ConfigError::InvalidValue {
                key: "demo_context_turns".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
