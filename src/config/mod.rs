//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PET_TRIAGE` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use pet_triage::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Using {:?}", config.ai.provider);
//! ```

mod ai;
mod error;
mod logging;
mod turn;

pub use ai::{AiConfig, AiProvider, MAX_RETRIES};
pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use turn::TurnConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults; only the selected provider's API key is
/// required. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// AI provider configuration (OpenAI/Anthropic/mock)
    #[serde(default)]
    pub ai: AiConfig,

    /// Turn pipeline settings (reply timeout, closing phrases)
    #[serde(default)]
    pub turn: TurnConfig,

    /// Log format and filter
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PET_TRIAGE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PET_TRIAGE__AI__PROVIDER=openai` -> `ai.provider = openai`
    /// - `PET_TRIAGE__TURN__REPLY_TIMEOUT_SECS=90` -> `turn.reply_timeout_secs = 90`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PET_TRIAGE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.turn.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use std::time::Duration;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "PET_TRIAGE__AI__PROVIDER",
        "PET_TRIAGE__AI__ANTHROPIC_API_KEY",
        "PET_TRIAGE__AI__TIMEOUT_SECS",
        "PET_TRIAGE__TURN__REPLY_TIMEOUT_SECS",
        "PET_TRIAGE__TURN__CLOSING_PHRASES",
        "PET_TRIAGE__LOGGING__FORMAT",
    ];

    fn set_minimal_env() {
        env::set_var("PET_TRIAGE__AI__ANTHROPIC_API_KEY", "sk-ant-xxx");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert!(config.ai.has_anthropic());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.provider, AiProvider::Anthropic);
        assert!(config.turn.reply_timeout().is_none());
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("PET_TRIAGE__TURN__REPLY_TIMEOUT_SECS", "90");
        env::set_var("PET_TRIAGE__TURN__CLOSING_PHRASES", "bye for now");
        env::set_var("PET_TRIAGE__LOGGING__FORMAT", "json");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.turn.reply_timeout(), Some(Duration::from_secs(90)));
        assert_eq!(config.turn.extra_closing_phrases(), vec!["bye for now"]);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_missing_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("PET_TRIAGE__AI__PROVIDER", "openai");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("OPENAI_API_KEY"))
        ));
    }

    #[test]
    fn test_mock_provider_loads_without_keys() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("PET_TRIAGE__AI__PROVIDER", "mock");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.provider, AiProvider::Mock);
        assert!(config.validate().is_ok());
    }
}
