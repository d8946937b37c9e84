//! Turn pipeline configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Settings for the classify/generate pipeline
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TurnConfig {
    /// Upper bound on a single reply call. Unset waits indefinitely.
    pub reply_timeout_secs: Option<u64>,

    /// Extra closing phrases, comma separated, added to the built-in list
    pub closing_phrases: Option<String>,
}

impl TurnConfig {
    pub fn reply_timeout(&self) -> Option<Duration> {
        self.reply_timeout_secs.map(Duration::from_secs)
    }

    /// Configured extra phrases, trimmed, blanks dropped.
    pub fn extra_closing_phrases(&self) -> Vec<String> {
        self.closing_phrases
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.reply_timeout_secs == Some(0) {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_wait_indefinitely() {
        let config = TurnConfig::default();
        assert!(config.reply_timeout().is_none());
        assert!(config.extra_closing_phrases().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reply_timeout_duration() {
        let config = TurnConfig {
            reply_timeout_secs: Some(45),
            ..Default::default()
        };
        assert_eq!(config.reply_timeout(), Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_zero_reply_timeout_rejected() {
        let config = TurnConfig {
            reply_timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_closing_phrases_split() {
        let config = TurnConfig {
            closing_phrases: Some(" bye for now, ,see ya ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.extra_closing_phrases(), vec!["bye for now", "see ya"]);
    }
}
