//! Reply generator port.

use async_trait::async_trait;
use thiserror::Error;

use super::AIError;
use crate::domain::intake::{BehaviorScript, Message, SanitizationError};

/// Errors from reply generation. There is no fallback text; callers see
/// every failure.
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("AI provider failed: {0}")]
    Provider(#[from] AIError),

    #[error("Reply rejected: {0}")]
    Sanitization(#[from] SanitizationError),
}

impl ReplyError {
    /// Returns true if sending the same request again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ReplyError::Provider(err) => err.is_retryable(),
            ReplyError::Sanitization(_) => true,
        }
    }
}

/// Produces the assistant's reply for a transcript under a behavior script.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// `transcript` ends with the message being answered, attachments included.
    async fn generate_reply(
        &self,
        transcript: &[Message],
        script: &BehaviorScript,
    ) -> Result<String, ReplyError>;
}
