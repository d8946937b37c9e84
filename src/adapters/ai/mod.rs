//! AI Adapters.
//!
//! Implementations of the AIProvider port for LLM providers, and the
//! classifier and reply generator built on top of any provider.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Configurable mock for testing
//! - `OpenAIProvider` - OpenAI chat completions
//! - `AnthropicProvider` - Anthropic Messages API
//! - `LlmClassifier` - Classifier port over an AIProvider
//! - `LlmReplyGenerator` - ReplyGenerator port over an AIProvider

mod anthropic_provider;
mod llm_classifier;
mod llm_reply_generator;
mod mock_provider;
mod openai_provider;

pub use anthropic_provider::{AnthropicConfig, AnthropicProvider};
pub use llm_classifier::LlmClassifier;
pub use llm_reply_generator::LlmReplyGenerator;
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};

use std::time::Duration;

/// Backoff stops doubling after 2^5 seconds.
const MAX_BACKOFF_EXPONENT: u32 = 5;

/// Delay before retry number `retry_count` (zero-based): 1s, 2s, 4s, ... 32s.
pub(crate) fn backoff_delay(retry_count: u32) -> Duration {
    Duration::from_secs(1u64 << retry_count.min(MAX_BACKOFF_EXPONENT))
}
