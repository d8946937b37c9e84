//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - LLM transport (Anthropic, OpenAI, mock)
//! - `Classifier` - Per-turn category, urgency and card extraction
//! - `ReplyGenerator` - Assistant reply under a behavior script
//! - `ProfileStore` - Profiles and the active selection

mod ai_provider;
mod classifier;
mod profile_store;
mod reply_generator;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use classifier::Classifier;
pub use profile_store::ProfileStore;
pub use reply_generator::{ReplyError, ReplyGenerator};
