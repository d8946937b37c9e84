//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - LLM providers plus the classifier and reply generator built on them
//! - `storage` - In-memory profile store

pub mod ai;
pub mod storage;

pub use ai::{LlmClassifier, LlmReplyGenerator};
pub use storage::InMemoryProfileStore;
