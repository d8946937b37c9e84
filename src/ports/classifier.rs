//! Classifier port.
//!
//! Turns the current profile and the owner's raw text into a
//! [`ClassificationResult`]. The contract is infallible: transport errors
//! and unreadable output degrade to [`ClassificationResult::unchanged`]
//! inside the implementation, so a bad classification never blocks a turn.

use async_trait::async_trait;

use crate::domain::intake::{ClassificationResult, PetProfile};

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classifies one turn. Attachments are not part of the input.
    async fn classify(&self, profile: &PetProfile, raw_text: &str) -> ClassificationResult;
}
