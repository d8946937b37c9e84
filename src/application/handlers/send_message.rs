//! SendMessage command handler.
//!
//! Runs one regular turn on the active profile. The owner's message is
//! stored before the turn starts, so a failed reply leaves it in the
//! transcript unanswered.

use std::sync::Arc;

use super::IntakeError;
use crate::application::{TurnGate, TurnOrchestrator};
use crate::domain::intake::{Attachment, Message, PetProfile};
use crate::ports::ProfileStore;

/// Command to send the owner's message to the active profile.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub text: String,
    pub attachment: Option<Attachment>,
}

impl SendMessageCommand {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Result of a completed turn.
#[derive(Debug, Clone)]
pub struct SendMessageResult {
    pub profile: PetProfile,
}

impl SendMessageResult {
    /// The assistant's reply to the message.
    pub fn reply(&self) -> &str {
        self.profile
            .transcript()
            .last()
            .map(|m| m.text.as_str())
            .unwrap_or_default()
    }
}

/// Handler for sending messages.
pub struct SendMessageHandler {
    store: Arc<dyn ProfileStore>,
    orchestrator: Arc<TurnOrchestrator>,
    gate: TurnGate,
}

impl SendMessageHandler {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        orchestrator: Arc<TurnOrchestrator>,
        gate: TurnGate,
    ) -> Self {
        Self {
            store,
            orchestrator,
            gate,
        }
    }

    pub async fn handle(&self, cmd: SendMessageCommand) -> Result<SendMessageResult, IntakeError> {
        // 1. Validate input
        let text = cmd.text.trim();
        if text.is_empty() && cmd.attachment.is_none() {
            return Err(IntakeError::EmptyMessage);
        }

        // 2. Claim the gate; held until this function returns
        let _permit = self.gate.try_begin().ok_or(IntakeError::TurnInFlight)?;

        // 3. Resolve the target profile
        let profile = self
            .store
            .active()
            .await?
            .ok_or(IntakeError::NoActiveProfile)?;
        if profile.is_completed() {
            return Err(IntakeError::ProfileCompleted(profile.id()));
        }

        // 4. Record the owner's message ahead of the reply
        let user_message = Message::user(text).with_attachment(cmd.attachment);
        self.store
            .replace(profile.with_pending_message(user_message.clone()))
            .await?;

        // 5. Classify, generate, latch
        let next = self.orchestrator.take_turn(&profile, user_message).await?;

        // 6. Swap in the new snapshot
        self.store.replace(next.clone()).await?;

        Ok(SendMessageResult { profile: next })
    }
}
