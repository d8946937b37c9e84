//! RetryReply command handler.
//!
//! Resumes a turn whose reply generation failed, reusing its classification.

use std::sync::Arc;

use super::IntakeError;
use crate::application::{PendingTurn, TurnGate, TurnKind, TurnOrchestrator};
use crate::domain::intake::PetProfile;
use crate::ports::ProfileStore;

/// Command to retry reply generation for a failed turn.
#[derive(Debug, Clone)]
pub struct RetryReplyCommand {
    pub pending: PendingTurn,
}

impl RetryReplyCommand {
    pub fn new(pending: PendingTurn) -> Self {
        Self { pending }
    }
}

#[derive(Debug, Clone)]
pub struct RetryReplyResult {
    pub profile: PetProfile,
}

/// Handler for retrying failed replies.
pub struct RetryReplyHandler {
    store: Arc<dyn ProfileStore>,
    orchestrator: Arc<TurnOrchestrator>,
    gate: TurnGate,
}

impl RetryReplyHandler {
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

    pub async fn handle(&self, cmd: RetryReplyCommand) -> Result<RetryReplyResult, IntakeError> {
        let pending = cmd.pending;

        // 1. Claim the gate
        let _permit = self.gate.try_begin().ok_or(IntakeError::TurnInFlight)?;

        // 2. The stored profile must still be where the failed turn left it
        let profile_id = pending.profile_id();
        let current = self
            .store
            .get(profile_id)
            .await?
            .ok_or(IntakeError::ProfileNotFound(profile_id))?;
        if !is_awaiting_reply(&current, &pending) {
            tracing::warn!(
                profile_id = %profile_id,
                turn_id = %pending.turn_id(),
                "Pending turn is stale"
            );
            return Err(IntakeError::StalePendingTurn(profile_id));
        }

        // 3. Generate again from the prepared turn
        let next = self.orchestrator.complete(pending).await?;

        // 4. Swap in the new snapshot
        self.store.replace(next.clone()).await?;

        Ok(RetryReplyResult { profile: next })
    }
}

/// True when `current` is exactly the state a failed `pending` turn left behind.
fn is_awaiting_reply(current: &PetProfile, pending: &PendingTurn) -> bool {
    let base = pending.base();
    if current.is_completed() != base.is_completed() {
        return false;
    }
    match pending.kind() {
        TurnKind::Opening => current.transcript().is_empty(),
        TurnKind::Regular => {
            current.transcript().len() == base.transcript().len() + 1
                && current.transcript().last() == Some(pending.user_message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::send_message::SendMessageCommand;
    use crate::application::handlers::test_support::Harness;
    use crate::domain::intake::{Species, UrgencyLevel};

    const NEEDS_VISIT: &str =
        r#"{"category":"triage","urgency":"needs_visit","extracted_card":{"symptoms":["limping"]}}"#;

    async fn failed_turn(harness: &Harness) -> PendingTurn {
        harness.create(Species::Dog).await;
        harness.classify_next(NEEDS_VISIT);
        harness.fail_next_reply();
        harness
            .send_handler()
            .handle(SendMessageCommand::new("He is limping"))
            .await
            .unwrap_err()
            .into_pending_turn()
            .unwrap()
    }

    #[tokio::test]
    async fn retry_completes_turn_without_reclassifying() {
        let harness = Harness::new();
        let pending = failed_turn(&harness).await;
        let classifier_calls = harness.classifier_provider.call_count();
        harness.reply_next("Please book a visit today.");

        let result = harness
            .retry_handler()
            .handle(RetryReplyCommand::new(pending))
            .await
            .unwrap();

        assert_eq!(harness.classifier_provider.call_count(), classifier_calls);
        let profile = result.profile;
        assert_eq!(profile.transcript().len(), 3);
        assert_eq!(profile.transcript()[1].text, "He is limping");
        assert_eq!(profile.transcript()[2].text, "Please book a visit today.");
        assert_eq!(profile.urgency(), UrgencyLevel::NeedsVisit);
        assert_eq!(profile.card().symptoms, vec!["limping".to_string()]);
    }

    #[tokio::test]
    async fn retry_of_failed_greeting() {
        let harness = Harness::new();
        harness.fail_next_reply();
        let pending = harness
            .create_handler()
            .handle(crate::application::handlers::CreateProfileCommand::new(Species::Cat))
            .await
            .unwrap_err()
            .into_pending_turn()
            .unwrap();
        harness.reply_next("Hello! What's your cat's name?");

        let profile = harness
            .retry_handler()
            .handle(RetryReplyCommand::new(pending))
            .await
            .unwrap()
            .profile;

        assert_eq!(profile.transcript().len(), 1);
        assert!(!profile.transcript()[0].is_user());
    }

    #[tokio::test]
    async fn retry_after_profile_moved_on_is_stale() {
        let harness = Harness::new();
        let pending = failed_turn(&harness).await;
        let stored = harness.store.get(pending.profile_id()).await.unwrap().unwrap();
        harness
            .store
            .replace(stored.mark_completed().unwrap())
            .await
            .unwrap();

        let err = harness
            .retry_handler()
            .handle(RetryReplyCommand::new(pending))
            .await
            .unwrap_err();

        assert!(matches!(err, IntakeError::StalePendingTurn(_)));
    }

    #[tokio::test]
    async fn retry_can_fail_again_and_stay_resumable() {
        let harness = Harness::new();
        let pending = failed_turn(&harness).await;
        harness.fail_next_reply();

        let err = harness
            .retry_handler()
            .handle(RetryReplyCommand::new(pending))
            .await
            .unwrap_err();

        let again = err.into_pending_turn().unwrap();
        let stored = harness.store.get(again.profile_id()).await.unwrap().unwrap();
        assert_eq!(stored.transcript().len(), 2);
        assert!(!harness.gate.is_busy());
    }
}
