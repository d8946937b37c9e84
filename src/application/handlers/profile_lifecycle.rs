//! Completion latch handlers: manual completion and reopen.

use std::sync::Arc;

use super::IntakeError;
use crate::application::TurnGate;
use crate::domain::foundation::ProfileId;
use crate::domain::intake::PetProfile;
use crate::ports::ProfileStore;

/// Command to mark a profile's conversation as finished.
#[derive(Debug, Clone)]
pub struct CompleteProfileCommand {
    pub profile_id: ProfileId,
}

/// Command to clear a profile's completion latch.
#[derive(Debug, Clone)]
pub struct ReopenProfileCommand {
    pub profile_id: ProfileId,
}

/// Handler for completing a profile by hand.
pub struct CompleteProfileHandler {
    store: Arc<dyn ProfileStore>,
    gate: TurnGate,
}

impl CompleteProfileHandler {
    pub fn new(store: Arc<dyn ProfileStore>, gate: TurnGate) -> Self {
        Self { store, gate }
    }

    pub async fn handle(&self, cmd: CompleteProfileCommand) -> Result<PetProfile, IntakeError> {
        let _permit = self.gate.try_begin().ok_or(IntakeError::TurnInFlight)?;
        let profile = load(self.store.as_ref(), cmd.profile_id).await?;

        let completed = profile.mark_completed()?;
        self.store.replace(completed.clone()).await?;

        tracing::info!(profile_id = %cmd.profile_id, "Profile completed");
        Ok(completed)
    }
}

/// Handler for reopening a completed profile.
///
/// Only the latch changes; transcript, card, category, urgency and
/// suggestions are kept.
pub struct ReopenProfileHandler {
    store: Arc<dyn ProfileStore>,
    gate: TurnGate,
}

impl ReopenProfileHandler {
    pub fn new(store: Arc<dyn ProfileStore>, gate: TurnGate) -> Self {
        Self { store, gate }
    }

    pub async fn handle(&self, cmd: ReopenProfileCommand) -> Result<PetProfile, IntakeError> {
        let _permit = self.gate.try_begin().ok_or(IntakeError::TurnInFlight)?;
        let profile = load(self.store.as_ref(), cmd.profile_id).await?;

        let reopened = profile.reopen()?;
        self.store.replace(reopened.clone()).await?;

        tracing::info!(profile_id = %cmd.profile_id, "Profile reopened");
        Ok(reopened)
    }
}

async fn load(store: &dyn ProfileStore, id: ProfileId) -> Result<PetProfile, IntakeError> {
    store
        .get(id)
        .await?
        .ok_or(IntakeError::ProfileNotFound(id))
}
