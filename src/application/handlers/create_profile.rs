//! CreateProfile command handler.
//!
//! Registers a new pet, makes it active and runs the silent opening turn so
//! the owner is greeted by the assistant.

use std::sync::Arc;

use super::IntakeError;
use crate::application::{TurnGate, TurnOrchestrator};
use crate::domain::intake::{PetProfile, Species};
use crate::ports::ProfileStore;

/// Command to start tracking a new pet.
#[derive(Debug, Clone)]
pub struct CreateProfileCommand {
    pub species: Species,
}

impl CreateProfileCommand {
    pub fn new(species: Species) -> Self {
        Self { species }
    }
}

/// Result of creating a profile.
#[derive(Debug, Clone)]
pub struct CreateProfileResult {
    /// Snapshot after the opening turn: one assistant message.
    pub profile: PetProfile,
}

/// Handler for creating profiles.
pub struct CreateProfileHandler {
    store: Arc<dyn ProfileStore>,
    orchestrator: Arc<TurnOrchestrator>,
    gate: TurnGate,
}

impl CreateProfileHandler {
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

    /// A failed greeting leaves the new profile stored and active with an
    /// empty transcript; the error carries the pending opening turn.
    pub async fn handle(
        &self,
        cmd: CreateProfileCommand,
    ) -> Result<CreateProfileResult, IntakeError> {
        // 1. Claim the gate for the whole operation
        let _permit = self.gate.try_begin().ok_or(IntakeError::TurnInFlight)?;

        // 2. Register and select the new profile
        let profile = PetProfile::new(cmd.species);
        self.store.insert(profile.clone()).await?;
        self.store.set_active(profile.id()).await?;

        tracing::info!(
            profile_id = %profile.id(),
            species = %cmd.species,
            "Profile created"
        );

        // 3. Silent opening turn
        let opened = self.orchestrator.open(&profile).await?;

        // 4. Swap in the greeted snapshot
        self.store.replace(opened.clone()).await?;

        Ok(CreateProfileResult { profile: opened })
    }
}
