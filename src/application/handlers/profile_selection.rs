//! Active profile selection and listing.
//!
//! Neither handler touches the turn gate: switching while a turn is in
//! flight is allowed, and that turn still lands on the profile it started on.

use std::sync::Arc;

use super::IntakeError;
use crate::domain::foundation::ProfileId;
use crate::domain::intake::PetProfile;
use crate::ports::ProfileStore;

#[derive(Debug, Clone)]
pub struct SwitchProfileCommand {
    pub profile_id: ProfileId,
}

/// Handler for selecting the active profile.
pub struct SwitchProfileHandler {
    store: Arc<dyn ProfileStore>,
}

impl SwitchProfileHandler {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: SwitchProfileCommand) -> Result<PetProfile, IntakeError> {
        let profile = self
            .store
            .get(cmd.profile_id)
            .await?
            .ok_or(IntakeError::ProfileNotFound(cmd.profile_id))?;
        self.store.set_active(cmd.profile_id).await?;

        tracing::debug!(profile_id = %cmd.profile_id, "Active profile switched");
        Ok(profile)
    }
}

/// All profiles plus the current selection.
#[derive(Debug, Clone)]
pub struct ListProfilesResult {
    pub profiles: Vec<PetProfile>,
    pub active_id: Option<ProfileId>,
}

impl ListProfilesResult {
    pub fn active(&self) -> Option<&PetProfile> {
        let id = self.active_id?;
        self.profiles.iter().find(|p| p.id() == id)
    }
}

/// Query handler listing profiles in creation order.
pub struct ListProfilesHandler {
    store: Arc<dyn ProfileStore>,
}

impl ListProfilesHandler {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self) -> Result<ListProfilesResult, IntakeError> {
        Ok(ListProfilesResult {
            profiles: self.store.list().await?,
            active_id: self.store.active_id().await?,
        })
    }
}
