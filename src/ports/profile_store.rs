//! Profile store port.
//!
//! Keyed collection of pet profiles plus the id of the active one.
//! Profiles are immutable snapshots, so the only write is wholesale
//! replacement.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ProfileId};
use crate::domain::intake::PetProfile;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Adds a new profile. Does not change the active selection.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if a profile with the same id exists
    async fn insert(&self, profile: PetProfile) -> Result<(), DomainError>;

    /// Returns the profile with `id`, if any.
    async fn get(&self, id: ProfileId) -> Result<Option<PetProfile>, DomainError>;

    /// Swaps in a new snapshot for an existing profile.
    ///
    /// # Errors
    ///
    /// - `ProfileNotFound` if no profile has the snapshot's id
    async fn replace(&self, profile: PetProfile) -> Result<(), DomainError>;

    /// All profiles in creation order.
    async fn list(&self) -> Result<Vec<PetProfile>, DomainError>;

    /// Id of the active profile, if one is selected.
    async fn active_id(&self) -> Result<Option<ProfileId>, DomainError>;

    /// Selects the active profile.
    ///
    /// # Errors
    ///
    /// - `ProfileNotFound` if `id` is unknown
    async fn set_active(&self, id: ProfileId) -> Result<(), DomainError>;

    /// The active profile, if one is selected.
    async fn active(&self) -> Result<Option<PetProfile>, DomainError> {
        match self.active_id().await? {
            Some(id) => self.get(id).await,
            None => Ok(None),
        }
    }
}
