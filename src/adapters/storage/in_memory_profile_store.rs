//! In-Memory Profile Store Adapter
//!
//! Holds every profile and the active selection for the lifetime of the
//! process. Nothing survives a restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, ProfileId};
use crate::domain::intake::PetProfile;
use crate::ports::ProfileStore;

#[derive(Debug, Default)]
struct StoreState {
    profiles: HashMap<ProfileId, PetProfile>,
    /// Creation order, for listing.
    order: Vec<ProfileId>,
    active: Option<ProfileId>,
}

/// In-memory storage for pet profiles.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored profiles.
    pub async fn len(&self) -> usize {
        self.state.read().await.profiles.len()
    }

    /// Returns true if no profile is stored.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.profiles.is_empty()
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = StoreState::default();
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn insert(&self, profile: PetProfile) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let id = profile.id();
        if state.profiles.contains_key(&id) {
            return Err(DomainError::new(
                ErrorCode::ValidationFailed,
                "Profile already exists",
            )
            .with_detail("profile_id", id.to_string()));
        }
        state.profiles.insert(id, profile);
        state.order.push(id);
        Ok(())
    }

    async fn get(&self, id: ProfileId) -> Result<Option<PetProfile>, DomainError> {
        Ok(self.state.read().await.profiles.get(&id).cloned())
    }

    async fn replace(&self, profile: PetProfile) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        match state.profiles.get_mut(&profile.id()) {
            Some(slot) => {
                *slot = profile;
                Ok(())
            }
            None => Err(DomainError::profile_not_found(profile.id())),
        }
    }

    async fn list(&self) -> Result<Vec<PetProfile>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.profiles.get(id).cloned())
            .collect())
    }

    async fn active_id(&self) -> Result<Option<ProfileId>, DomainError> {
        Ok(self.state.read().await.active)
    }

    async fn set_active(&self, id: ProfileId) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if !state.profiles.contains_key(&id) {
            return Err(DomainError::profile_not_found(id));
        }
        state.active = Some(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::intake::{Message, Species};

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let store = InMemoryProfileStore::new();
        let profile = PetProfile::new(Species::Dog);

        store.insert(profile.clone()).await.unwrap();

        assert_eq!(store.get(profile.id()).await.unwrap(), Some(profile));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = InMemoryProfileStore::new();
        let profile = PetProfile::new(Species::Cat);

        store.insert(profile.clone()).await.unwrap();
        let err = store.insert(profile).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn replace_swaps_snapshot() {
        let store = InMemoryProfileStore::new();
        let profile = PetProfile::new(Species::Dog);
        store.insert(profile.clone()).await.unwrap();

        let next = profile.with_pending_message(Message::user("He is limping"));
        store.replace(next.clone()).await.unwrap();

        let stored = store.get(profile.id()).await.unwrap().unwrap();
        assert_eq!(stored.transcript().len(), 1);
    }

    #[tokio::test]
    async fn replace_unknown_profile_fails() {
        let store = InMemoryProfileStore::new();
        let err = store.replace(PetProfile::new(Species::Bird)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ProfileNotFound);
    }

    #[tokio::test]
    async fn active_selection() {
        let store = InMemoryProfileStore::new();
        assert_eq!(store.active().await.unwrap(), None);

        let first = PetProfile::new(Species::Dog);
        let second = PetProfile::new(Species::Cat);
        store.insert(first.clone()).await.unwrap();
        store.insert(second.clone()).await.unwrap();
        assert_eq!(store.active_id().await.unwrap(), None);

        store.set_active(second.id()).await.unwrap();
        assert_eq!(store.active().await.unwrap().map(|p| p.id()), Some(second.id()));

        let err = store.set_active(ProfileId::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ProfileNotFound);
        assert_eq!(store.active_id().await.unwrap(), Some(second.id()));
    }

    #[tokio::test]
    async fn list_keeps_creation_order() {
        let store = InMemoryProfileStore::new();
        let profiles: Vec<_> = (0..3)
            .map(|_| PetProfile::new(Species::Rodent))
            .collect();
        for profile in &profiles {
            store.insert(profile.clone()).await.unwrap();
        }

        let listed: Vec<_> = store.list().await.unwrap().iter().map(|p| p.id()).collect();
        let expected: Vec<_> = profiles.iter().map(|p| p.id()).collect();
        assert_eq!(listed, expected);

        store.clear().await;
        assert!(store.is_empty().await);
    }
}
