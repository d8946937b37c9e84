//! Errors returned by the intake command handlers.

use thiserror::Error;

use crate::application::orchestrator::{PendingTurn, TurnError};
use crate::domain::foundation::{DomainError, ErrorCode, ProfileId, ValidationError};

/// Command-level failure of an intake operation.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Neither text nor attachment was supplied.
    #[error("Validation error: message needs text or an attachment")]
    EmptyMessage,

    #[error("No active profile")]
    NoActiveProfile,

    /// Another turn holds the gate.
    #[error("A turn is already in progress")]
    TurnInFlight,

    /// The profile is latched; reopen it before sending.
    #[error("Profile {0} is completed")]
    ProfileCompleted(ProfileId),

    #[error("Profile not found: {0}")]
    ProfileNotFound(ProfileId),

    #[error("Invalid lifecycle transition: {0}")]
    InvalidTransition(String),

    /// The profile moved on since the pending turn was prepared.
    #[error("Pending turn for profile {0} no longer matches the stored profile")]
    StalePendingTurn(ProfileId),

    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error("Domain error: {0}")]
    Domain(DomainError),
}

impl IntakeError {
    /// The resumable turn, when reply generation was what failed.
    pub fn pending_turn(&self) -> Option<&PendingTurn> {
        match self {
            IntakeError::Turn(err) => Some(err.pending()),
            _ => None,
        }
    }

    pub fn into_pending_turn(self) -> Option<PendingTurn> {
        match self {
            IntakeError::Turn(err) => Some(err.into_pending()),
            _ => None,
        }
    }
}

impl From<DomainError> for IntakeError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ProfileNotFound => match err
                .details
                .get("profile_id")
                .and_then(|id| id.parse().ok())
            {
                Some(id) => IntakeError::ProfileNotFound(id),
                None => IntakeError::Domain(err),
            },
            ErrorCode::InvalidStateTransition => IntakeError::InvalidTransition(err.message),
            _ => IntakeError::Domain(err),
        }
    }
}

impl From<ValidationError> for IntakeError {
    fn from(err: ValidationError) -> Self {
        IntakeError::InvalidTransition(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_domain_error_keeps_profile_id() {
        let id = ProfileId::new();
        let err: IntakeError = DomainError::profile_not_found(id).into();
        assert!(matches!(err, IntakeError::ProfileNotFound(found) if found == id));
    }

    #[test]
    fn storage_error_stays_domain() {
        let err: IntakeError = DomainError::new(ErrorCode::StorageError, "disk full").into();
        assert!(matches!(err, IntakeError::Domain(_)));
    }

    #[test]
    fn validation_error_is_invalid_transition() {
        let err: IntakeError =
            ValidationError::invalid_format("state_transition", "Active -> Active").into();
        assert!(matches!(err, IntakeError::InvalidTransition(_)));
        assert!(err.pending_turn().is_none());
    }
}
