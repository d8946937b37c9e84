//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, the lifecycle trait and error types
//! that form the vocabulary of the triage domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ProfileId, TurnId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
