//! Application layer - Turn orchestration and command handlers.
//!
//! This layer drives the intake domain through its ports. Handlers own the
//! store reads and writes; the orchestrator owns the classify, generate
//! and latch pipeline of a single turn.

pub mod handlers;
mod orchestrator;
mod turn_gate;

pub use handlers::{
    CompleteProfileCommand, CompleteProfileHandler, CreateProfileCommand, CreateProfileHandler,
    CreateProfileResult, IntakeError, ListProfilesHandler, ListProfilesResult,
    ReopenProfileCommand, ReopenProfileHandler, RetryReplyCommand, RetryReplyHandler,
    RetryReplyResult, SendMessageCommand, SendMessageHandler, SendMessageResult,
    SwitchProfileCommand, SwitchProfileHandler,
};
pub use orchestrator::{PendingTurn, TurnError, TurnKind, TurnOrchestrator};
pub use turn_gate::{TurnGate, TurnPermit};
