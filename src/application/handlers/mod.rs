//! Command and query handlers.
//!
//! Turn-producing commands (create, send, retry) and the latch commands
//! share one [`TurnGate`](crate::application::TurnGate); selection and
//! listing never wait on it.

mod create_profile;
mod errors;
mod profile_lifecycle;
mod profile_selection;
mod retry_reply;
mod send_message;

pub use create_profile::{CreateProfileCommand, CreateProfileHandler, CreateProfileResult};
pub use errors::IntakeError;
pub use profile_lifecycle::{
    CompleteProfileCommand, CompleteProfileHandler, ReopenProfileCommand, ReopenProfileHandler,
};
pub use profile_selection::{
    ListProfilesHandler, ListProfilesResult, SwitchProfileCommand, SwitchProfileHandler,
};
pub use retry_reply::{RetryReplyCommand, RetryReplyHandler, RetryReplyResult};
pub use send_message::{SendMessageCommand, SendMessageHandler, SendMessageResult};
