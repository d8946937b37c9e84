//! Pet intake and triage domain.
//!
//! Pure types and rules for one tracked pet: the profile snapshot, the
//! patient card and its merge engine, classification results, the dialog
//! policy and the completion latch. Nothing here performs I/O.

mod card;
mod category;
mod classification;
mod closing;
mod extractor;
mod message;
mod policy;
mod profile;
mod species;

pub use card::{merge, CardField, ExtractedCard, PatientCard, UNKNOWN};
pub use category::{Category, UrgencyLevel};
pub use classification::{ClassificationParseError, ClassificationResult};
pub use closing::{CompletionDetector, DEFAULT_CLOSING_PHRASES};
pub use extractor::{
    ExtractionError, JsonExtractor, ResponseSanitizer, SanitizationError, MAX_FIELD_LENGTH,
    MAX_RESPONSE_LENGTH,
};
pub use message::{Attachment, Message, Role};
pub use policy::{select_script, BehaviorScript, UrgencyBranch, EMERGENCY_DISCLAIMER};
pub use profile::{PetProfile, ProfilePhase, TurnUpdate, STARTER_REPLIES};
pub use species::Species;
