//! Pet profile snapshots.
//!
//! A [`PetProfile`] is an immutable snapshot. Every change produces a new
//! profile value which the store swaps in wholesale; there are no setters.

use serde::{Deserialize, Serialize};

use super::{Category, Message, PatientCard, Species, UrgencyLevel};
use crate::domain::foundation::{ProfileId, StateMachine, Timestamp, ValidationError};

/// Quick replies offered before the classifier has suggested any.
pub const STARTER_REPLIES: [&str; 8] = [
    "Vomiting",
    "Diarrhea",
    "Bleeding",
    "Not eating",
    "Lethargic",
    "Paw injury",
    "Swallowed pills",
    "URGENT",
];

/// Lifecycle of a profile.
///
/// Derived from the snapshot rather than stored: a profile with an empty
/// transcript is `Unset`, a latched one is `Completed`, anything else is
/// `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfilePhase {
    Unset,
    Active,
    Completed,
}

impl StateMachine for ProfilePhase {
    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            ProfilePhase::Unset => vec![ProfilePhase::Active],
            ProfilePhase::Active => vec![ProfilePhase::Completed],
            ProfilePhase::Completed => vec![ProfilePhase::Active],
        }
    }
}

/// Everything a finished turn contributes to the next snapshot.
#[derive(Debug, Clone)]
pub struct TurnUpdate {
    pub transcript: Vec<Message>,
    pub card: PatientCard,
    pub category: Category,
    pub urgency: UrgencyLevel,
    pub suggested_replies: Vec<String>,
    pub completed: bool,
}

/// State of one tracked pet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetProfile {
    id: ProfileId,
    species: Species,
    transcript: Vec<Message>,
    category: Category,
    urgency: UrgencyLevel,
    card: PatientCard,
    suggested_replies: Vec<String>,
    completed: bool,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl PetProfile {
    /// Creates a fresh profile: empty transcript, intake category, unset urgency.
    pub fn new(species: Species) -> Self {
        let now = Timestamp::now();
        Self {
            id: ProfileId::new(),
            species,
            transcript: Vec::new(),
            category: Category::Intake,
            urgency: UrgencyLevel::Unset,
            card: PatientCard::unknown(),
            suggested_replies: Vec::new(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    // === Accessors ===

    pub fn id(&self) -> ProfileId {
        self.id
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn urgency(&self) -> UrgencyLevel {
        self.urgency
    }

    pub fn card(&self) -> &PatientCard {
        &self.card
    }

    pub fn suggested_replies(&self) -> &[String] {
        &self.suggested_replies
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> ProfilePhase {
        if self.completed {
            ProfilePhase::Completed
        } else if self.transcript.is_empty() {
            ProfilePhase::Unset
        } else {
            ProfilePhase::Active
        }
    }

    /// Quick replies to offer: the starter set until the conversation is
    /// past its opening message, the classifier's suggestions afterwards.
    pub fn quick_replies(&self) -> Vec<String> {
        if self.transcript.len() <= 1 {
            STARTER_REPLIES.iter().map(|s| s.to_string()).collect()
        } else {
            self.suggested_replies.clone()
        }
    }

    // === Snapshot transitions ===

    /// Snapshot with the owner's message appended ahead of the reply.
    ///
    /// Recorded before the turn runs, so a failed reply leaves the message
    /// in the transcript unanswered.
    pub fn with_pending_message(&self, message: Message) -> PetProfile {
        let mut next = self.clone();
        next.transcript.push(message);
        next.updated_at = Timestamp::now();
        next
    }

    /// Snapshot produced by a completed turn.
    pub fn advance(&self, update: TurnUpdate) -> PetProfile {
        PetProfile {
            id: self.id,
            species: self.species,
            transcript: update.transcript,
            category: update.category,
            urgency: update.urgency,
            card: update.card,
            suggested_replies: update.suggested_replies,
            completed: update.completed,
            created_at: self.created_at,
            updated_at: Timestamp::now(),
        }
    }

    /// Snapshot with the completion latch set by the owner.
    pub fn mark_completed(&self) -> Result<PetProfile, ValidationError> {
        self.phase().transition_to(ProfilePhase::Completed)?;
        let mut next = self.clone();
        next.completed = true;
        next.updated_at = Timestamp::now();
        Ok(next)
    }

    /// Snapshot with the completion latch cleared. Touches nothing else.
    pub fn reopen(&self) -> Result<PetProfile, ValidationError> {
        self.phase().transition_to(ProfilePhase::Active)?;
        let mut next = self.clone();
        next.completed = false;
        next.updated_at = Timestamp::now();
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_profile() -> PetProfile {
        let profile = PetProfile::new(Species::Dog);
        profile.advance(TurnUpdate {
            transcript: vec![Message::assistant("Hello! What's your dog's name?")],
            card: PatientCard::unknown(),
            category: Category::Intake,
            urgency: UrgencyLevel::Unset,
            suggested_replies: vec!["Rex".to_string()],
            completed: false,
        })
    }

    #[test]
    fn new_profile_starts_unset() {
        let profile = PetProfile::new(Species::Cat);
        assert_eq!(profile.phase(), ProfilePhase::Unset);
        assert_eq!(profile.category(), Category::Intake);
        assert_eq!(profile.urgency(), UrgencyLevel::Unset);
        assert_eq!(profile.card(), &PatientCard::unknown());
        assert!(!profile.is_completed());
        assert!(profile.transcript().is_empty());
    }

    #[test]
    fn advance_keeps_identity_and_creation_time() {
        let profile = PetProfile::new(Species::Dog);
        let next = active_profile();
        assert_eq!(next.species(), Species::Dog);
        assert_ne!(profile.id(), next.id());

        let again = next.advance(TurnUpdate {
            transcript: next.transcript().to_vec(),
            card: next.card().clone(),
            category: Category::Triage,
            urgency: UrgencyLevel::NeedsVisit,
            suggested_replies: Vec::new(),
            completed: false,
        });
        assert_eq!(again.id(), next.id());
        assert_eq!(again.created_at(), next.created_at());
        assert_eq!(again.category(), Category::Triage);
    }

    #[test]
    fn pending_message_is_appended() {
        let profile = active_profile();
        let next = profile.with_pending_message(Message::user("He is limping"));
        assert_eq!(next.transcript().len(), 2);
        assert!(next.transcript()[1].is_user());
        assert_eq!(profile.transcript().len(), 1);
    }

    #[test]
    fn quick_replies_use_starters_until_conversation_moves_on() {
        let profile = active_profile();
        assert_eq!(profile.quick_replies().len(), STARTER_REPLIES.len());

        let longer = profile
            .with_pending_message(Message::user("Rex"))
            .with_pending_message(Message::assistant("How old is Rex?"));
        let longer = longer.advance(TurnUpdate {
            transcript: longer.transcript().to_vec(),
            card: PatientCard::unknown(),
            category: Category::Intake,
            urgency: UrgencyLevel::Unset,
            suggested_replies: vec!["2 years".to_string()],
            completed: false,
        });
        assert_eq!(longer.quick_replies(), vec!["2 years".to_string()]);
    }

    #[test]
    fn reopen_clears_only_the_latch() {
        let completed = active_profile().mark_completed().unwrap();
        assert_eq!(completed.phase(), ProfilePhase::Completed);

        let reopened = completed.reopen().unwrap();
        assert!(!reopened.is_completed());
        assert_eq!(reopened.transcript(), completed.transcript());
        assert_eq!(reopened.card(), completed.card());
        assert_eq!(reopened.suggested_replies(), completed.suggested_replies());
        assert_eq!(reopened.phase(), ProfilePhase::Active);
    }

    #[test]
    fn reopen_requires_completed_profile() {
        assert!(active_profile().reopen().is_err());
    }

    #[test]
    fn unset_profile_cannot_be_completed() {
        assert!(PetProfile::new(Species::Bird).mark_completed().is_err());
    }

    #[test]
    fn phase_table_has_no_terminal_state() {
        for phase in [ProfilePhase::Unset, ProfilePhase::Active, ProfilePhase::Completed] {
            assert!(!phase.is_terminal());
        }
        assert!(!ProfilePhase::Completed.can_transition_to(&ProfilePhase::Unset));
    }
}
