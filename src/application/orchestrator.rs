//! Turn orchestration.
//!
//! A turn runs in two stages. [`TurnOrchestrator::prepare`] classifies the
//! owner's message and settles everything that does not depend on the reply
//! (merged card, behavior script, completion latch) into a [`PendingTurn`].
//! [`TurnOrchestrator::complete`] asks for the reply and folds it into the
//! next profile snapshot. A failed reply hands the pending turn back inside
//! [`TurnError`] so the caller can retry generation without classifying again.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::domain::foundation::{ProfileId, TurnId};
use crate::domain::intake::{
    select_script, BehaviorScript, ClassificationResult, CompletionDetector, Message, PatientCard,
    PetProfile, TurnUpdate,
};
use crate::ports::{Classifier, ReplyError, ReplyGenerator};

/// Whether the turn opens a fresh profile or continues a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    /// Silent first turn: the seed message is sent but never stored.
    Opening,
    Regular,
}

/// A classified turn waiting for its reply.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    turn_id: TurnId,
    kind: TurnKind,
    base: PetProfile,
    user_message: Message,
    classification: ClassificationResult,
    card: PatientCard,
    script: BehaviorScript,
    completed: bool,
}

impl PendingTurn {
    pub fn turn_id(&self) -> TurnId {
        self.turn_id
    }

    pub fn profile_id(&self) -> ProfileId {
        self.base.id()
    }

    pub fn kind(&self) -> TurnKind {
        self.kind
    }

    /// The profile as it was when the turn started.
    pub fn base(&self) -> &PetProfile {
        &self.base
    }

    pub fn user_message(&self) -> &Message {
        &self.user_message
    }

    pub fn classification(&self) -> &ClassificationResult {
        &self.classification
    }

    pub fn card(&self) -> &PatientCard {
        &self.card
    }

    pub fn script(&self) -> &BehaviorScript {
        &self.script
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Transcript handed to reply generation.
    pub fn generation_transcript(&self) -> Vec<Message> {
        match self.kind {
            TurnKind::Opening => vec![self.user_message.clone()],
            TurnKind::Regular => {
                let mut transcript = self.base.transcript().to_vec();
                transcript.push(self.user_message.clone());
                transcript
            }
        }
    }

    /// Builds the next snapshot from the generated reply.
    pub fn finish(self, reply: String) -> PetProfile {
        let assistant = Message::assistant(reply);
        let transcript = match self.kind {
            TurnKind::Opening => vec![assistant],
            TurnKind::Regular => {
                let mut transcript = self.base.transcript().to_vec();
                transcript.push(self.user_message);
                transcript.push(assistant);
                transcript
            }
        };

        self.base.advance(TurnUpdate {
            transcript,
            card: self.card,
            category: self.classification.category,
            urgency: self.classification.urgency,
            suggested_replies: self.classification.suggested_replies,
            completed: self.completed,
        })
    }
}

/// Reply generation failed; the turn can be resumed from `pending`.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("reply generation failed: {source}")]
    ReplyFailed {
        #[source]
        source: ReplyError,
        pending: Box<PendingTurn>,
    },

    #[error("reply generation timed out after {timeout_secs}s")]
    ReplyTimedOut {
        timeout_secs: u64,
        pending: Box<PendingTurn>,
    },
}

impl TurnError {
    pub fn pending(&self) -> &PendingTurn {
        match self {
            TurnError::ReplyFailed { pending, .. } | TurnError::ReplyTimedOut { pending, .. } => {
                pending
            }
        }
    }

    pub fn into_pending(self) -> PendingTurn {
        match self {
            TurnError::ReplyFailed { pending, .. } | TurnError::ReplyTimedOut { pending, .. } => {
                *pending
            }
        }
    }

    /// True when trying the same pending turn again could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TurnError::ReplyFailed { source, .. } => source.is_retryable(),
            TurnError::ReplyTimedOut { .. } => true,
        }
    }
}

/// Runs classify, merge, policy, generate and latch for one turn.
pub struct TurnOrchestrator {
    classifier: Arc<dyn Classifier>,
    replies: Arc<dyn ReplyGenerator>,
    detector: CompletionDetector,
    reply_timeout: Option<Duration>,
}

impl TurnOrchestrator {
    pub fn new(classifier: Arc<dyn Classifier>, replies: Arc<dyn ReplyGenerator>) -> Self {
        Self {
            classifier,
            replies,
            detector: CompletionDetector::new(),
            reply_timeout: None,
        }
    }

    pub fn with_detector(mut self, detector: CompletionDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Bounds each reply call. `None` waits indefinitely.
    pub fn with_reply_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Silent first turn for a freshly created profile.
    pub async fn open(&self, profile: &PetProfile) -> Result<PetProfile, TurnError> {
        let seed = Message::user(profile.species().opening_seed());
        let pending = self.prepare(profile, TurnKind::Opening, seed).await;
        self.complete(pending).await
    }

    /// Regular turn for the owner's message, attachment included.
    pub async fn take_turn(
        &self,
        profile: &PetProfile,
        user_message: Message,
    ) -> Result<PetProfile, TurnError> {
        let pending = self.prepare(profile, TurnKind::Regular, user_message).await;
        self.complete(pending).await
    }

    /// Classification stage. Never fails: the classifier degrades to a
    /// no-op result on its own.
    pub async fn prepare(
        &self,
        profile: &PetProfile,
        kind: TurnKind,
        user_message: Message,
    ) -> PendingTurn {
        let turn_id = TurnId::new();
        let text = user_message.text.as_str();

        let classification = self.classifier.classify(profile, text).await;
        let card = profile.card().merged_with(&classification.extracted_card);
        let script =
            select_script(classification.category).with_assessed_urgency(classification.urgency);
        let completed = self
            .detector
            .latch(profile.is_completed(), text, classification.category);

        tracing::info!(
            profile_id = %profile.id(),
            turn_id = %turn_id,
            category = %classification.category,
            urgency = %classification.urgency,
            completed,
            "Turn classified"
        );

        PendingTurn {
            turn_id,
            kind,
            base: profile.clone(),
            user_message,
            classification,
            card,
            script,
            completed,
        }
    }

    /// Generation stage.
    pub async fn complete(&self, pending: PendingTurn) -> Result<PetProfile, TurnError> {
        let outcome = {
            let transcript = pending.generation_transcript();
            let call = self.replies.generate_reply(&transcript, pending.script());
            match self.reply_timeout {
                Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| limit),
                None => Ok(call.await),
            }
        };

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(limit) => {
                tracing::warn!(
                    profile_id = %pending.profile_id(),
                    turn_id = %pending.turn_id(),
                    timeout_secs = limit.as_secs(),
                    "Reply timed out"
                );
                return Err(TurnError::ReplyTimedOut {
                    timeout_secs: limit.as_secs(),
                    pending: Box::new(pending),
                });
            }
        };

        match outcome {
            Ok(reply) => {
                tracing::info!(
                    profile_id = %pending.profile_id(),
                    turn_id = %pending.turn_id(),
                    reply_len = reply.len(),
                    "Turn completed"
                );
                Ok(pending.finish(reply))
            }
            Err(source) => {
                tracing::warn!(
                    profile_id = %pending.profile_id(),
                    turn_id = %pending.turn_id(),
                    error = %source,
                    "Reply generation failed"
                );
                Err(TurnError::ReplyFailed {
                    source,
                    pending: Box::new(pending),
                })
            }
        }
    }
}
