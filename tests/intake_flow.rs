//! End-to-end tests for the intake flow.
//!
//! These tests drive the public handlers through `IntakeApp` with two
//! scripted providers (one for classification, one for replies) and an
//! in-memory store:
//! 1. Conversation lifecycle from greeting to completion and reopen
//! 2. Single-flight turn gate
//! 3. Failure paths (classification degrade, reply failure and retry)

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use pet_triage::adapters::ai::{MockAIProvider, MockError};
use pet_triage::application::{
    CreateProfileCommand, IntakeError, ReopenProfileCommand, RetryReplyCommand,
    SendMessageCommand, SwitchProfileCommand,
};
use pet_triage::config::TurnConfig;
use pet_triage::domain::intake::{
    Attachment, Category, PetProfile, Species, UrgencyLevel, EMERGENCY_DISCLAIMER,
    STARTER_REPLIES,
};
use pet_triage::IntakeApp;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Fixture {
    app: Arc<IntakeApp>,
    classifier: MockAIProvider,
    replies: MockAIProvider,
}

impl Fixture {
    fn new() -> Self {
        Self::with_replies(MockAIProvider::new())
    }

    fn with_replies(replies: MockAIProvider) -> Self {
        let classifier = MockAIProvider::new();
        let app = IntakeApp::new(
            Arc::new(classifier.clone()),
            Arc::new(replies.clone()),
            &TurnConfig::default(),
        );
        Self {
            app: Arc::new(app),
            classifier,
            replies,
        }
    }

    async fn create(&self, species: Species) -> PetProfile {
        self.app
            .create_profile
            .handle(CreateProfileCommand::new(species))
            .await
            .expect("profile creation")
            .profile
    }

    async fn send(&self, text: &str) -> Result<PetProfile, IntakeError> {
        self.app
            .send_message
            .handle(SendMessageCommand::new(text))
            .await
            .map(|result| result.profile)
    }

    async fn stored(&self, profile: &PetProfile) -> PetProfile {
        let listing = self.app.list_profiles.handle().await.unwrap();
        listing
            .profiles
            .into_iter()
            .find(|p| p.id() == profile.id())
            .expect("profile stored")
    }
}

/// Waits until the reply provider has been called `calls` times, i.e. the
/// turn in the background is parked inside reply generation.
async fn wait_for_reply_call(replies: &MockAIProvider, calls: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while replies.call_count() < calls {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("turn never reached reply generation");
}

const INTAKE_REX: &str = r#"{"category":"intake","urgency":"unset","extracted_card":{"name":"Rex","age":"3 years","breed":"unknown","weight":"?"},"suggested_replies":["He is a beagle","12 kg"]}"#;

const TRIAGE_RED: &str = r#"```json
{"branch":"TRIAGE","status":"RED","extractedData":{"symptoms":["seizures"]},"buttons":["It stopped"]}
```"#;

const TRIAGE_YELLOW: &str =
    r#"{"category":"triage","urgency":"needs_visit","extracted_card":{"symptoms":["seizures","limping"]}}"#;

// =============================================================================
// Conversation lifecycle
// =============================================================================

#[tokio::test]
async fn new_profile_is_greeted_silently() {
    let fx = Fixture::new();
    fx.replies.queue_response("Hello! What's your dog's name?");

    let profile = fx.create(Species::Dog).await;

    assert_eq!(profile.transcript().len(), 1);
    assert!(!profile.transcript()[0].is_user());
    assert_eq!(profile.quick_replies().len(), STARTER_REPLIES.len());
    let seed_call = &fx.replies.get_calls()[0];
    assert_eq!(seed_call.messages[0].content, "Pet species: Dog. Session start.");
}

#[tokio::test]
async fn conversation_accumulates_card_and_latches_on_goodbye() {
    let fx = Fixture::new();
    let profile = fx.create(Species::Dog).await;

    fx.classifier.queue_response(INTAKE_REX);
    fx.replies.queue_response("Nice to meet Rex! What breed is he?");
    let profile_after_intake = fx.send("His name is Rex, he is 3").await.unwrap();
    assert_eq!(profile_after_intake.card().name, "Rex");
    assert_eq!(profile_after_intake.card().age, "3 years");
    assert_eq!(profile_after_intake.card().weight, "unknown");
    assert_eq!(profile_after_intake.quick_replies(), vec!["He is a beagle", "12 kg"]);

    fx.classifier.queue_response(TRIAGE_RED);
    fx.replies.queue_response("This is serious. Go now.");
    let profile_after_red = fx.send("He is shaking and falling over").await.unwrap();
    assert_eq!(profile_after_red.category(), Category::Triage);
    assert_eq!(profile_after_red.urgency(), UrgencyLevel::Emergency);
    assert_eq!(profile_after_red.card().name, "Rex");
    let red_prompt = fx.replies.get_calls().last().unwrap().system_prompt.clone().unwrap();
    assert!(red_prompt.contains(EMERGENCY_DISCLAIMER));

    fx.classifier.queue_response(TRIAGE_YELLOW);
    fx.replies.queue_response("Good luck, drive safely.");
    let closed = fx.send("Thanks, heading to the clinic now").await.unwrap();
    assert!(closed.is_completed());
    assert_eq!(closed.card().symptoms, vec!["seizures", "limping"]);
    assert_eq!(closed.transcript().len(), 7);

    let refused = fx.send("One more thing").await.unwrap_err();
    assert!(matches!(refused, IntakeError::ProfileCompleted(_)));

    fx.app
        .reopen_profile
        .handle(ReopenProfileCommand { profile_id: profile.id() })
        .await
        .unwrap();
    let resumed = fx.send("One more thing").await.unwrap();
    assert!(!resumed.is_completed());
    assert_eq!(resumed.transcript().len(), 9);
}

#[tokio::test]
async fn goodbye_during_intake_does_not_complete() {
    let fx = Fixture::new();
    fx.create(Species::Cat).await;

    let profile = fx.send("Thanks for the help, goodbye").await.unwrap();

    assert_eq!(profile.category(), Category::Intake);
    assert!(!profile.is_completed());
}

#[tokio::test]
async fn attachment_reaches_reply_but_not_classification() {
    let fx = Fixture::new();
    fx.create(Species::Dog).await;
    let photo = Attachment::new(vec![0x89, 0x50, 0x4E, 0x47], "image/png", "paw.png");

    fx.app
        .send_message
        .handle(SendMessageCommand::new("Look at his paw").with_attachment(photo.clone()))
        .await
        .unwrap();

    let reply_call = fx.replies.get_calls().last().unwrap().clone();
    assert_eq!(reply_call.messages.last().unwrap().attachment.as_ref(), Some(&photo));
    let classify_call = fx.classifier.get_calls().last().unwrap().clone();
    assert!(classify_call.messages.iter().all(|m| m.attachment.is_none()));
}

// =============================================================================
// Single-flight gate
// =============================================================================

#[tokio::test]
async fn concurrent_send_is_rejected_while_turn_in_flight() {
    let release = Arc::new(Notify::new());
    let fx = Fixture::with_replies(MockAIProvider::new().with_hold(release.clone()));
    release.notify_one();
    let profile = fx.create(Species::Dog).await;

    let app = fx.app.clone();
    let first = tokio::spawn(async move {
        app.send_message
            .handle(SendMessageCommand::new("He is limping"))
            .await
    });
    wait_for_reply_call(&fx.replies, 2).await;
    assert!(fx.app.is_busy());

    let second = fx.send("Also he is not eating").await.unwrap_err();
    assert!(matches!(second, IntakeError::TurnInFlight));
    let create = fx
        .app
        .create_profile
        .handle(CreateProfileCommand::new(Species::Cat))
        .await
        .unwrap_err();
    assert!(matches!(create, IntakeError::TurnInFlight));

    let pending_state = fx.stored(&profile).await;
    assert_eq!(pending_state.transcript().len(), 2);
    assert_eq!(pending_state.transcript()[1].text, "He is limping");

    release.notify_one();
    let finished = first.await.unwrap().unwrap().profile;
    assert_eq!(finished.transcript().len(), 3);
    assert!(finished.transcript().iter().all(|m| m.text != "Also he is not eating"));
    assert!(!fx.app.is_busy());
}

#[tokio::test]
async fn switching_mid_turn_keeps_reply_on_original_profile() {
    let release = Arc::new(Notify::new());
    let fx = Fixture::with_replies(MockAIProvider::new().with_hold(release.clone()));
    release.notify_one();
    let dog = fx.create(Species::Dog).await;
    release.notify_one();
    let cat = fx.create(Species::Cat).await;
    fx.app
        .switch_profile
        .handle(SwitchProfileCommand { profile_id: dog.id() })
        .await
        .unwrap();

    let app = fx.app.clone();
    let turn = tokio::spawn(async move {
        app.send_message
            .handle(SendMessageCommand::new("He vomited twice"))
            .await
    });
    wait_for_reply_call(&fx.replies, 3).await;

    fx.app
        .switch_profile
        .handle(SwitchProfileCommand { profile_id: cat.id() })
        .await
        .unwrap();
    release.notify_one();
    turn.await.unwrap().unwrap();

    assert_eq!(fx.stored(&dog).await.transcript().len(), 3);
    assert_eq!(fx.stored(&cat).await.transcript().len(), 1);
    let listing = fx.app.list_profiles.handle().await.unwrap();
    assert_eq!(listing.active_id, Some(cat.id()));
}

// =============================================================================
// Failure paths
// =============================================================================

#[tokio::test]
async fn broken_classifier_output_keeps_state() {
    let fx = Fixture::new();
    fx.create(Species::Bird).await;
    fx.classifier.queue_response(TRIAGE_YELLOW);
    let before = fx.send("She has been limping").await.unwrap();

    fx.classifier.queue_response("I cannot classify this.");
    let after = fx.send("Is that bad?").await.unwrap();

    assert_eq!(after.category(), before.category());
    assert_eq!(after.urgency(), before.urgency());
    assert_eq!(after.card(), before.card());
    assert!(after.suggested_replies().is_empty());
}

#[tokio::test]
async fn classifier_transport_error_keeps_state() {
    let fx = Fixture::new();
    let profile = fx.create(Species::Rodent).await;
    fx.classifier.queue_error(MockError::Network {
        message: "connection reset".to_string(),
    });

    let after = fx.send("He sneezes a lot").await.unwrap();

    assert_eq!(after.category(), profile.category());
    assert_eq!(after.urgency(), profile.urgency());
    assert_eq!(after.transcript().len(), 3);
}

#[tokio::test]
async fn failed_reply_can_be_retried() {
    let fx = Fixture::new();
    let profile = fx.create(Species::Dog).await;
    fx.classifier.queue_response(TRIAGE_YELLOW);
    fx.replies.queue_error(MockError::RateLimited { retry_after_secs: 1 });

    let err = fx.send("He is limping").await.unwrap_err();
    let unanswered = fx.stored(&profile).await;
    assert_eq!(unanswered.transcript().len(), 2);
    assert!(unanswered.transcript()[1].is_user());
    assert!(!fx.app.is_busy());

    let classify_calls = fx.classifier.call_count();
    fx.replies.queue_response("Please book a visit.");
    let pending = err.into_pending_turn().expect("reply failure is resumable");
    let retried = fx
        .app
        .retry_reply
        .handle(RetryReplyCommand::new(pending))
        .await
        .unwrap()
        .profile;

    assert_eq!(fx.classifier.call_count(), classify_calls);
    assert_eq!(retried.transcript().len(), 3);
    assert_eq!(retried.transcript()[2].text, "Please book a visit.");
    assert_eq!(retried.urgency(), UrgencyLevel::NeedsVisit);
}

#[tokio::test]
async fn resend_after_failure_keeps_both_user_messages() {
    let fx = Fixture::new();
    let profile = fx.create(Species::Cat).await;
    fx.replies.queue_error(MockError::Unavailable {
        message: "overloaded".to_string(),
    });
    fx.send("She is not eating").await.unwrap_err();

    fx.replies.queue_response("How long has it been?");
    let after = fx.send("She is not eating").await.unwrap();

    assert_eq!(after.id(), profile.id());
    assert_eq!(after.transcript().len(), 4);
    assert!(after.transcript()[1].is_user());
    assert!(after.transcript()[2].is_user());
    let reply_call = fx.replies.get_calls().last().unwrap().clone();
    assert_eq!(reply_call.messages.len(), 3);
}
