//! Composition root.
//!
//! Wires providers, the profile store, the orchestrator and every handler
//! around one shared [`TurnGate`].

use std::sync::Arc;

use crate::adapters::ai::{
    AnthropicConfig, AnthropicProvider, LlmClassifier, LlmReplyGenerator, MockAIProvider,
    OpenAIConfig, OpenAIProvider,
};
use crate::adapters::storage::InMemoryProfileStore;
use crate::application::{
    CompleteProfileHandler, CreateProfileHandler, ListProfilesHandler, ReopenProfileHandler,
    RetryReplyHandler, SendMessageHandler, SwitchProfileHandler, TurnGate, TurnOrchestrator,
};
use crate::config::{AiConfig, AiProvider, AppConfig, TurnConfig};
use crate::domain::intake::CompletionDetector;
use crate::ports::{AIError, AIProvider, ProfileStore};
use secrecy::ExposeSecret;

/// Every handler of the intake service, sharing one store and one gate.
pub struct IntakeApp {
    pub create_profile: CreateProfileHandler,
    pub send_message: SendMessageHandler,
    pub retry_reply: RetryReplyHandler,
    pub complete_profile: CompleteProfileHandler,
    pub reopen_profile: ReopenProfileHandler,
    pub switch_profile: SwitchProfileHandler,
    pub list_profiles: ListProfilesHandler,
    gate: TurnGate,
}

impl IntakeApp {
    /// Builds the app over explicit providers and an in-memory store.
    pub fn new(
        classifier_provider: Arc<dyn AIProvider>,
        reply_provider: Arc<dyn AIProvider>,
        turn: &TurnConfig,
    ) -> Self {
        let store: Arc<dyn ProfileStore> = Arc::new(InMemoryProfileStore::new());
        let detector =
            CompletionDetector::new().with_additional_phrases(turn.extra_closing_phrases());
        let orchestrator = Arc::new(
            TurnOrchestrator::new(
                Arc::new(LlmClassifier::new(classifier_provider)),
                Arc::new(LlmReplyGenerator::new(reply_provider)),
            )
            .with_detector(detector)
            .with_reply_timeout(turn.reply_timeout()),
        );
        let gate = TurnGate::new();

        Self {
            create_profile: CreateProfileHandler::new(
                store.clone(),
                orchestrator.clone(),
                gate.clone(),
            ),
            send_message: SendMessageHandler::new(
                store.clone(),
                orchestrator.clone(),
                gate.clone(),
            ),
            retry_reply: RetryReplyHandler::new(store.clone(), orchestrator, gate.clone()),
            complete_profile: CompleteProfileHandler::new(store.clone(), gate.clone()),
            reopen_profile: ReopenProfileHandler::new(store.clone(), gate.clone()),
            switch_profile: SwitchProfileHandler::new(store.clone()),
            list_profiles: ListProfilesHandler::new(store),
            gate,
        }
    }

    /// Builds the app from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `AIError` if a provider's HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, AIError> {
        let classifier = build_provider(&config.ai, config.ai.classifier_model.as_deref())?;
        let replies = build_provider(&config.ai, config.ai.reply_model.as_deref())?;

        tracing::info!(
            provider = ?config.ai.provider,
            classifier_model = %classifier.provider_info().model,
            reply_model = %replies.provider_info().model,
            "AI providers ready"
        );

        Ok(Self::new(classifier, replies, &config.turn))
    }

    /// True while a turn holds the gate.
    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }
}

fn build_provider(ai: &AiConfig, model: Option<&str>) -> Result<Arc<dyn AIProvider>, AIError> {
    let provider: Arc<dyn AIProvider> = match ai.provider {
        AiProvider::Anthropic => {
            let key = ai
                .anthropic_api_key
                .as_ref()
                .ok_or(AIError::AuthenticationFailed)?;
            let mut config = AnthropicConfig::new(key.expose_secret().clone())
                .with_timeout(ai.timeout())
                .with_max_retries(ai.max_retries);
            if let Some(model) = model {
                config = config.with_model(model);
            }
            Arc::new(AnthropicProvider::new(config)?)
        }
        AiProvider::OpenAI => {
            let key = ai
                .openai_api_key
                .as_ref()
                .ok_or(AIError::AuthenticationFailed)?;
            let mut config = OpenAIConfig::new(key.expose_secret().clone())
                .with_timeout(ai.timeout())
                .with_max_retries(ai.max_retries);
            if let Some(model) = model {
                config = config.with_model(model);
            }
            Arc::new(OpenAIProvider::new(config)?)
        }
        AiProvider::Mock => Arc::new(MockAIProvider::new()),
    };
    Ok(provider)
}
