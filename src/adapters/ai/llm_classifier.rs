//! LLM-backed implementation of the Classifier port.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::intake::{CardField, ClassificationResult, PatientCard, PetProfile};
use crate::ports::{AIProvider, Classifier, CompletionRequest, MessageRole, RequestMetadata};

/// Classifier that asks an LLM for a JSON verdict on each turn.
///
/// Any failure (transport error, unreadable output) degrades to
/// [`ClassificationResult::unchanged`] and is logged at `warn`.
pub struct LlmClassifier {
    ai_provider: Arc<dyn AIProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl LlmClassifier {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self {
            ai_provider,
            temperature: 0.2,
            max_tokens: 600,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn build_prompt(profile: &PetProfile, raw_text: &str) -> String {
        let card = render_card(profile.card());

        format!(
            r#"You classify messages sent to a veterinary clinic assistant.

Pet species: {species}.
Owner's message: "{text}".
Current patient card: {card}

Choose "category":
- "intake": greeting, or the owner is giving the pet's name, breed, age or weight
- "triage": the owner describes symptoms, an injury or a health problem
- "consultation": questions about care, feeding, grooming or behavior
- "protection": anything unrelated to the pet's health or care

Choose "urgency":
- "emergency": critical situation (acute pain, seizures, paralysis of limbs, heavy bleeding, loss of consciousness); immediate veterinary help is needed
- "needs_visit": a visit to the vet is needed (lethargy, refusing food for more than a day, vomiting or diarrhea for more than 12 hours, lameness, unusual discharge, injuries)
- "stable": can be observed at home (mild lethargy after a vaccination, a small cut without bleeding, coughing once or twice with no other symptoms)
- "advisory": a care or consultation question with no health concern
- "refused": the request is off-topic
- "unset": nothing to assess yet

Extract into "extracted_card" only what the message states about the pet: "name", "age", "breed", "weight" (use "unknown" when not mentioned) and "symptoms" (a list of short phrases, empty when none).

Suggest 2 to 4 short replies the owner could tap next in "suggested_replies".

Return ONLY a JSON object with these fields:
{{"category": "...", "urgency": "...", "extracted_card": {{"name": "...", "age": "...", "breed": "...", "weight": "...", "symptoms": []}}, "suggested_replies": []}}"#,
            species = profile.species().label(),
            text = raw_text,
            card = card,
        )
    }
}

/// `name: Rex; age: unknown; ...; symptoms: limping`
fn render_card(card: &PatientCard) -> String {
    let mut parts: Vec<String> = CardField::ALL
        .iter()
        .map(|field| format!("{}: {}", field.label(), card.get(*field)))
        .collect();
    let symptoms = if card.symptoms.is_empty() {
        "none".to_string()
    } else {
        card.symptoms.join(", ")
    };
    parts.push(format!("symptoms: {symptoms}"));
    parts.join("; ")
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, profile: &PetProfile, raw_text: &str) -> ClassificationResult {
        let request = CompletionRequest::new(
            RequestMetadata::new("classify").for_profile(profile.id()),
        )
        .with_message(MessageRole::User, Self::build_prompt(profile, raw_text))
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens)
        .with_json_mode();

        let response = match self.ai_provider.complete(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(
                    profile_id = %profile.id(),
                    error = %err,
                    "Classification request failed, keeping current state"
                );
                return ClassificationResult::unchanged(profile);
            }
        };

        match ClassificationResult::from_text(&response.content, profile) {
            Ok(result) => {
                tracing::debug!(
                    profile_id = %profile.id(),
                    category = %result.category,
                    urgency = %result.urgency,
                    tokens = response.usage.total_tokens,
                    "Turn classified"
                );
                result
            }
            Err(err) => {
                tracing::warn!(
                    profile_id = %profile.id(),
                    error = %err,
                    "Classifier output unreadable, keeping current state"
                );
                ClassificationResult::unchanged(profile)
            }
        }
    }
}
