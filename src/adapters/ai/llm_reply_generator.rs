//! LLM-backed implementation of the ReplyGenerator port.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::intake::{BehaviorScript, Message, ResponseSanitizer, Role};
use crate::ports::{
    self, AIProvider, CompletionRequest, MessageRole, ReplyError, ReplyGenerator, RequestMetadata,
};

/// Generates assistant replies by forwarding the whole transcript, with
/// attachments, under the script's system prompt.
pub struct LlmReplyGenerator {
    ai_provider: Arc<dyn AIProvider>,
    sanitizer: ResponseSanitizer,
    temperature: f32,
    max_tokens: u32,
}

impl LlmReplyGenerator {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self {
            ai_provider,
            sanitizer: ResponseSanitizer::new(),
            temperature: 0.7,
            max_tokens: 1024,
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

    fn to_provider_message(message: &Message) -> ports::Message {
        let role = match message.role {
            Role::User => MessageRole::User,
            Role::Assistant => MessageRole::Assistant,
        };
        ports::Message::new(role, message.text.clone()).with_attachment(message.attachment.clone())
    }
}

#[async_trait]
impl ReplyGenerator for LlmReplyGenerator {
    async fn generate_reply(
        &self,
        transcript: &[Message],
        script: &BehaviorScript,
    ) -> Result<String, ReplyError> {
        let request = CompletionRequest::new(RequestMetadata::new("reply"))
            .with_messages(transcript.iter().map(Self::to_provider_message).collect())
            .with_system_prompt(script.system_prompt())
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        let estimated_tokens: u32 = request
            .messages
            .iter()
            .map(|m| self.ai_provider.estimate_tokens(&m.content))
            .sum();
        tracing::debug!(
            category = %script.category(),
            messages = request.messages.len(),
            bytes = request.text_len(),
            estimated_tokens,
            "Requesting reply"
        );

        let response = self.ai_provider.complete(request).await?;
        let reply = self.sanitizer.sanitize(&response.content)?;

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::intake::{select_script, Attachment, Category, UrgencyLevel};
    use crate::ports::AIError;

    fn generator(provider: &MockAIProvider) -> LlmReplyGenerator {
        LlmReplyGenerator::new(Arc::new(provider.clone()))
    }

    #[tokio::test]
    async fn forwards_transcript_attachments_and_script() {
        let provider = MockAIProvider::new().with_response("Please keep him still.");
        let transcript = vec![
            Message::assistant("Hello! What's your dog's name?"),
            Message::user("Rex, look at his paw").with_attachment(Some(Attachment::new(
                vec![1, 2, 3],
                "image/png",
                "paw.png",
            ))),
        ];
        let script = select_script(Category::Triage).with_assessed_urgency(UrgencyLevel::NeedsVisit);

        let reply = generator(&provider)
            .generate_reply(&transcript, &script)
            .await
            .unwrap();

        assert_eq!(reply, "Please keep him still.");
        let call = &provider.get_calls()[0];
        assert_eq!(call.messages.len(), 2);
        assert_eq!(call.messages[0].role, MessageRole::Assistant);
        assert!(call.messages[1].attachment.is_some());
        assert_eq!(call.system_prompt.as_deref(), Some(script.system_prompt().as_str()));
        assert!(!call.json_mode);
    }

    #[tokio::test]
    async fn sanitizes_reply() {
        let provider = MockAIProvider::new().with_response("**Stay calm.**\n\n\n\nCall us.");
        let reply = generator(&provider)
            .generate_reply(&[Message::user("help")], &select_script(Category::Triage))
            .await
            .unwrap();
        assert_eq!(reply, "Stay calm.\n\nCall us.");
    }

    #[tokio::test]
    async fn provider_error_propagates() {
        let provider = MockAIProvider::new().with_error(MockError::Unavailable {
            message: "overloaded".to_string(),
        });
        let err = generator(&provider)
            .generate_reply(&[Message::user("hi")], &select_script(Category::Intake))
            .await
            .unwrap_err();
        assert!(matches!(err, ReplyError::Provider(AIError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn empty_reply_is_an_error() {
        let provider = MockAIProvider::new().with_response("   ");
        let err = generator(&provider)
            .generate_reply(&[Message::user("hi")], &select_script(Category::Intake))
            .await
            .unwrap_err();
        assert!(matches!(err, ReplyError::Sanitization(_)));
    }
}
