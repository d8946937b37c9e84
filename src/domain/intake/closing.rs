//! Closing-intent detection and the completion latch.

use super::Category;

/// Phrases that signal the owner is wrapping up.
pub const DEFAULT_CLOSING_PHRASES: [&str; 12] = [
    "goodbye",
    "see you",
    "heading to the clinic",
    "on our way to the clinic",
    "going to the vet",
    "thanks for the help",
    "thank you for the help",
    "thanks for your help",
    "едем",
    "поедем",
    "спасибо за помощь",
    "до свидания",
];

/// Lexical closing-intent check.
#[derive(Debug, Clone)]
pub struct CompletionDetector {
    phrases: Vec<String>,
}

impl Default for CompletionDetector {
    fn default() -> Self {
        Self {
            phrases: DEFAULT_CLOSING_PHRASES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl CompletionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds phrases on top of the defaults. Blank entries are ignored.
    pub fn with_additional_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for phrase in phrases {
            let phrase = phrase.as_ref().trim().to_lowercase();
            if !phrase.is_empty() && !self.phrases.contains(&phrase) {
                self.phrases.push(phrase);
            }
        }
        self
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Case-insensitive substring match against the phrase set.
    pub fn is_closing(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.phrases.iter().any(|p| lowered.contains(p.as_str()))
    }

    /// Next value of the completion latch.
    ///
    /// Once set it stays set. A closing phrase only sets it outside intake,
    /// so a "goodbye" during the first questions does not end the session.
    pub fn latch(&self, previously_completed: bool, text: &str, category: Category) -> bool {
        previously_completed || (category != Category::Intake && self.is_closing(text))
    }
}
