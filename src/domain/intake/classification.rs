//! Classification results and boundary validation of classifier output.
//!
//! Classifier output is an untrusted, loosely shaped JSON document. It is
//! validated here against the closed category/urgency sets before anything
//! reaches the turn pipeline. Unknown or missing values fall back to the
//! profile's current state; they never raise.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::extractor::{ExtractionError, JsonExtractor};
use super::{Category, ExtractedCard, PetProfile, UrgencyLevel};

/// Field names accepted for each part of the payload, canonical first.
const CATEGORY_KEYS: [&str; 2] = ["category", "branch"];
const URGENCY_KEYS: [&str; 2] = ["urgency", "status"];
const CARD_KEYS: [&str; 4] = ["extracted_card", "extractedData", "extracted_data", "card"];
const REPLY_KEYS: [&str; 3] = ["suggested_replies", "buttons", "suggestions"];

/// Outcome of classifying one turn. Transient: only its merged effect persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub urgency: UrgencyLevel,
    pub extracted_card: ExtractedCard,
    pub suggested_replies: Vec<String>,
}

/// Reasons a classifier payload could not be read at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClassificationParseError {
    #[error("Classifier output could not be extracted: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Classifier output is not a JSON object")]
    NotAnObject,
}

impl ClassificationResult {
    /// A no-op classification: the profile's current category, urgency and
    /// card, with no suggestions.
    pub fn unchanged(profile: &PetProfile) -> Self {
        Self {
            category: profile.category(),
            urgency: profile.urgency(),
            extracted_card: ExtractedCard::from(profile.card()),
            suggested_replies: Vec::new(),
        }
    }

    /// Parses raw classifier text (possibly wrapped in prose or a code block).
    pub fn from_text(raw: &str, profile: &PetProfile) -> Result<Self, ClassificationParseError> {
        let value = JsonExtractor::new().extract_value(raw)?;
        Self::from_json(&value, profile)
    }

    /// Validates a parsed payload against the closed enum sets.
    pub fn from_json(value: &Value, profile: &PetProfile) -> Result<Self, ClassificationParseError> {
        let object = value
            .as_object()
            .ok_or(ClassificationParseError::NotAnObject)?;

        let category = first_str(object, &CATEGORY_KEYS)
            .and_then(Category::parse)
            .unwrap_or_else(|| profile.category());

        let urgency = first_str(object, &URGENCY_KEYS)
            .and_then(UrgencyLevel::parse)
            .unwrap_or_else(|| profile.urgency());

        let extracted_card = CARD_KEYS
            .iter()
            .find_map(|key| object.get(*key))
            .map(read_card)
            .unwrap_or_default();

        let suggested_replies = REPLY_KEYS
            .iter()
            .find_map(|key| object.get(*key))
            .map(read_string_list)
            .unwrap_or_default();

        Ok(Self {
            category,
            urgency,
            extracted_card,
            suggested_replies,
        })
    }
}

fn first_str<'a>(object: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| object.get(*key)).and_then(Value::as_str)
}

fn read_card(value: &Value) -> ExtractedCard {
    let scalar = |key: &str| match value.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    ExtractedCard {
        name: scalar("name"),
        age: scalar("age"),
        breed: scalar("breed"),
        weight: scalar("weight"),
        symptoms: value.get("symptoms").map(read_string_list).unwrap_or_default(),
    }
}

fn read_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Value::String(single) if !single.trim().is_empty() => vec![single.trim().to_string()],
        _ => Vec::new(),
    }
}
