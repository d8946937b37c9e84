//! Patient card and the merge engine.
//!
//! The card accumulates what is known about a pet across turns. Scalar
//! fields only ever move from a sentinel towards a real value, and the
//! symptom list is an insertion-ordered set that only grows.

use serde::{Deserialize, Serialize};

/// Placeholder stored in a scalar field that is not yet known.
pub const UNKNOWN: &str = "unknown";

/// Scalar fields of the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardField {
    Name,
    Age,
    Breed,
    Weight,
}

impl CardField {
    /// All scalar fields in display order.
    pub const ALL: [CardField; 4] = [
        CardField::Name,
        CardField::Age,
        CardField::Breed,
        CardField::Weight,
    ];

    /// Returns true if `value` marks this field as not yet known.
    ///
    /// Empty strings, `unknown` and `?` are sentinels for every field;
    /// the name additionally treats "not specified" as a sentinel.
    /// Comparison ignores case and surrounding whitespace.
    pub fn is_sentinel(&self, value: &str) -> bool {
        let value = value.trim().to_lowercase();
        if value.is_empty() || value == UNKNOWN || value == "?" {
            return true;
        }
        matches!(self, CardField::Name) && (value == "not specified" || value == "не указано")
    }

    /// Field label as used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            CardField::Name => "name",
            CardField::Age => "age",
            CardField::Breed => "breed",
            CardField::Weight => "weight",
        }
    }
}

/// Structured, accumulating attributes of a pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientCard {
    pub name: String,
    pub age: String,
    pub breed: String,
    pub weight: String,
    pub symptoms: Vec<String>,
}

impl PatientCard {
    /// Creates a card with every scalar field unknown and no symptoms.
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            age: UNKNOWN.to_string(),
            breed: UNKNOWN.to_string(),
            weight: UNKNOWN.to_string(),
            symptoms: Vec::new(),
        }
    }

    /// Returns the value of a scalar field.
    pub fn get(&self, field: CardField) -> &str {
        match field {
            CardField::Name => &self.name,
            CardField::Age => &self.age,
            CardField::Breed => &self.breed,
            CardField::Weight => &self.weight,
        }
    }

    fn slot_mut(&mut self, field: CardField) -> &mut String {
        match field {
            CardField::Name => &mut self.name,
            CardField::Age => &mut self.age,
            CardField::Breed => &mut self.breed,
            CardField::Weight => &mut self.weight,
        }
    }

    /// Returns true if the field holds a real value.
    pub fn is_known(&self, field: CardField) -> bool {
        !field.is_sentinel(self.get(field))
    }

    /// Merges extracted attributes into this card, producing a new card.
    ///
    /// See [`merge`].
    pub fn merged_with(&self, extracted: &ExtractedCard) -> PatientCard {
        merge(self, extracted)
    }
}

impl Default for PatientCard {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Raw card fields produced by classification.
///
/// Every scalar may be absent or a sentinel; symptoms lists only what the
/// classifier reported, which may repeat known entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedCard {
    pub name: Option<String>,
    pub age: Option<String>,
    pub breed: Option<String>,
    pub weight: Option<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
}

impl ExtractedCard {
    /// Returns the extracted value of a scalar field, if any.
    pub fn get(&self, field: CardField) -> Option<&str> {
        match field {
            CardField::Name => self.name.as_deref(),
            CardField::Age => self.age.as_deref(),
            CardField::Breed => self.breed.as_deref(),
            CardField::Weight => self.weight.as_deref(),
        }
    }
}

impl From<&PatientCard> for ExtractedCard {
    fn from(card: &PatientCard) -> Self {
        Self {
            name: Some(card.name.clone()),
            age: Some(card.age.clone()),
            breed: Some(card.breed.clone()),
            weight: Some(card.weight.clone()),
            symptoms: card.symptoms.clone(),
        }
    }
}

/// Merges `extracted` into `current`. Pure and total.
///
/// - A scalar adopts the extracted value only when it is present and not a
///   sentinel; otherwise the current value is retained.
/// - Symptoms become the current list followed by every extracted symptom
///   not already present (exact, case-sensitive match). Blank entries are
///   dropped.
pub fn merge(current: &PatientCard, extracted: &ExtractedCard) -> PatientCard {
    let mut merged = current.clone();

    for field in CardField::ALL {
        if let Some(value) = extracted.get(field) {
            if !field.is_sentinel(value) {
                *merged.slot_mut(field) = value.to_string();
            }
        }
    }

    for symptom in &extracted.symptoms {
        if symptom.trim().is_empty() {
            continue;
        }
        if !merged.symptoms.iter().any(|known| known == symptom) {
            merged.symptoms.push(symptom.clone());
        }
    }

    merged
}
