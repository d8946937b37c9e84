//! Handling category and urgency level of a turn.
//!
//! Both are closed sets. Classifier output is loosely typed, so each enum
//! offers a lenient `parse` that accepts the canonical wire names as well as
//! the legacy colour codes, and returns `None` for anything else. Callers
//! decide the fallback; the enums never invent a value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handling track selected for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Collecting the initial profile (name, breed, age, weight).
    #[default]
    Intake,
    /// Health complaints and symptoms.
    Triage,
    /// General care, feeding and behaviour questions.
    Consultation,
    /// Off-topic or abusive requests that get a polite refusal.
    Protection,
}

impl Category {
    /// All categories, in policy table order.
    pub const ALL: [Category; 4] = [
        Category::Intake,
        Category::Triage,
        Category::Consultation,
        Category::Protection,
    ];

    /// Parses a classifier-supplied label.
    pub fn parse(label: &str) -> Option<Self> {
        match normalize(label).as_str() {
            "intake" | "initial_intake" => Some(Category::Intake),
            "triage" => Some(Category::Triage),
            "consultation" => Some(Category::Consultation),
            "protection" | "off_topic" | "refusal" => Some(Category::Protection),
            _ => None,
        }
    }

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Intake => "intake",
            Category::Triage => "triage",
            Category::Consultation => "consultation",
            Category::Protection => "protection",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity assessment driving the banner and the triage branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    /// Immediate veterinary help required.
    Emergency,
    /// A clinic visit is needed soon.
    NeedsVisit,
    /// Can be observed at home.
    Stable,
    /// Informational consultation, no visible health problem.
    Advisory,
    /// Request refused as off-topic.
    Refused,
    /// Not yet assessed.
    #[default]
    Unset,
}

impl UrgencyLevel {
    /// Parses a classifier-supplied label.
    pub fn parse(label: &str) -> Option<Self> {
        match normalize(label).as_str() {
            "emergency" | "red" => Some(UrgencyLevel::Emergency),
            "needs_visit" | "yellow" => Some(UrgencyLevel::NeedsVisit),
            "stable" | "home_care" | "green" => Some(UrgencyLevel::Stable),
            "advisory" | "blue" => Some(UrgencyLevel::Advisory),
            "refused" | "black" => Some(UrgencyLevel::Refused),
            "unset" | "idle" => Some(UrgencyLevel::Unset),
            _ => None,
        }
    }

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Emergency => "emergency",
            UrgencyLevel::NeedsVisit => "needs_visit",
            UrgencyLevel::Stable => "stable",
            UrgencyLevel::Advisory => "advisory",
            UrgencyLevel::Refused => "refused",
            UrgencyLevel::Unset => "unset",
        }
    }

    /// Short banner text shown next to the conversation.
    pub fn banner(&self) -> &'static str {
        match self {
            UrgencyLevel::Emergency => "EMERGENCY!",
            UrgencyLevel::NeedsVisit => "Clinic visit required",
            UrgencyLevel::Stable => "Stable",
            UrgencyLevel::Advisory => "Consultation",
            UrgencyLevel::Refused => "Protection",
            UrgencyLevel::Unset => "Waiting",
        }
    }

    /// Returns true if the banner should demand immediate attention.
    pub fn is_alarming(&self) -> bool {
        matches!(self, UrgencyLevel::Emergency)
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn normalize(label: &str) -> String {
    label.trim().to_lowercase().replace(['-', ' ', '/'], "_")
}
