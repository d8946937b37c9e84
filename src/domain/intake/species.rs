//! Species a profile can be opened for.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Kind of animal a profile tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Dog,
    Cat,
    Rodent,
    Bird,
    Reptile,
    Other,
}

impl Species {
    /// All selectable species, in menu order.
    pub const ALL: [Species; 6] = [
        Species::Dog,
        Species::Cat,
        Species::Rodent,
        Species::Bird,
        Species::Reptile,
        Species::Other,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Species::Dog => "Dog",
            Species::Cat => "Cat",
            Species::Rodent => "Rodent",
            Species::Bird => "Bird",
            Species::Reptile => "Reptile",
            Species::Other => "Other",
        }
    }

    /// Seed text for the silent opening turn. Never stored in the transcript.
    pub fn opening_seed(&self) -> String {
        format!("Pet species: {}. Session start.", self.label())
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Species {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        if needle.is_empty() {
            return Err(ValidationError::empty_field("species"));
        }
        Species::ALL
            .into_iter()
            .find(|species| species.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                ValidationError::invalid_format("species", format!("unknown species '{}'", needle))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_case_insensitively() {
        assert_eq!("dog".parse::<Species>().unwrap(), Species::Dog);
        assert_eq!(" CAT ".parse::<Species>().unwrap(), Species::Cat);
    }

    #[test]
    fn rejects_empty_and_unknown() {
        assert!(matches!(
            "".parse::<Species>(),
            Err(ValidationError::EmptyField { .. })
        ));
        assert!(matches!(
            "dragon".parse::<Species>(),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn opening_seed_names_species() {
        assert_eq!(Species::Bird.opening_seed(), "Pet species: Bird. Session start.");
    }
}
