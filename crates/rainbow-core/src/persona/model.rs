//! Pet persona domain model.
//!
//! A persona describes the pet that is being remembered: who it was, how it
//! spoke, and the small facts that make replies feel like that pet.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Personality preset governing tone, formality and canned phrasing.
#[derive(
    Deserialize,
    Serialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Archetype {
    /// Affectionate, exclamatory, lots of "사랑해" and hearts
    #[default]
    Sweet,
    /// Aloof on the surface, warm underneath
    Cool,
    /// Polite and reassuring, uses honorifics
    Mature,
    /// Hesitant and soft, trailing "..."
    Shy,
}

/// The pet being remembered.
///
/// Every free-text field deserializes to an empty string when absent so that
/// prompt composition never has to deal with missing values.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PetPersona {
    pub name: String,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub age_description: String,
    pub departure_date: NaiveDate,
    /// How the pet addressed the user (e.g. "누나", "엄마")
    #[serde(default)]
    pub caller_nickname: String,
    #[serde(default)]
    pub archetype: Archetype,
    #[serde(default)]
    pub free_text_personality: String,
    #[serde(default)]
    pub memories_text: String,
    #[serde(default)]
    pub favorite_treat: String,
    #[serde(default)]
    pub disliked_thing: String,
    #[serde(default)]
    pub frequent_behavior: String,
    #[serde(default)]
    pub photo_references: Vec<String>,
    #[serde(default)]
    pub background_photo_reference: String,
}

impl PetPersona {
    /// Minimal persona with every optional field empty.
    pub fn new(
        name: impl Into<String>,
        caller_nickname: impl Into<String>,
        departure_date: NaiveDate,
        archetype: Archetype,
    ) -> Self {
        Self {
            name: name.into(),
            breed: String::new(),
            age_description: String::new(),
            departure_date,
            caller_nickname: caller_nickname.into(),
            archetype,
            free_text_personality: String::new(),
            memories_text: String::new(),
            favorite_treat: String::new(),
            disliked_thing: String::new(),
            frequent_behavior: String::new(),
            photo_references: Vec::new(),
            background_photo_reference: String::new(),
        }
    }

    /// Whether a remembered photo may be attached to replies.
    pub fn has_photos(&self) -> bool {
        !self.photo_references.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let persona: PetPersona = toml::from_str(
            r#"
name = "Bori"
departure_date = "2024-03-01"
"#,
        )
        .unwrap();

        assert_eq!(persona.archetype, Archetype::Sweet);
        assert_eq!(persona.favorite_treat, "");
        assert_eq!(persona.memories_text, "");
        assert!(!persona.has_photos());
    }

    #[test]
    fn archetype_round_trips_through_names() {
        for archetype in Archetype::iter() {
            let parsed = Archetype::from_str(&archetype.to_string()).unwrap();
            assert_eq!(parsed, archetype);
        }
        assert_eq!(Archetype::from_str("shy").unwrap(), Archetype::Shy);
        assert!(Archetype::from_str("grumpy").is_err());
    }

    #[test]
    fn unknown_archetype_is_rejected_on_load() {
        let result: std::result::Result<PetPersona, _> = toml::from_str(
            r#"
name = "Bori"
departure_date = "2024-03-01"
archetype = "grumpy"
"#,
        );
        assert!(result.is_err());
    }
}
