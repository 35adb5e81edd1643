//! Persona onboarding request.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Archetype, PetPersona};
use crate::error::{RainbowError, Result};

/// Request to create (or replace) the pet persona of a user.
///
/// Mirrors the onboarding form: identity first, then personality, memories,
/// the three concrete facts, and finally photos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePetPersonaRequest {
    pub name: String,
    pub breed: String,
    #[serde(default)]
    pub age_description: Option<String>,
    pub departure_date: NaiveDate,
    pub caller_nickname: String,
    #[serde(default)]
    pub archetype: Archetype,
    #[serde(default)]
    pub free_text_personality: Option<String>,
    pub memories_text: String,
    pub favorite_treat: String,
    pub disliked_thing: String,
    pub frequent_behavior: String,
    #[serde(default)]
    pub photo_references: Vec<String>,
    #[serde(default)]
    pub background_photo_reference: Option<String>,
}

impl CreatePetPersonaRequest {
    /// Validate the request and return the first problem found.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("name", &self.name),
            ("breed", &self.breed),
            ("caller_nickname", &self.caller_nickname),
            ("memories_text", &self.memories_text),
            ("favorite_treat", &self.favorite_treat),
            ("disliked_thing", &self.disliked_thing),
            ("frequent_behavior", &self.frequent_behavior),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(RainbowError::validation(format!(
                    "{field} is required and cannot be empty"
                )));
            }
        }

        if self.photo_references.iter().any(|p| p.trim().is_empty()) {
            return Err(RainbowError::validation(
                "photo_references cannot contain empty entries",
            ));
        }

        if let Some(background) = self.background_photo_reference.as_deref() {
            let background = background.trim();
            if !background.is_empty() && !self.photo_references.iter().any(|p| p == background) {
                return Err(RainbowError::validation(
                    "background_photo_reference must be one of photo_references",
                ));
            }
        }

        Ok(())
    }

    /// Convert this request into a persona, trimming text and defaulting
    /// optional fields to empty strings.
    pub fn into_persona(self) -> PetPersona {
        fn clean(value: Option<String>) -> String {
            value.map(|v| v.trim().to_string()).unwrap_or_default()
        }

        PetPersona {
            name: self.name.trim().to_string(),
            breed: self.breed.trim().to_string(),
            age_description: clean(self.age_description),
            departure_date: self.departure_date,
            caller_nickname: self.caller_nickname.trim().to_string(),
            archetype: self.archetype,
            free_text_personality: clean(self.free_text_personality),
            memories_text: self.memories_text.trim().to_string(),
            favorite_treat: self.favorite_treat.trim().to_string(),
            disliked_thing: self.disliked_thing.trim().to_string(),
            frequent_behavior: self.frequent_behavior.trim().to_string(),
            photo_references: self.photo_references,
            background_photo_reference: clean(self.background_photo_reference),
        }
    }

    /// Create a request from an existing persona (for editing).
    pub fn from_persona(persona: &PetPersona) -> Self {
        fn optional(value: &str) -> Option<String> {
            (!value.is_empty()).then(|| value.to_string())
        }

        Self {
            name: persona.name.clone(),
            breed: persona.breed.clone(),
            age_description: optional(&persona.age_description),
            departure_date: persona.departure_date,
            caller_nickname: persona.caller_nickname.clone(),
            archetype: persona.archetype,
            free_text_personality: optional(&persona.free_text_personality),
            memories_text: persona.memories_text.clone(),
            favorite_treat: persona.favorite_treat.clone(),
            disliked_thing: persona.disliked_thing.clone(),
            frequent_behavior: persona.frequent_behavior.clone(),
            photo_references: persona.photo_references.clone(),
            background_photo_reference: optional(&persona.background_photo_reference),
        }
    }
}
