//! Conversation message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RainbowError, Result};

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Pet,
}

/// One turn of the conversation.
///
/// Messages are immutable once created. A message always carries text, a
/// photo, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: String,
    pub sender: Sender,
    #[serde(default)]
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_reference: Option<String>,
    #[serde(default)]
    pub is_safety_response: bool,
}

impl ConversationMessage {
    /// Creates a message stamped with a fresh id and the current time.
    ///
    /// Fails when both `text` and `photo_reference` are empty.
    pub fn new(
        sender: Sender,
        text: impl Into<String>,
        photo_reference: Option<String>,
    ) -> Result<Self> {
        let text = text.into();
        let photo_reference = photo_reference.filter(|p| !p.trim().is_empty());

        if text.trim().is_empty() && photo_reference.is_none() {
            return Err(RainbowError::validation(
                "a message needs text or a photo",
            ));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            sender,
            text,
            timestamp: Utc::now(),
            photo_reference,
            is_safety_response: false,
        })
    }

    /// A message typed by the user.
    pub fn from_user(text: impl Into<String>, photo_reference: Option<String>) -> Result<Self> {
        Self::new(Sender::User, text, photo_reference)
    }

    /// A reply spoken by the pet.
    pub fn from_pet(text: impl Into<String>) -> Result<Self> {
        Self::new(Sender::Pet, text, None)
    }

    /// Marks this message as a canned safety reply.
    pub fn into_safety_response(mut self) -> Self {
        self.is_safety_response = true;
        self
    }

    /// Attaches a photo to the message.
    pub fn with_photo(mut self, photo_reference: impl Into<String>) -> Self {
        self.photo_reference = Some(photo_reference.into());
        self
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }

    pub fn has_photo(&self) -> bool {
        self.photo_reference.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_is_rejected() {
        let err = ConversationMessage::from_user("  ", None).unwrap_err();
        assert!(err.is_validation());

        let err = ConversationMessage::from_user("", Some("".to_string())).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn photo_only_message_is_allowed() {
        let msg = ConversationMessage::from_user("", Some("https://img/1.jpg".to_string())).unwrap();
        assert!(msg.has_photo());
        assert!(msg.text.is_empty());
        assert!(!msg.is_safety_response);
    }

    #[test]
    fn serialized_message_omits_missing_photo() {
        let msg = ConversationMessage::from_pet("잘 지내!").unwrap();
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("photo_reference"));
        assert!(json.contains("\"sender\":\"pet\""));

        let back: ConversationMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
