//! Gifts and dream journal entries, plus their repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::error::Result;

/// Virtual gifts a user can send to the pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GiftKind {
    SweetPotato,
    Treat,
    Toy,
    Flower,
    Heart,
}

/// Name used when a gift id is not recognised.
pub const GENERIC_GIFT_NAME: &str = "선물";

impl GiftKind {
    /// Looks up a gift by its wire id (`sweet-potato`, `treat`, ...).
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim() {
            "sweet-potato" => Some(GiftKind::SweetPotato),
            "treat" => Some(GiftKind::Treat),
            "toy" => Some(GiftKind::Toy),
            "flower" => Some(GiftKind::Flower),
            "heart" => Some(GiftKind::Heart),
            _ => None,
        }
    }

    pub fn korean_name(self) -> &'static str {
        match self {
            GiftKind::SweetPotato => "고구마",
            GiftKind::Treat => "개껌",
            GiftKind::Toy => "장난감",
            GiftKind::Flower => "꽃",
            GiftKind::Heart => "하트",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            GiftKind::SweetPotato => "🍠",
            GiftKind::Treat => "🦴",
            GiftKind::Toy => "🎾",
            GiftKind::Flower => "🌸",
            GiftKind::Heart => "💕",
        }
    }
}

/// Korean display name for a gift id, falling back to the generic name.
pub fn gift_name_for_id(id: &str) -> &'static str {
    GiftKind::from_id(id)
        .map(GiftKind::korean_name)
        .unwrap_or(GENERIC_GIFT_NAME)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftRecord {
    pub gift_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DreamEntry {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Storage for gifts and dream journal entries.
#[async_trait::async_trait]
pub trait KeepsakeRepository: Send + Sync {
    async fn record_gift(&self, user_id: &str, gift: &GiftRecord) -> Result<()>;

    /// Most recent gifts, newest first.
    async fn recent_gifts(&self, user_id: &str, limit: usize) -> Result<Vec<GiftRecord>>;

    async fn record_dream(&self, user_id: &str, dream: &DreamEntry) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn gift_ids_round_trip() {
        for kind in GiftKind::iter() {
            assert_eq!(GiftKind::from_id(&kind.to_string()), Some(kind));
        }
    }

    #[test]
    fn unknown_gift_uses_generic_name() {
        assert_eq!(gift_name_for_id("sweet-potato"), "고구마");
        assert_eq!(gift_name_for_id("rocket"), GENERIC_GIFT_NAME);
    }
}
