//! In-memory repositories.
//!
//! Each one can be switched offline, after which every call fails with a
//! data-access error. That is how tests (and the CLI's dry runs) exercise the
//! host's cache fallback and offline write queue.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rainbow_core::conversation::{ConversationMessage, MessageRepository};
use rainbow_core::keepsake::{DreamEntry, GiftRecord, KeepsakeRepository};
use rainbow_core::persona::{PersonaRepository, PetPersona};
use rainbow_core::subscription::{SubscriptionInfo, SubscriptionRepository};
use rainbow_core::{RainbowError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct Availability(AtomicBool);

impl Availability {
    fn set_offline(&self, offline: bool) {
        self.0.store(offline, Ordering::SeqCst);
    }

    fn check(&self, store: &str) -> Result<()> {
        if self.0.load(Ordering::SeqCst) {
            Err(RainbowError::data_access(format!("{store} store is offline")))
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
pub struct InMemoryPersonaRepository {
    personas: RwLock<HashMap<String, PetPersona>>,
    availability: Availability,
}

impl InMemoryPersonaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.availability.set_offline(offline);
    }
}

#[async_trait]
impl PersonaRepository for InMemoryPersonaRepository {
    async fn get(&self, user_id: &str) -> Result<Option<PetPersona>> {
        self.availability.check("persona")?;
        Ok(self.personas.read().await.get(user_id).cloned())
    }

    async fn save(&self, user_id: &str, persona: &PetPersona) -> Result<()> {
        self.availability.check("persona")?;
        self.personas
            .write()
            .await
            .insert(user_id.to_string(), persona.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryMessageRepository {
    logs: RwLock<HashMap<String, Vec<ConversationMessage>>>,
    availability: Availability,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.availability.set_offline(offline);
    }

    /// Full log regardless of availability; for assertions.
    pub async fn snapshot(&self, user_id: &str) -> Vec<ConversationMessage> {
        self.logs
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(&self, user_id: &str, message: &ConversationMessage) -> Result<()> {
        self.availability.check("message")?;
        self.logs
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationMessage>> {
        self.availability.check("message")?;
        let logs = self.logs.read().await;
        let log = logs.get(user_id).map(Vec::as_slice).unwrap_or_default();
        Ok(log[log.len().saturating_sub(limit)..].to_vec())
    }

    async fn since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ConversationMessage>> {
        self.availability.check("message")?;
        let logs = self.logs.read().await;
        Ok(logs
            .get(user_id)
            .map(|log| {
                log.iter()
                    .filter(|message| message.timestamp >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: RwLock<HashMap<String, SubscriptionInfo>>,
    availability: Availability,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.availability.set_offline(offline);
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn get(&self, user_id: &str) -> Result<Option<SubscriptionInfo>> {
        self.availability.check("subscription")?;
        Ok(self.subscriptions.read().await.get(user_id).cloned())
    }

    async fn save(&self, user_id: &str, info: &SubscriptionInfo) -> Result<()> {
        self.availability.check("subscription")?;
        self.subscriptions
            .write()
            .await
            .insert(user_id.to_string(), info.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryKeepsakeRepository {
    gifts: RwLock<HashMap<String, Vec<GiftRecord>>>,
    dreams: RwLock<HashMap<String, Vec<DreamEntry>>>,
    availability: Availability,
}

impl InMemoryKeepsakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.availability.set_offline(offline);
    }

    pub async fn dreams(&self, user_id: &str) -> Vec<DreamEntry> {
        self.dreams
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl KeepsakeRepository for InMemoryKeepsakeRepository {
    async fn record_gift(&self, user_id: &str, gift: &GiftRecord) -> Result<()> {
        self.availability.check("keepsake")?;
        self.gifts
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(gift.clone());
        Ok(())
    }

    async fn recent_gifts(&self, user_id: &str, limit: usize) -> Result<Vec<GiftRecord>> {
        self.availability.check("keepsake")?;
        let gifts = self.gifts.read().await;
        Ok(gifts
            .get(user_id)
            .map(|log| log.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn record_dream(&self, user_id: &str, dream: &DreamEntry) -> Result<()> {
        self.availability.check("keepsake")?;
        self.dreams
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(dream.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offline_store_fails_then_recovers() {
        let repo = InMemoryMessageRepository::new();
        let message = ConversationMessage::from_user("보리야", None).unwrap();

        repo.set_offline(true);
        let err = repo.append("user-1", &message).await.unwrap_err();
        assert!(matches!(err, RainbowError::DataAccess(_)));

        repo.set_offline(false);
        repo.append("user-1", &message).await.unwrap();
        assert_eq!(repo.recent("user-1", 10).await.unwrap(), vec![message]);
    }

    #[tokio::test]
    async fn recent_is_bounded_tail() {
        let repo = InMemoryMessageRepository::new();
        for i in 0..12 {
            let message = ConversationMessage::from_user(format!("{i}"), None).unwrap();
            repo.append("user-1", &message).await.unwrap();
        }
        let recent = repo.recent("user-1", 10).await.unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].text, "2");
        assert_eq!(recent[9].text, "11");
    }

    #[tokio::test]
    async fn unknown_user_has_nothing() {
        let personas = InMemoryPersonaRepository::new();
        assert!(personas.get("nobody").await.unwrap().is_none());

        let subscriptions = InMemorySubscriptionRepository::new();
        assert!(subscriptions.get("nobody").await.unwrap().is_none());

        let keepsakes = InMemoryKeepsakeRepository::new();
        assert!(keepsakes.recent_gifts("nobody", 3).await.unwrap().is_empty());
    }
}
