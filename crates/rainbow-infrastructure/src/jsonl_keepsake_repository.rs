//! JSON Lines KeepsakeRepository: `gifts.jsonl` and `dreams.jsonl` per user.

use crate::paths::UserDataLayout;
use crate::storage::JsonlFile;
use async_trait::async_trait;
use rainbow_core::Result;
use rainbow_core::keepsake::{DreamEntry, GiftRecord, KeepsakeRepository};
use tokio::sync::Mutex;

pub struct JsonlKeepsakeRepository {
    layout: UserDataLayout,
    write_lock: Mutex<()>,
}

impl JsonlKeepsakeRepository {
    pub fn new(layout: UserDataLayout) -> Self {
        Self {
            layout,
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl KeepsakeRepository for JsonlKeepsakeRepository {
    async fn record_gift(&self, user_id: &str, gift: &GiftRecord) -> Result<()> {
        let file = JsonlFile::new(self.layout.gifts_file(user_id)?);
        let _guard = self.write_lock.lock().await;
        file.append(gift).await
    }

    async fn recent_gifts(&self, user_id: &str, limit: usize) -> Result<Vec<GiftRecord>> {
        let file = JsonlFile::<GiftRecord>::new(self.layout.gifts_file(user_id)?);
        let mut gifts = file.read_tail(limit).await?;
        gifts.reverse();
        Ok(gifts)
    }

    async fn record_dream(&self, user_id: &str, dream: &DreamEntry) -> Result<()> {
        let file = JsonlFile::new(self.layout.dreams_file(user_id)?);
        let _guard = self.write_lock.lock().await;
        file.append(dream).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn recent_gifts_are_newest_first() {
        let dir = TempDir::new().unwrap();
        let repo = JsonlKeepsakeRepository::new(UserDataLayout::new(dir.path()));

        for id in ["sweet-potato", "toy", "flower"] {
            let gift = GiftRecord {
                gift_id: id.into(),
                response: None,
                timestamp: Utc::now(),
            };
            repo.record_gift("user-1", &gift).await.unwrap();
        }

        let gifts = repo.recent_gifts("user-1", 2).await.unwrap();
        let ids: Vec<_> = gifts.iter().map(|g| g.gift_id.as_str()).collect();
        assert_eq!(ids, vec!["flower", "toy"]);
    }

    #[tokio::test]
    async fn dreams_go_to_their_own_file() {
        let dir = TempDir::new().unwrap();
        let layout = UserDataLayout::new(dir.path());
        let repo = JsonlKeepsakeRepository::new(layout.clone());

        let dream = DreamEntry {
            text: "보리가 꿈에 나왔어".into(),
            response: Some("나 보러 와줘서 고마워!".into()),
            timestamp: Utc::now(),
        };
        repo.record_dream("user-1", &dream).await.unwrap();

        let stored = JsonlFile::<DreamEntry>::new(layout.dreams_file("user-1").unwrap())
            .read_all()
            .await
            .unwrap();
        assert_eq!(stored, vec![dream]);
        assert!(repo.recent_gifts("user-1", 5).await.unwrap().is_empty());
    }
}
