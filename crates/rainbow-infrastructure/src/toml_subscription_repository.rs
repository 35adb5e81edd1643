//! TOML-backed SubscriptionRepository.

use crate::paths::UserDataLayout;
use crate::storage::AtomicTomlFile;
use async_trait::async_trait;
use rainbow_core::Result;
use rainbow_core::subscription::{SubscriptionInfo, SubscriptionRepository};

pub struct TomlSubscriptionRepository {
    layout: UserDataLayout,
}

impl TomlSubscriptionRepository {
    pub fn new(layout: UserDataLayout) -> Self {
        Self { layout }
    }

    fn file(&self, user_id: &str) -> Result<AtomicTomlFile<SubscriptionInfo>> {
        Ok(AtomicTomlFile::new(self.layout.subscription_file(user_id)?))
    }
}

#[async_trait]
impl SubscriptionRepository for TomlSubscriptionRepository {
    async fn get(&self, user_id: &str) -> Result<Option<SubscriptionInfo>> {
        Ok(self.file(user_id)?.load()?)
    }

    async fn save(&self, user_id: &str, info: &SubscriptionInfo) -> Result<()> {
        Ok(self.file(user_id)?.save(info)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rainbow_core::subscription::Plan;
    use tempfile::TempDir;

    #[tokio::test]
    async fn round_trips_counts() {
        let dir = TempDir::new().unwrap();
        let repo = TomlSubscriptionRepository::new(UserDataLayout::new(dir.path()));
        assert!(repo.get("user-1").await.unwrap().is_none());

        let info = SubscriptionInfo {
            plan: Plan::Free,
            premium_expires_at: None,
            message_count: 4,
            last_reset_date: NaiveDate::from_ymd_opt(2025, 1, 2),
        };
        repo.save("user-1", &info).await.unwrap();
        assert_eq!(repo.get("user-1").await.unwrap(), Some(info));
    }
}
