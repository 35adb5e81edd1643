//! Daily message allowance backed by a [`SubscriptionRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use rainbow_core::Result;
use rainbow_core::subscription::{
    DEFAULT_PREMIUM_DAYS, Plan, QuotaService, SubscriptionInfo, SubscriptionRepository,
    SubscriptionStatus,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Quota over stored subscription state.
///
/// Counts reset on the first access of a new local day. Lapsed premium is
/// treated as free. When storage is unreachable the user may still send.
pub struct SubscriptionQuota {
    repository: Arc<dyn SubscriptionRepository>,
    update_lock: Mutex<()>,
}

impl SubscriptionQuota {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self {
            repository,
            update_lock: Mutex::new(()),
        }
    }

    async fn load(&self, user_id: &str, now: DateTime<Utc>) -> Result<SubscriptionInfo> {
        let mut info = self.repository.get(user_id).await?.unwrap_or_default();
        if info.premium_lapsed(now) {
            tracing::info!(user_id, "Premium expired, downgrading to free");
            info.plan = Plan::Free;
            info.premium_expires_at = None;
            self.repository.save(user_id, &info).await?;
        }
        Ok(info)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[async_trait]
impl QuotaService for SubscriptionQuota {
    async fn status(&self, user_id: &str) -> SubscriptionStatus {
        match self.load(user_id, Utc::now()).await {
            Ok(info) => SubscriptionStatus::from_count(info.plan, info.count_for(today())),
            Err(err) => {
                tracing::warn!(user_id, error = %err, "Subscription lookup failed, allowing message");
                SubscriptionStatus {
                    can_send_message: true,
                    ..SubscriptionStatus::from_count(Plan::Free, 0)
                }
            }
        }
    }

    async fn record_sent(&self, user_id: &str) -> Result<u32> {
        let _guard = self.update_lock.lock().await;
        let mut info = self.load(user_id, Utc::now()).await?;
        let today = today();

        info.message_count = info.count_for(today) + 1;
        info.last_reset_date = Some(today);
        self.repository.save(user_id, &info).await?;

        tracing::debug!(user_id, count = info.message_count, "Recorded sent message");
        Ok(info.message_count)
    }

    async fn upgrade_to_premium(
        &self,
        user_id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let _guard = self.update_lock.lock().await;
        let mut info = self.repository.get(user_id).await?.unwrap_or_default();
        let expires_at =
            expires_at.unwrap_or_else(|| Utc::now() + Duration::days(DEFAULT_PREMIUM_DAYS));

        info.plan = Plan::Premium;
        info.premium_expires_at = Some(expires_at);
        self.repository.save(user_id, &info).await?;

        tracing::info!(user_id, %expires_at, "Upgraded to premium");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rainbow_core::subscription::FREE_MESSAGE_LIMIT;
    use rainbow_infrastructure::InMemorySubscriptionRepository;

    fn quota() -> (Arc<InMemorySubscriptionRepository>, SubscriptionQuota) {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        (repo.clone(), SubscriptionQuota::new(repo))
    }

    #[tokio::test]
    async fn free_plan_blocks_after_limit() {
        let (_, quota) = quota();
        for expected in 1..=FREE_MESSAGE_LIMIT {
            assert!(quota.can_send_message("user-1").await);
            assert_eq!(quota.record_sent("user-1").await.unwrap(), expected);
        }
        let status = quota.status("user-1").await;
        assert!(!status.can_send_message);
        assert_eq!(status.message_count, FREE_MESSAGE_LIMIT);
    }

    #[tokio::test]
    async fn stale_count_resets_on_new_day() {
        let (repo, quota) = quota();
        let yesterday = today() - Duration::days(1);
        repo.save(
            "user-1",
            &SubscriptionInfo {
                message_count: FREE_MESSAGE_LIMIT,
                last_reset_date: Some(yesterday),
                ..SubscriptionInfo::default()
            },
        )
        .await
        .unwrap();

        assert!(quota.can_send_message("user-1").await);
        assert_eq!(quota.record_sent("user-1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn premium_is_unlimited_until_it_lapses() {
        let (repo, quota) = quota();
        quota.upgrade_to_premium("user-1", None).await.unwrap();
        for _ in 0..(FREE_MESSAGE_LIMIT + 5) {
            quota.record_sent("user-1").await.unwrap();
        }
        let status = quota.status("user-1").await;
        assert!(status.is_premium());
        assert!(status.can_send_message);

        quota
            .upgrade_to_premium("user-1", Some(Utc::now() - Duration::days(1)))
            .await
            .unwrap();
        let status = quota.status("user-1").await;
        assert!(!status.is_premium());
        assert!(!status.can_send_message);
        assert_eq!(repo.get("user-1").await.unwrap().unwrap().plan, Plan::Free);
    }

    #[tokio::test]
    async fn storage_failure_fails_open() {
        let (repo, quota) = quota();
        repo.set_offline(true);
        assert!(quota.can_send_message("user-1").await);
        assert!(quota.record_sent("user-1").await.is_err());
    }
}
