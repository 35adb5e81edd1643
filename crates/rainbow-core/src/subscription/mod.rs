//! Subscription domain: plans, stored state, and the quota seam the host
//! consults before starting a conversation turn.

mod model;

pub use model::{
    DEFAULT_PREMIUM_DAYS, FREE_MESSAGE_LIMIT, Plan, SubscriptionInfo, SubscriptionStatus,
};

use chrono::{DateTime, Utc};

use crate::error::Result;

/// Persistence for per-user subscription state.
#[async_trait::async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<SubscriptionInfo>>;

    async fn save(&self, user_id: &str, info: &SubscriptionInfo) -> Result<()>;
}

/// Daily message allowance.
///
/// The conversation orchestrator never calls this; the host does, before and
/// after a turn.
#[async_trait::async_trait]
pub trait QuotaService: Send + Sync {
    async fn status(&self, user_id: &str) -> SubscriptionStatus;

    async fn can_send_message(&self, user_id: &str) -> bool {
        self.status(user_id).await.can_send_message
    }

    /// Counts one sent message and returns today's new total.
    async fn record_sent(&self, user_id: &str) -> Result<u32>;

    async fn upgrade_to_premium(
        &self,
        user_id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()>;
}
