//! Subscription plans and daily message allowance.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Messages per day on the free plan.
pub const FREE_MESSAGE_LIMIT: u32 = 10;

/// Default length of a premium upgrade.
pub const DEFAULT_PREMIUM_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Free,
    Premium,
}

impl Plan {
    /// Daily allowance; `None` means unlimited.
    pub fn message_limit(self) -> Option<u32> {
        match self {
            Plan::Free => Some(FREE_MESSAGE_LIMIT),
            Plan::Premium => None,
        }
    }
}

/// Stored subscription state of a user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    #[serde(default)]
    pub plan: Plan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium_expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reset_date: Option<NaiveDate>,
}

impl SubscriptionInfo {
    /// Today's count, treating a stale reset date as zero.
    pub fn count_for(&self, today: NaiveDate) -> u32 {
        if self.last_reset_date == Some(today) {
            self.message_count
        } else {
            0
        }
    }

    /// Premium whose expiry has passed. Premium without expiry never lapses.
    pub fn premium_lapsed(&self, now: DateTime<Utc>) -> bool {
        self.plan == Plan::Premium && self.premium_expires_at.is_some_and(|at| now > at)
    }
}

/// Snapshot handed to the host for display and gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    pub plan: Plan,
    pub message_count: u32,
    pub message_limit: Option<u32>,
    pub can_send_message: bool,
}

impl SubscriptionStatus {
    pub fn from_count(plan: Plan, message_count: u32) -> Self {
        let message_limit = plan.message_limit();
        Self {
            plan,
            message_count,
            message_limit,
            can_send_message: message_limit.is_none_or(|limit| message_count < limit),
        }
    }

    pub fn is_premium(&self) -> bool {
        self.plan == Plan::Premium
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn free_plan_stops_at_limit() {
        assert!(SubscriptionStatus::from_count(Plan::Free, 9).can_send_message);
        assert!(!SubscriptionStatus::from_count(Plan::Free, 10).can_send_message);
        assert!(SubscriptionStatus::from_count(Plan::Premium, 10_000).can_send_message);
    }

    #[test]
    fn stale_counter_reads_as_zero() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
        let info = SubscriptionInfo {
            message_count: 7,
            last_reset_date: today.pred_opt(),
            ..Default::default()
        };
        assert_eq!(info.count_for(today), 0);
        assert_eq!(info.count_for(today.pred_opt().unwrap()), 7);
    }

    #[test]
    fn premium_lapses_only_after_expiry() {
        let now = Utc::now();
        let mut info = SubscriptionInfo {
            plan: Plan::Premium,
            premium_expires_at: Some(now + Duration::days(1)),
            ..Default::default()
        };
        assert!(!info.premium_lapsed(now));
        info.premium_expires_at = Some(now - Duration::days(1));
        assert!(info.premium_lapsed(now));
        info.premium_expires_at = None;
        assert!(!info.premium_lapsed(now));
    }
}
