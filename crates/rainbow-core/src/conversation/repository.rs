//! Conversation log repository trait.

use chrono::{DateTime, Utc};

use super::message::ConversationMessage;
use crate::error::Result;

/// Per-user, append-only conversation log.
#[async_trait::async_trait]
pub trait MessageRepository: Send + Sync {
    /// Appends a message to the end of the user's log.
    async fn append(&self, user_id: &str, message: &ConversationMessage) -> Result<()>;

    /// Returns the last `limit` messages in chronological order.
    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationMessage>>;

    /// Returns every message stamped at or after `since`, oldest first.
    async fn since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ConversationMessage>>;
}
