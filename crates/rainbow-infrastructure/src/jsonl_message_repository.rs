//! JSON Lines MessageRepository: `messages.jsonl` per user, append-only.

use crate::paths::UserDataLayout;
use crate::storage::JsonlFile;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rainbow_core::Result;
use rainbow_core::conversation::{ConversationMessage, MessageRepository};
use tokio::sync::Mutex;

pub struct JsonlMessageRepository {
    layout: UserDataLayout,
    write_lock: Mutex<()>,
}

impl JsonlMessageRepository {
    pub fn new(layout: UserDataLayout) -> Self {
        Self {
            layout,
            write_lock: Mutex::new(()),
        }
    }

    fn file(&self, user_id: &str) -> Result<JsonlFile<ConversationMessage>> {
        Ok(JsonlFile::new(self.layout.messages_file(user_id)?))
    }
}

#[async_trait]
impl MessageRepository for JsonlMessageRepository {
    async fn append(&self, user_id: &str, message: &ConversationMessage) -> Result<()> {
        let file = self.file(user_id)?;
        let _guard = self.write_lock.lock().await;
        file.append(message).await
    }

    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationMessage>> {
        self.file(user_id)?.read_tail(limit).await
    }

    async fn since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ConversationMessage>> {
        let messages = self.file(user_id)?.read_all().await?;
        Ok(messages
            .into_iter()
            .filter(|message| message.timestamp >= since)
            .collect())
    }
}
