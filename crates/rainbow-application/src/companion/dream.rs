use super::CompanionGenerator;
use crate::config::ChatConfig;
use chrono::Utc;
use rainbow_core::keepsake::{DreamEntry, KeepsakeRepository};
use rainbow_core::persona::PetPersona;
use rainbow_core::prompt::dream_prompt;
use rainbow_core::response::{ResponseExtra, select_canned_response};
use rainbow_core::template::Situation;
use rainbow_core::{RainbowError, Result};
use rainbow_interaction::TextGenerator;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DreamReply {
    pub text: String,
    pub generated: bool,
}

/// Dream journal: the user tells a dream, the pet answers.
pub struct DreamService {
    generator: CompanionGenerator,
    keepsakes: Arc<dyn KeepsakeRepository>,
}

impl DreamService {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        keepsakes: Arc<dyn KeepsakeRepository>,
        config: ChatConfig,
    ) -> Self {
        Self {
            generator: CompanionGenerator::new(generator, config),
            keepsakes,
        }
    }

    pub async fn share_dream(
        &self,
        user_id: &str,
        persona: &PetPersona,
        dream_text: &str,
    ) -> Result<DreamReply> {
        let dream_text = dream_text.trim();
        if dream_text.is_empty() {
            return Err(RainbowError::validation("dream text is empty"));
        }

        let budget = self.generator.config().budgets.dream;
        let request = self
            .generator
            .in_character(persona, dream_prompt(persona, dream_text), budget);

        let (text, generated) = match self.generator.try_generate("dream", request).await {
            Some(text) => (text, true),
            None => (
                select_canned_response(persona, Situation::DreamAck, ResponseExtra::default()),
                false,
            ),
        };

        let entry = DreamEntry {
            text: dream_text.to_string(),
            response: Some(text.clone()),
            timestamp: Utc::now(),
        };
        self.keepsakes.record_dream(user_id, &entry).await?;

        Ok(DreamReply { text, generated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companion::test_support::bori;
    use rainbow_infrastructure::InMemoryKeepsakeRepository;
    use rainbow_interaction::ScriptedGenerator;

    #[tokio::test]
    async fn blank_dream_is_rejected_without_calls() {
        let generator = Arc::new(ScriptedGenerator::always("꿈!"));
        let service = DreamService::new(
            generator.clone(),
            Arc::new(InMemoryKeepsakeRepository::new()),
            ChatConfig::default(),
        );

        let err = service.share_dream("user-1", &bori(), "   ").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(generator.call_count().await, 0);
    }

    #[tokio::test]
    async fn dream_and_reply_are_stored() {
        let keepsakes = Arc::new(InMemoryKeepsakeRepository::new());
        let service = DreamService::new(
            Arc::new(ScriptedGenerator::always("나도 그 꿈에 나왔어!")),
            keepsakes.clone(),
            ChatConfig::default(),
        );

        let reply = service
            .share_dream("user-1", &bori(), " 보리랑 바다에 갔어 ")
            .await
            .unwrap();
        assert!(reply.generated);

        let dreams = keepsakes.dreams("user-1").await;
        assert_eq!(dreams.len(), 1);
        assert_eq!(dreams[0].text, "보리랑 바다에 갔어");
        assert_eq!(dreams[0].response.as_deref(), Some("나도 그 꿈에 나왔어!"));
    }

    #[tokio::test]
    async fn failure_uses_canned_acknowledgement() {
        let service = DreamService::new(
            Arc::new(ScriptedGenerator::failing()),
            Arc::new(InMemoryKeepsakeRepository::new()),
            ChatConfig::default(),
        );
        let reply = service.share_dream("user-1", &bori(), "꿈에서 만났어").await.unwrap();
        assert!(!reply.generated);
        assert!(!reply.text.is_empty());
    }
}
