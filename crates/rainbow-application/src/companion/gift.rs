use super::CompanionGenerator;
use crate::config::ChatConfig;
use chrono::Utc;
use rainbow_core::Result;
use rainbow_core::keepsake::{GiftKind, GiftRecord, KeepsakeRepository, gift_name_for_id};
use rainbow_core::persona::PetPersona;
use rainbow_core::prompt::gift_prompt;
use rainbow_core::response::{ResponseExtra, select_canned_response};
use rainbow_core::template::Situation;
use rainbow_interaction::TextGenerator;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftReply {
    pub gift_name: String,
    pub emoji: Option<&'static str>,
    pub text: String,
    pub generated: bool,
}

/// Virtual gifts sent to the pet.
pub struct GiftService {
    generator: CompanionGenerator,
    keepsakes: Arc<dyn KeepsakeRepository>,
}

impl GiftService {
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

    /// Unknown ids are accepted under the generic gift name.
    pub async fn send_gift(
        &self,
        user_id: &str,
        persona: &PetPersona,
        gift_id: &str,
    ) -> Result<GiftReply> {
        let gift_name = gift_name_for_id(gift_id);
        let budget = self.generator.config().budgets.gift;
        let request = self
            .generator
            .in_character(persona, gift_prompt(persona, gift_name), budget);

        let (text, generated) = match self.generator.try_generate("gift", request).await {
            Some(text) => (text, true),
            None => (
                select_canned_response(persona, Situation::GiftAck, ResponseExtra::gift(gift_name)),
                false,
            ),
        };

        let record = GiftRecord {
            gift_id: gift_id.to_string(),
            response: Some(text.clone()),
            timestamp: Utc::now(),
        };
        self.keepsakes.record_gift(user_id, &record).await?;
        tracing::info!(user_id, gift_id, generated, "Gift delivered");

        Ok(GiftReply {
            gift_name: gift_name.to_string(),
            emoji: GiftKind::from_id(gift_id).map(GiftKind::emoji),
            text,
            generated,
        })
    }

    pub async fn recent_gifts(&self, user_id: &str, limit: usize) -> Result<Vec<GiftRecord>> {
        self.keepsakes.recent_gifts(user_id, limit).await
    }
}
