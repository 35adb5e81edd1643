use super::CompanionGenerator;
use crate::config::ChatConfig;
use chrono::{DateTime, Duration, Local, Utc};
use rainbow_core::Result;
use rainbow_core::conversation::MessageRepository;
use rainbow_core::persona::PetPersona;
use rainbow_core::prompt::letter_prompt;
use rainbow_core::response::{ResponseExtra, select_canned_response};
use rainbow_core::template::Situation;
use rainbow_interaction::TextGenerator;
use std::sync::Arc;

/// The daily "rainbow letter" the pet writes about today's conversation.
pub struct LetterService {
    generator: CompanionGenerator,
    messages: Arc<dyn MessageRepository>,
}

impl LetterService {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        messages: Arc<dyn MessageRepository>,
        config: ChatConfig,
    ) -> Self {
        Self {
            generator: CompanionGenerator::new(generator, config),
            messages,
        }
    }

    /// Letter over messages since local midnight. An unreadable log is
    /// treated as a quiet day.
    pub async fn write_today_letter(&self, user_id: &str, persona: &PetPersona) -> Result<String> {
        let today = match self.messages.since(user_id, local_midnight()).await {
            Ok(today) => today,
            Err(err) => {
                tracing::warn!(user_id, error = %err, "Could not read today's messages for letter");
                Vec::new()
            }
        };

        let budget = self.generator.config().budgets.letter;
        let request = self
            .generator
            .in_character(persona, letter_prompt(persona, &today), budget);

        let letter = match self.generator.try_generate("letter", request).await {
            Some(text) => text,
            None => select_canned_response(persona, Situation::LetterFallback, ResponseExtra::default()),
        };
        tracing::info!(user_id, messages = today.len(), "Letter written");
        Ok(letter)
    }
}

fn local_midnight() -> DateTime<Utc> {
    Local::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        .map(|midnight| midnight.with_timezone(&Utc))
        .unwrap_or_else(|| Utc::now() - Duration::hours(24))
}
