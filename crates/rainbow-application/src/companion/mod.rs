//! One-shot companion features: gifts, dream journal, the daily letter,
//! weather greetings and photo descriptions.
//!
//! Each makes at most one generation call and falls back to canned text.

mod dream;
mod gift;
mod letter;
mod photo;
mod weather;

pub use dream::{DreamReply, DreamService};
pub use gift::{GiftReply, GiftService};
pub use letter::LetterService;
pub use photo::PhotoAnalysisService;
pub use weather::{RandomWeather, WeatherMessage, WeatherService, WeatherSource};

use rainbow_core::persona::PetPersona;
use rainbow_core::prompt::build_system_prompt;
use rainbow_interaction::{
    ChatTurn, GenerationError, GenerationOptions, GenerationRequest, TextGenerator, TurnRole,
};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ChatConfig;

/// Generator handle shared by the companion services.
#[derive(Clone)]
pub(crate) struct CompanionGenerator {
    generator: Arc<dyn TextGenerator>,
    config: ChatConfig,
}

impl CompanionGenerator {
    pub(crate) fn new(generator: Arc<dyn TextGenerator>, config: ChatConfig) -> Self {
        Self { generator, config }
    }

    pub(crate) fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// In-character request: persona system prompt plus one user instruction.
    pub(crate) fn in_character(
        &self,
        persona: &PetPersona,
        instruction: String,
        max_tokens: u32,
    ) -> GenerationRequest {
        GenerationRequest::new(
            build_system_prompt(persona),
            vec![ChatTurn::text(TurnRole::User, instruction)],
        )
        .with_options(self.options(max_tokens))
    }

    pub(crate) fn options(&self, max_tokens: u32) -> GenerationOptions {
        self.config.options(max_tokens)
    }

    /// Generated text, or `None` after logging why there is none.
    pub(crate) async fn try_generate(
        &self,
        feature: &'static str,
        request: GenerationRequest,
    ) -> Option<String> {
        match self.generate(request).await {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(
                    feature,
                    backend = self.generator.name(),
                    error = %err,
                    "Companion generation failed"
                );
                None
            }
        }
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let timeout: Duration = self.config.generation_timeout;
        let text = tokio::time::timeout(timeout, self.generator.generate(request))
            .await
            .map_err(|_| GenerationError::Timeout(timeout))??;
        let text = text.trim();
        if text.is_empty() {
            Err(GenerationError::EmptyResponse)
        } else {
            Ok(text.to_string())
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use rainbow_core::persona::{Archetype, PetPersona};

    pub(crate) fn bori() -> PetPersona {
        let mut persona = PetPersona::new(
            "Bori",
            "누나",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            Archetype::Sweet,
        );
        persona.favorite_treat = "고구마".into();
        persona
    }
}
