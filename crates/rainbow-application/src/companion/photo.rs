use super::CompanionGenerator;
use crate::config::ChatConfig;
use rainbow_core::prompt::PHOTO_ANALYSIS_PROMPT;
use rainbow_interaction::{ChatTurn, GenerationRequest, TextGenerator, TurnRole};
use std::sync::Arc;

/// Plain description of a photo, used to enrich stored memories.
pub struct PhotoAnalysisService {
    generator: CompanionGenerator,
}

impl PhotoAnalysisService {
    pub fn new(generator: Arc<dyn TextGenerator>, config: ChatConfig) -> Self {
        Self {
            generator: CompanionGenerator::new(generator, config),
        }
    }

    /// `None` when the photo is blank or could not be described.
    pub async fn analyze(&self, photo_reference: &str) -> Option<String> {
        let photo_reference = photo_reference.trim();
        if photo_reference.is_empty() {
            return None;
        }

        let budget = self.generator.config().budgets.photo_analysis;
        let request = GenerationRequest::new(
            String::new(),
            vec![ChatTurn::with_image(
                TurnRole::User,
                PHOTO_ANALYSIS_PROMPT,
                photo_reference,
            )],
        )
        .with_options(self.generator.options(budget));

        self.generator.try_generate("photo_analysis", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rainbow_interaction::ScriptedGenerator;

    #[tokio::test]
    async fn sends_image_with_analysis_budget() {
        let generator = Arc::new(ScriptedGenerator::always("잔디밭에서 웃고 있는 진돗개"));
        let service = PhotoAnalysisService::new(generator.clone(), ChatConfig::default());

        let description = service.analyze("https://example.com/bori.jpg").await;
        assert_eq!(description.as_deref(), Some("잔디밭에서 웃고 있는 진돗개"));

        let calls = generator.calls().await;
        assert!(calls[0].system_prompt.is_empty());
        assert!(calls[0].last_turn().unwrap().has_image());
        assert_eq!(calls[0].options.max_tokens, 300);
    }

    #[tokio::test]
    async fn failure_or_blank_gives_none() {
        let generator = Arc::new(ScriptedGenerator::failing());
        let service = PhotoAnalysisService::new(generator.clone(), ChatConfig::default());

        assert!(service.analyze("https://example.com/bori.jpg").await.is_none());
        assert!(service.analyze("  ").await.is_none());
        assert_eq!(generator.call_count().await, 1);
    }
}
