//! Choosing a generation backend.

use crate::claude_api_agent::ClaudeApiAgent;
use crate::error::GenerationError;
use crate::generator::TextGenerator;
use crate::openai_api_agent::OpenAiApiAgent;
use crate::scripted::ScriptedGenerator;
use std::sync::Arc;
use strum::{Display, EnumString};

/// Reply used by the offline backend.
pub const OFFLINE_REPLY: &str = "나 여기 있어! 오늘도 네 얘기 들려줘서 고마워.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Provider {
    #[default]
    #[strum(serialize = "openai")]
    OpenAi,
    Claude,
    /// No network; a fixed reply for every request.
    Offline,
}

impl Provider {
    pub fn build(self) -> Result<Arc<dyn TextGenerator>, GenerationError> {
        let generator: Arc<dyn TextGenerator> = match self {
            Self::OpenAi => Arc::new(OpenAiApiAgent::try_from_env()?),
            Self::Claude => Arc::new(ClaudeApiAgent::try_from_env()?),
            Self::Offline => Arc::new(ScriptedGenerator::always(OFFLINE_REPLY)),
        };
        tracing::info!(provider = %self, backend = generator.name(), "Text generator ready");
        Ok(generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_names() {
        assert_eq!(Provider::from_str("openai").unwrap(), Provider::OpenAi);
        assert_eq!(Provider::from_str("Claude").unwrap(), Provider::Claude);
        assert_eq!(Provider::from_str("offline").unwrap(), Provider::Offline);
        assert!(Provider::from_str("gemini").is_err());
        assert_eq!(Provider::OpenAi.to_string(), "openai");
    }

    #[tokio::test]
    async fn offline_backend_needs_no_credentials() {
        let generator = Provider::Offline.build().unwrap();
        let reply = generator
            .generate(crate::generator::GenerationRequest::single("안녕"))
            .await
            .unwrap();
        assert_eq!(reply, OFFLINE_REPLY);
    }
}
