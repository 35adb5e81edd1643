//! ClaudeApiAgent - Messages API client, an alternative backend for pet replies.
//!
//! Configuration priority: ~/.config/rainbow/secret.json > environment variables

use crate::error::GenerationError;
use crate::generator::{ContentBlock, GenerationRequest, TextGenerator, TurnRole};
use crate::http::{map_http_error, map_request_error};
use crate::image::{ImageSource, resolve_image};
use async_trait::async_trait;
use rainbow_infrastructure::storage::SecretStorage;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-haiku-latest";
const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Generator backed by the Claude HTTP API.
///
/// The Messages API has no presence/frequency penalties; those options are
/// ignored here.
#[derive(Clone)]
pub struct ClaudeApiAgent {
    client: Client,
    api_key: String,
    model: String,
}

impl ClaudeApiAgent {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Loads credentials from ~/.config/rainbow/secret.json, then from
    /// `ANTHROPIC_API_KEY` / `CLAUDE_MODEL_NAME`.
    pub fn try_from_env() -> Result<Self, GenerationError> {
        if let Some(claude) = SecretStorage::new()
            .ok()
            .and_then(|storage| storage.load().ok())
            .and_then(|config| config.claude)
        {
            let model = claude
                .model_name
                .unwrap_or_else(|| DEFAULT_CLAUDE_MODEL.into());
            return Ok(Self::new(claude.api_key, model));
        }

        let api_key = env::var("ANTHROPIC_API_KEY").map_err(|_| {
            GenerationError::MissingCredentials(
                "ANTHROPIC_API_KEY not found in ~/.config/rainbow/secret.json or environment variables"
                    .into(),
            )
        })?;
        let model = env::var("CLAUDE_MODEL_NAME").unwrap_or_else(|_| DEFAULT_CLAUDE_MODEL.into());
        Ok(Self::new(api_key, model))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Claude requires the first message to come from the user and roles to
    /// alternate; leading pet turns are dropped and same-role runs merged.
    async fn build_messages(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<Message>, GenerationError> {
        let mut messages: Vec<Message> = Vec::new();
        let turns = request
            .turns
            .iter()
            .skip_while(|turn| turn.role == TurnRole::Assistant);

        for turn in turns {
            let mut blocks = Vec::with_capacity(turn.content.len());
            for block in &turn.content {
                blocks.push(Self::block_to_content(block).await?);
            }

            match messages.last_mut() {
                Some(last) if last.role == turn.role.as_str() => last.content.extend(blocks),
                _ => messages.push(Message {
                    role: turn.role.as_str(),
                    content: blocks,
                }),
            }
        }

        if messages.is_empty() {
            return Err(GenerationError::InvalidPayload(
                "Claude request must include at least one user turn".into(),
            ));
        }
        Ok(messages)
    }

    async fn block_to_content(block: &ContentBlock) -> Result<ClaudeContent, GenerationError> {
        Ok(match block {
            ContentBlock::Text(text) => ClaudeContent::Text { text: text.clone() },
            ContentBlock::Image(reference) => {
                let source = match resolve_image(reference).await? {
                    ImageSource::Url(url) => ClaudeImageSource::Url { url },
                    ImageSource::Inline { media_type, data } => {
                        ClaudeImageSource::Base64 { media_type, data }
                    }
                };
                ClaudeContent::Image { source }
            }
        })
    }

    async fn send_request(&self, body: &CreateMessageRequest) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(BASE_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| map_request_error("Claude", err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Claude error body".to_string());
            return Err(map_http_error(status, body_text, |body| {
                serde_json::from_str::<ErrorResponse>(body)
                    .ok()
                    .map(|wrapper| wrapper.error.message)
            }));
        }

        let parsed: CreateMessageResponse = response.json().await.map_err(|err| {
            GenerationError::InvalidPayload(format!("Failed to parse Claude response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl TextGenerator for ClaudeApiAgent {
    fn name(&self) -> &str {
        "claude"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let messages = self.build_messages(&request).await?;
        let system = Some(request.system_prompt.clone()).filter(|s| !s.trim().is_empty());
        let body = CreateMessageRequest {
            model: self.model.clone(),
            system,
            messages,
            max_tokens: request.options.max_tokens,
            temperature: request.options.temperature.min(1.0),
        };

        tracing::debug!(model = %self.model, turns = request.turns.len(), "Sending Claude request");
        self.send_request(&body).await
    }
}

#[derive(Serialize)]
struct CreateMessageRequest {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ClaudeContent>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClaudeContent {
    Text { text: String },
    Image { source: ClaudeImageSource },
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClaudeImageSource {
    Url { url: String },
    Base64 { media_type: String, data: String },
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlockResponse>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlockResponse {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: CreateMessageResponse) -> Result<String, GenerationError> {
    let text = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlockResponse::Text { text } => Some(text),
            ContentBlockResponse::Other => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    let text = text.trim();
    if text.is_empty() {
        Err(GenerationError::EmptyResponse)
    } else {
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ChatTurn;

    #[tokio::test]
    async fn leading_pet_turns_are_dropped_and_runs_merged() {
        let agent = ClaudeApiAgent::new("key", DEFAULT_CLAUDE_MODEL);
        let request = GenerationRequest::new(
            "너는 보리야",
            vec![
                ChatTurn::text(TurnRole::Assistant, "누나 왔어?"),
                ChatTurn::text(TurnRole::User, "보리야"),
                ChatTurn::text(TurnRole::User, "보고 싶어"),
                ChatTurn::text(TurnRole::Assistant, "나도!"),
            ],
        );

        let messages = agent.build_messages(&request).await.unwrap();
        let json = serde_json::to_value(&messages).unwrap();

        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0]["role"], "user");
        assert_eq!(json[0]["content"].as_array().unwrap().len(), 2);
        assert_eq!(json[1]["role"], "assistant");
    }

    #[tokio::test]
    async fn inline_images_use_base64_source() {
        let agent = ClaudeApiAgent::new("key", DEFAULT_CLAUDE_MODEL);
        let request = GenerationRequest::new(
            "",
            vec![ChatTurn::with_image(
                TurnRole::User,
                "기억나?",
                "data:image/png;base64,AAAA",
            )],
        );

        let messages = agent.build_messages(&request).await.unwrap();
        let json = serde_json::to_value(&messages).unwrap();
        let image = &json[0]["content"][1];
        assert_eq!(image["type"], "image");
        assert_eq!(image["source"]["type"], "base64");
        assert_eq!(image["source"]["media_type"], "image/png");
    }

    #[test]
    fn non_text_blocks_are_ignored() {
        let response: CreateMessageResponse = serde_json::from_str(
            r#"{"content":[{"type":"thinking","thinking":"..."},{"type":"text","text":"안녕!"}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text_response(response).unwrap(), "안녕!");
    }
}
