//! OpenAiApiAgent - Chat Completions client used for pet replies.
//!
//! Configuration priority: ~/.config/rainbow/secret.json > environment variables

use crate::error::GenerationError;
use crate::generator::{ChatTurn, ContentBlock, GenerationRequest, TextGenerator};
use crate::http::{map_http_error, map_request_error};
use crate::image::resolve_image;
use async_trait::async_trait;
use rainbow_infrastructure::storage::SecretStorage;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Generator backed by the OpenAI HTTP API.
#[derive(Clone)]
pub struct OpenAiApiAgent {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiApiAgent {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Loads credentials from ~/.config/rainbow/secret.json, then from
    /// `OPENAI_API_KEY` / `OPENAI_MODEL_NAME`.
    pub fn try_from_env() -> Result<Self, GenerationError> {
        if let Some(openai) = SecretStorage::new()
            .ok()
            .and_then(|storage| storage.load().ok())
            .and_then(|config| config.openai)
        {
            let model = openai
                .model_name
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into());
            return Ok(Self::new(openai.api_key, model));
        }

        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            GenerationError::MissingCredentials(
                "OPENAI_API_KEY not found in ~/.config/rainbow/secret.json or environment variables"
                    .into(),
            )
        })?;
        let model = env::var("OPENAI_MODEL_NAME").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.into());
        Ok(Self::new(api_key, model))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Points the agent at a compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn build_messages(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<ChatMessage>, GenerationError> {
        let mut messages = Vec::with_capacity(request.turns.len() + 1);
        if !request.system_prompt.trim().is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: vec![MessageContent::Text {
                    text: request.system_prompt.clone(),
                }],
            });
        }

        for turn in &request.turns {
            messages.push(Self::turn_to_message(turn).await?);
        }

        if messages.iter().all(|message| message.role == "system") {
            return Err(GenerationError::InvalidPayload(
                "OpenAI request must include at least one turn".into(),
            ));
        }
        Ok(messages)
    }

    async fn turn_to_message(turn: &ChatTurn) -> Result<ChatMessage, GenerationError> {
        let mut content = Vec::with_capacity(turn.content.len());
        for block in &turn.content {
            match block {
                ContentBlock::Text(text) => content.push(MessageContent::Text { text: text.clone() }),
                ContentBlock::Image(reference) => {
                    let url = resolve_image(reference).await?.into_data_url();
                    content.push(MessageContent::ImageUrl {
                        image_url: ImageUrl { url },
                    });
                }
            }
        }
        Ok(ChatMessage {
            role: turn.role.as_str(),
            content,
        })
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| map_request_error("OpenAI", err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            return Err(map_http_error(status, body_text, |body| {
                serde_json::from_str::<ErrorResponse>(body)
                    .ok()
                    .map(|wrapper| wrapper.error.message)
            }));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            GenerationError::InvalidPayload(format!("Failed to parse OpenAI response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl TextGenerator for OpenAiApiAgent {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let messages = self.build_messages(&request).await?;
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: request.options.max_tokens,
            temperature: request.options.temperature,
            presence_penalty: request.options.presence_penalty,
            frequency_penalty: request.options.frequency_penalty,
        };

        tracing::debug!(model = %self.model, turns = request.turns.len(), "Sending OpenAI request");
        self.send_request(&body).await
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    presence_penalty: f32,
    frequency_penalty: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<MessageContent>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MessageContent {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String, GenerationError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(GenerationError::EmptyResponse)
}
