//! The text-generation seam.
//!
//! Everything above this layer talks to a [`TextGenerator`]; the HTTP agents
//! and the scripted test double are interchangeable behind it.

use crate::error::GenerationError;
use async_trait::async_trait;

/// Who authored a turn from the model's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One piece of turn content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Text(String),
    /// A photo reference: an http(s) URL, a `data:` URL, or a local file path.
    Image(String),
}

/// One message in the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: Vec<ContentBlock>,
}

impl ChatTurn {
    pub fn text(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentBlock::Text(text.into())],
        }
    }

    /// A user turn carrying text followed by a photo.
    pub fn with_image(role: TurnRole, text: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentBlock::Text(text.into()), ContentBlock::Image(image.into())],
        }
    }

    pub fn has_image(&self) -> bool {
        self.content
            .iter()
            .any(|block| matches!(block, ContentBlock::Image(_)))
    }

    /// Concatenated text blocks, images skipped.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text(text) => Some(text.as_str()),
                ContentBlock::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Sampling knobs for one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 200,
            temperature: 0.9,
            presence_penalty: 0.3,
            frequency_penalty: 0.3,
        }
    }
}

impl GenerationOptions {
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Everything a backend needs to produce one reply.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub turns: Vec<ChatTurn>,
    pub options: GenerationOptions,
}

impl GenerationRequest {
    pub fn new(system_prompt: impl Into<String>, turns: Vec<ChatTurn>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            turns,
            options: GenerationOptions::default(),
        }
    }

    /// A single user turn with no system prompt.
    pub fn single(text: impl Into<String>) -> Self {
        Self::new(String::new(), vec![ChatTurn::text(TurnRole::User, text)])
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn last_turn(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }
}

/// A backend that turns a prompt and conversation into reply text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}
