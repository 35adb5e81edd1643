//! Text generation for Rainbow: the [`TextGenerator`] seam and its HTTP and
//! scripted implementations.

pub mod claude_api_agent;
pub mod error;
pub mod generator;
mod http;
mod image;
pub mod openai_api_agent;
pub mod provider;
pub mod scripted;

pub use claude_api_agent::ClaudeApiAgent;
pub use error::GenerationError;
pub use generator::{
    ChatTurn, ContentBlock, GenerationOptions, GenerationRequest, TextGenerator, TurnRole,
};
pub use openai_api_agent::OpenAiApiAgent;
pub use provider::Provider;
pub use scripted::ScriptedGenerator;
