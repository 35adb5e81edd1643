//! One conversation turn, from raw user text to the pet's reply.
//!
//! ```text
//! Received → DangerCheck ─┬─ SafetyShortCircuit
//!                         └─ PromptBuild → ServiceCall ─┬─ EmbellishAndReturn
//!                                                       └─ FallbackOnError
//! ```
//!
//! Every well-formed turn yields exactly one pet message. Generation failures
//! are logged and replaced by canned text; a danger signal never reaches the
//! generator.

use crate::config::ChatConfig;
use crate::random::RandomSource;
use rainbow_core::Result;
use rainbow_core::conversation::{ConversationMessage, Sender};
use rainbow_core::persona::PetPersona;
use rainbow_core::prompt::{PHOTO_ONLY_HISTORY_MARKER, build_system_prompt, photo_turn_prompt};
use rainbow_core::response::{ResponseExtra, select_canned_response};
use rainbow_core::safety::contains_danger_signal;
use rainbow_core::template::{Situation, verify_template_table};
use rainbow_interaction::{ChatTurn, GenerationError, GenerationRequest, TextGenerator, TurnRole};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Inputs of a single turn. The persona is a snapshot for this call only.
#[derive(Debug, Clone, Copy)]
pub struct UserTurn<'a> {
    pub text: &'a str,
    pub photo_reference: Option<&'a str>,
    /// Prior log, oldest first, not including this turn.
    pub history: &'a [ConversationMessage],
    pub persona: &'a PetPersona,
}

impl<'a> UserTurn<'a> {
    pub fn new(text: &'a str, history: &'a [ConversationMessage], persona: &'a PetPersona) -> Self {
        Self {
            text,
            photo_reference: None,
            history,
            persona,
        }
    }

    pub fn with_photo(mut self, photo_reference: &'a str) -> Self {
        self.photo_reference = Some(photo_reference).filter(|p| !p.trim().is_empty());
        self
    }
}

/// How the reply was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Safety,
    Generated,
    /// Generated and decorated with a memory photo.
    Embellished,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub message: ConversationMessage,
    /// Crisis resources for the host to show next to a safety reply.
    pub crisis_notice: Option<String>,
    pub source: ReplySource,
}

pub struct ConversationOrchestrator {
    generator: Arc<dyn TextGenerator>,
    random: Arc<dyn RandomSource>,
    config: ChatConfig,
}

impl ConversationOrchestrator {
    /// Fails when the template table or the configuration is unusable.
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        random: Arc<dyn RandomSource>,
        config: ChatConfig,
    ) -> Result<Self> {
        verify_template_table()?;
        config.validate()?;
        Ok(Self {
            generator,
            random,
            config,
        })
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub async fn respond(&self, turn: UserTurn<'_>) -> Result<TurnOutcome> {
        let persona = turn.persona;

        if contains_danger_signal(turn.text) {
            tracing::info!(
                target: "rainbow::safety",
                archetype = %persona.archetype,
                "Danger signal detected, replying with safety template"
            );
            let text = select_canned_response(persona, Situation::Safety, ResponseExtra::default());
            let notice =
                select_canned_response(persona, Situation::DangerResponse, ResponseExtra::default());
            return Ok(TurnOutcome {
                message: ConversationMessage::from_pet(text)?.into_safety_response(),
                crisis_notice: Some(notice),
                source: ReplySource::Safety,
            });
        }

        let request = self.build_request(&turn);
        match self.generate(request).await {
            Ok(text) => self.embellish(persona, text),
            Err(err) => {
                tracing::warn!(
                    backend = self.generator.name(),
                    retryable = err.is_retryable(),
                    error = %err,
                    "Generation failed, using fallback reply"
                );
                let text = select_canned_response(
                    persona,
                    Situation::Fallback,
                    ResponseExtra::user_text(turn.text),
                );
                Ok(TurnOutcome {
                    message: ConversationMessage::from_pet(text)?,
                    crisis_notice: None,
                    source: ReplySource::Fallback,
                })
            }
        }
    }

    /// Like [`respond`](Self::respond), but yields `None` when `token` fires
    /// before the reply is complete. No partial message is ever produced.
    pub async fn respond_cancellable(
        &self,
        turn: UserTurn<'_>,
        token: &CancellationToken,
    ) -> Result<Option<TurnOutcome>> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!("Turn cancelled before completion");
                Ok(None)
            }
            outcome = self.respond(turn) => outcome.map(Some),
        }
    }

    /// System prompt, the bounded history window, then the current turn.
    pub fn build_request(&self, turn: &UserTurn<'_>) -> GenerationRequest {
        let window_start = turn.history.len().saturating_sub(self.config.history_window);
        let mut turns: Vec<ChatTurn> = turn.history[window_start..]
            .iter()
            .map(history_turn)
            .collect();

        let max_tokens = match turn.photo_reference {
            Some(photo) => {
                let instruction = photo_turn_prompt(turn.persona, turn.text);
                turns.push(ChatTurn::with_image(TurnRole::User, instruction, photo));
                self.config.photo_max_tokens
            }
            None => {
                turns.push(ChatTurn::text(TurnRole::User, turn.text));
                self.config.chat_max_tokens
            }
        };

        tracing::debug!(
            archetype = %turn.persona.archetype,
            history_len = turns.len() - 1,
            has_photo = turn.photo_reference.is_some(),
            "Built generation request"
        );

        GenerationRequest::new(build_system_prompt(turn.persona), turns)
            .with_options(self.config.options(max_tokens))
    }

    async fn generate(&self, request: GenerationRequest) -> std::result::Result<String, GenerationError> {
        let timeout = self.config.generation_timeout;
        let text = tokio::time::timeout(timeout, self.generator.generate(request))
            .await
            .map_err(|_| GenerationError::Timeout(timeout))??;

        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text.to_string())
    }

    fn embellish(&self, persona: &PetPersona, text: String) -> Result<TurnOutcome> {
        let photos = &persona.photo_references;
        if photos.is_empty() || self.random.next_float() >= self.config.embellish_probability {
            return Ok(TurnOutcome {
                message: ConversationMessage::from_pet(text)?,
                crisis_notice: None,
                source: ReplySource::Generated,
            });
        }

        let photo = &photos[self.random.next_index(photos.len())];
        let lead_in = select_canned_response(persona, Situation::PhotoMemory, ResponseExtra::default());
        let message = ConversationMessage::from_pet(format!("{lead_in}\n\n{text}"))?.with_photo(photo);
        Ok(TurnOutcome {
            message,
            crisis_notice: None,
            source: ReplySource::Embellished,
        })
    }
}

fn history_turn(message: &ConversationMessage) -> ChatTurn {
    let role = match message.sender {
        Sender::User => TurnRole::User,
        Sender::Pet => TurnRole::Assistant,
    };
    let text = if message.text.trim().is_empty() {
        PHOTO_ONLY_HISTORY_MARKER
    } else {
        message.text.as_str()
    };
    ChatTurn::text(role, text)
}
