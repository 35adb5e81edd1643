//! Wiring of repositories, generator and services for one CLI invocation.

use anyhow::{Context, Result};
use rainbow_application::companion::{
    DreamService, GiftService, LetterService, PhotoAnalysisService, RandomWeather, WeatherService,
};
use rainbow_application::{
    ChatConfig, ChatService, ConversationOrchestrator, SubscriptionQuota, ThreadRandom,
};
use rainbow_core::persona::{PersonaRepository, PetPersona};
use rainbow_infrastructure::{
    JsonlKeepsakeRepository, JsonlMessageRepository, TomlPersonaRepository,
    TomlSubscriptionRepository, UserDataLayout,
};
use rainbow_interaction::{Provider, TextGenerator};
use std::path::PathBuf;
use std::sync::Arc;

pub struct AppContext {
    pub user_id: String,
    pub config: ChatConfig,
    provider: Provider,
    pub personas: Arc<TomlPersonaRepository>,
    pub messages: Arc<JsonlMessageRepository>,
    pub subscriptions: Arc<TomlSubscriptionRepository>,
    pub keepsakes: Arc<JsonlKeepsakeRepository>,
}

impl AppContext {
    pub fn new(data_dir: Option<PathBuf>, user_id: String, provider: Provider) -> Result<Self> {
        let layout = match data_dir {
            Some(dir) => UserDataLayout::new(dir),
            None => UserDataLayout::default_location().context("Cannot locate data directory")?,
        };
        tracing::debug!(root = %layout.root().display(), user_id, "Using data directory");

        Ok(Self {
            user_id,
            config: ChatConfig::default(),
            provider,
            personas: Arc::new(TomlPersonaRepository::new(layout.clone())),
            messages: Arc::new(JsonlMessageRepository::new(layout.clone())),
            subscriptions: Arc::new(TomlSubscriptionRepository::new(layout.clone())),
            keepsakes: Arc::new(JsonlKeepsakeRepository::new(layout)),
        })
    }

    pub async fn persona(&self) -> Result<PetPersona> {
        self.personas
            .get(&self.user_id)
            .await?
            .with_context(|| {
                format!(
                    "No persona for user '{}'. Run `rainbow init --persona <file>` first.",
                    self.user_id
                )
            })
    }

    /// Built on demand so commands that never generate need no credentials.
    pub fn generator(&self) -> Result<Arc<dyn TextGenerator>> {
        self.provider
            .build()
            .with_context(|| format!("Cannot start the {} backend", self.provider))
    }

    pub fn quota(&self) -> SubscriptionQuota {
        SubscriptionQuota::new(self.subscriptions.clone())
    }

    pub fn chat_service(&self) -> Result<ChatService> {
        let orchestrator = ConversationOrchestrator::new(
            self.generator()?,
            Arc::new(ThreadRandom),
            self.config.clone(),
        )?;
        Ok(ChatService::new(
            orchestrator,
            self.personas.clone(),
            self.messages.clone(),
            Arc::new(self.quota()),
        ))
    }

    pub fn gift_service(&self) -> Result<GiftService> {
        Ok(GiftService::new(
            self.generator()?,
            self.keepsakes.clone(),
            self.config.clone(),
        ))
    }

    pub fn dream_service(&self) -> Result<DreamService> {
        Ok(DreamService::new(
            self.generator()?,
            self.keepsakes.clone(),
            self.config.clone(),
        ))
    }

    pub fn letter_service(&self) -> Result<LetterService> {
        Ok(LetterService::new(
            self.generator()?,
            self.messages.clone(),
            self.config.clone(),
        ))
    }

    pub fn weather_service(&self) -> Result<WeatherService> {
        Ok(WeatherService::new(
            self.generator()?,
            Arc::new(RandomWeather::new(Arc::new(ThreadRandom))),
            self.config.clone(),
        ))
    }

    pub fn photo_service(&self) -> Result<PhotoAnalysisService> {
        Ok(PhotoAnalysisService::new(self.generator()?, self.config.clone()))
    }
}
