//! Host-side chat flow around the orchestrator.
//!
//! quota → persona → history → orchestrator → persist → count.
//!
//! Persona and recent history are mirrored into caches so a turn can still be
//! answered when the primary store is unreachable. Log writes that fail are
//! queued per user and retried in order by [`ChatService::flush_pending`].
//! The queue lock is never held across a store call.

use crate::orchestrator::{ConversationOrchestrator, TurnOutcome, UserTurn};
use rainbow_core::cache::Cache;
use rainbow_core::conversation::{ConversationMessage, MessageRepository};
use rainbow_core::persona::{PersonaRepository, PetPersona};
use rainbow_core::response::{ResponseExtra, select_canned_response};
use rainbow_core::subscription::{FREE_MESSAGE_LIMIT, QuotaService};
use rainbow_core::template::Situation;
use rainbow_core::{RainbowError, Result};
use rainbow_infrastructure::InMemoryCache;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, PoisonError};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Queued writes kept per user before the oldest are dropped.
pub const DEFAULT_PENDING_LIMIT: usize = 200;

pub struct ChatService {
    orchestrator: ConversationOrchestrator,
    personas: Arc<dyn PersonaRepository>,
    messages: Arc<dyn MessageRepository>,
    quota: Arc<dyn QuotaService>,
    persona_cache: Arc<dyn Cache<PetPersona>>,
    history_cache: Arc<dyn Cache<Vec<ConversationMessage>>>,
    pending: Mutex<HashMap<String, VecDeque<ConversationMessage>>>,
    pending_limit: usize,
    flushing: Arc<std::sync::Mutex<HashSet<String>>>,
}

impl ChatService {
    pub fn new(
        orchestrator: ConversationOrchestrator,
        personas: Arc<dyn PersonaRepository>,
        messages: Arc<dyn MessageRepository>,
        quota: Arc<dyn QuotaService>,
    ) -> Self {
        Self {
            orchestrator,
            personas,
            messages,
            quota,
            persona_cache: Arc::new(InMemoryCache::new()),
            history_cache: Arc::new(InMemoryCache::new()),
            pending: Mutex::new(HashMap::new()),
            pending_limit: DEFAULT_PENDING_LIMIT,
            flushing: Arc::new(std::sync::Mutex::new(HashSet::new())),
        }
    }

    /// Caps each user's queue of unsaved writes; at least one is kept.
    pub fn with_pending_limit(mut self, limit: usize) -> Self {
        self.pending_limit = limit.max(1);
        self
    }

    pub fn with_caches(
        mut self,
        persona_cache: Arc<dyn Cache<PetPersona>>,
        history_cache: Arc<dyn Cache<Vec<ConversationMessage>>>,
    ) -> Self {
        self.persona_cache = persona_cache;
        self.history_cache = history_cache;
        self
    }

    /// Runs one full turn for `user_id`.
    ///
    /// Fails with `QuotaExceeded` when today's allowance is used up and with
    /// `Validation` when the turn has neither text nor photo.
    pub async fn send_message(
        &self,
        user_id: &str,
        text: &str,
        photo_reference: Option<&str>,
    ) -> Result<TurnOutcome> {
        self.send_message_inner(user_id, text, photo_reference, None)
            .await?
            .ok_or_else(|| RainbowError::internal("uncancellable turn produced no reply"))
    }

    /// Like [`send_message`](Self::send_message) but abandons the turn when
    /// `token` fires before the reply exists. The user's message stays logged.
    pub async fn send_message_cancellable(
        &self,
        user_id: &str,
        text: &str,
        photo_reference: Option<&str>,
        token: &CancellationToken,
    ) -> Result<Option<TurnOutcome>> {
        self.send_message_inner(user_id, text, photo_reference, Some(token))
            .await
    }

    async fn send_message_inner(
        &self,
        user_id: &str,
        text: &str,
        photo_reference: Option<&str>,
        token: Option<&CancellationToken>,
    ) -> Result<Option<TurnOutcome>> {
        let user_message =
            ConversationMessage::from_user(text, photo_reference.map(str::to_string))?;

        let status = self.quota.status(user_id).await;
        if !status.can_send_message {
            tracing::info!(user_id, count = status.message_count, "Daily message limit reached");
            return Err(RainbowError::QuotaExceeded {
                limit: status.message_limit.unwrap_or(FREE_MESSAGE_LIMIT),
            });
        }

        self.flush_user(user_id).await;
        let persona = self.load_persona(user_id).await?;
        let history = self.load_history(user_id).await;

        self.persist(user_id, &user_message).await;

        let mut turn = UserTurn::new(text, &history, &persona);
        if let Some(photo) = user_message.photo_reference.as_deref() {
            turn = turn.with_photo(photo);
        }

        let outcome = match token {
            Some(token) => match self.orchestrator.respond_cancellable(turn, token).await? {
                Some(outcome) => outcome,
                None => {
                    self.remember_history(user_id, history, [user_message]).await;
                    return Ok(None);
                }
            },
            None => self.orchestrator.respond(turn).await?,
        };

        self.persist(user_id, &outcome.message).await;
        if let Err(err) = self.quota.record_sent(user_id).await {
            tracing::warn!(user_id, error = %err, "Failed to record sent message");
        }
        self.remember_history(user_id, history, [user_message, outcome.message.clone()])
            .await;

        tracing::info!(user_id, source = ?outcome.source, "Turn completed");
        Ok(Some(outcome))
    }

    /// Welcome message for an empty conversation; `None` once there is history.
    pub async fn greet(&self, user_id: &str) -> Result<Option<ConversationMessage>> {
        let persona = self.load_persona(user_id).await?;
        let history = self.load_history(user_id).await;
        if !history.is_empty() {
            return Ok(None);
        }

        let text = select_canned_response(&persona, Situation::Welcome, ResponseExtra::default());
        let message = ConversationMessage::from_pet(text)?;
        self.persist(user_id, &message).await;
        self.remember_history(user_id, history, [message.clone()]).await;
        Ok(Some(message))
    }

    /// Reaction to being petted. Neither logged nor counted.
    pub async fn pet(&self, user_id: &str) -> Result<String> {
        let persona = self.load_persona(user_id).await?;
        Ok(select_canned_response(
            &persona,
            Situation::Petting,
            ResponseExtra::default(),
        ))
    }

    /// Retries queued log writes in order and returns how many succeeded.
    ///
    /// A user's queue stops at its first failure so the log order is kept.
    /// Other users' queues are still tried.
    pub async fn flush_pending(&self) -> usize {
        let users: Vec<String> = self.pending.lock().await.keys().cloned().collect();

        let mut flushed = 0;
        for user_id in users {
            flushed += self.flush_user(&user_id).await;
        }
        if flushed > 0 {
            tracing::info!(
                flushed,
                remaining = self.pending_count().await,
                "Flushed queued messages"
            );
        }
        flushed
    }

    /// Writes stay at the front of the queue until stored, so `persist`
    /// keeps queueing behind them meanwhile. Returns 0 when the user's queue
    /// is already being flushed.
    async fn flush_user(&self, user_id: &str) -> usize {
        let Some(_claim) = FlushClaim::acquire(&self.flushing, user_id) else {
            return 0;
        };
        let mut flushed = 0;
        loop {
            let next = {
                let pending = self.pending.lock().await;
                pending.get(user_id).and_then(|queue| queue.front().cloned())
            };
            let Some(message) = next else { break };

            if let Err(err) = self.messages.append(user_id, &message).await {
                tracing::debug!(user_id, error = %err, "Queued write still failing");
                break;
            }
            flushed += 1;

            let mut pending = self.pending.lock().await;
            if let Some(queue) = pending.get_mut(user_id) {
                if queue.front().is_some_and(|front| front.id == message.id) {
                    queue.pop_front();
                }
                if queue.is_empty() {
                    pending.remove(user_id);
                }
            }
        }
        flushed
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.values().map(VecDeque::len).sum()
    }

    async fn load_persona(&self, user_id: &str) -> Result<PetPersona> {
        match self.personas.get(user_id).await {
            Ok(Some(persona)) => {
                self.persona_cache.set(user_id, persona.clone()).await;
                Ok(persona)
            }
            Ok(None) => {
                self.persona_cache.invalidate(user_id).await;
                Err(RainbowError::not_found("persona", user_id))
            }
            Err(err) => match self.persona_cache.get(user_id).await {
                Some(persona) => {
                    tracing::warn!(user_id, error = %err, "Persona store unavailable, using cached copy");
                    Ok(persona)
                }
                None => Err(err),
            },
        }
    }

    /// Recent log for the prompt window. Never fails: falls back to the
    /// cached window, then to an empty history.
    async fn load_history(&self, user_id: &str) -> Vec<ConversationMessage> {
        let window = self.orchestrator.config().history_window;
        match self.messages.recent(user_id, window).await {
            Ok(mut history) => {
                let queued = self.queued_for(user_id).await;
                history.extend(queued);
                trim_to_window(&mut history, window);
                self.history_cache.set(user_id, history.clone()).await;
                history
            }
            Err(err) => {
                tracing::warn!(user_id, error = %err, "Message store unavailable, using cached history");
                self.history_cache.get(user_id).await.unwrap_or_default()
            }
        }
    }

    async fn remember_history(
        &self,
        user_id: &str,
        mut history: Vec<ConversationMessage>,
        new_messages: impl IntoIterator<Item = ConversationMessage>,
    ) {
        history.extend(new_messages);
        trim_to_window(&mut history, self.orchestrator.config().history_window);
        self.history_cache.set(user_id, history).await;
    }

    async fn queued_for(&self, user_id: &str) -> Vec<ConversationMessage> {
        let pending = self.pending.lock().await;
        pending
            .get(user_id)
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn persist(&self, user_id: &str, message: &ConversationMessage) {
        let queued_ahead = self
            .pending
            .lock()
            .await
            .get(user_id)
            .is_some_and(|queue| !queue.is_empty());

        if !queued_ahead {
            match self.messages.append(user_id, message).await {
                Ok(()) => return,
                Err(err) => {
                    tracing::warn!(user_id, error = %err, "Failed to store message, queued for retry");
                }
            }
        }

        let mut pending = self.pending.lock().await;
        let queue = pending.entry(user_id.to_string()).or_default();
        queue.push_back(message.clone());
        let excess = queue.len().saturating_sub(self.pending_limit);
        if excess > 0 {
            queue.drain(..excess);
            tracing::warn!(
                user_id,
                dropped = excess,
                limit = self.pending_limit,
                "Write queue full, dropped oldest unsaved messages"
            );
        }
    }
}

/// Marks one user's queue as being flushed until dropped.
struct FlushClaim {
    flushing: Arc<std::sync::Mutex<HashSet<String>>>,
    user_id: String,
}

impl FlushClaim {
    fn acquire(flushing: &Arc<std::sync::Mutex<HashSet<String>>>, user_id: &str) -> Option<Self> {
        let mut users = flushing.lock().unwrap_or_else(PoisonError::into_inner);
        users.insert(user_id.to_string()).then(|| Self {
            flushing: flushing.clone(),
            user_id: user_id.to_string(),
        })
    }
}

impl Drop for FlushClaim {
    fn drop(&mut self) {
        self.flushing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user_id);
    }
}

fn trim_to_window(history: &mut Vec<ConversationMessage>, window: usize) {
    let excess = history.len().saturating_sub(window);
    history.drain(..excess);
}
