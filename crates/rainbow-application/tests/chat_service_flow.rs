use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rainbow_application::{
    ChatConfig, ChatService, ConversationOrchestrator, FixedRandom, ReplySource,
    SubscriptionQuota,
};
use rainbow_core::conversation::{ConversationMessage, MessageRepository, Sender};
use rainbow_core::persona::{Archetype, PersonaRepository, PetPersona};
use rainbow_core::subscription::FREE_MESSAGE_LIMIT;
use rainbow_core::{RainbowError, Result};
use rainbow_infrastructure::{
    InMemoryMessageRepository, InMemoryPersonaRepository, InMemorySubscriptionRepository,
};
use rainbow_interaction::ScriptedGenerator;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Harness {
    service: ChatService,
    generator: Arc<ScriptedGenerator>,
    personas: Arc<InMemoryPersonaRepository>,
    messages: Arc<InMemoryMessageRepository>,
}

async fn harness() -> Harness {
    let generator = Arc::new(ScriptedGenerator::always("응, 나 여기 있어!"));
    let personas = Arc::new(InMemoryPersonaRepository::new());
    let messages = Arc::new(InMemoryMessageRepository::new());
    let subscriptions = Arc::new(InMemorySubscriptionRepository::new());

    let persona = PetPersona::new(
        "Bori",
        "누나",
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        Archetype::Cool,
    );
    personas.save("user-1", &persona).await.unwrap();

    let orchestrator = ConversationOrchestrator::new(
        generator.clone(),
        Arc::new(FixedRandom::constant(0.9)),
        ChatConfig::default(),
    )
    .unwrap();
    let service = ChatService::new(
        orchestrator,
        personas.clone(),
        messages.clone(),
        Arc::new(SubscriptionQuota::new(subscriptions)),
    );

    Harness {
        service,
        generator,
        personas,
        messages,
    }
}

#[tokio::test]
async fn turn_is_logged_in_order() {
    let h = harness().await;
    let outcome = h.service.send_message("user-1", "보리야", None).await.unwrap();
    assert_eq!(outcome.source, ReplySource::Generated);

    let log = h.messages.snapshot("user-1").await;
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].sender, Sender::User);
    assert_eq!(log[0].text, "보리야");
    assert_eq!(log[1], outcome.message);
}

#[tokio::test]
async fn quota_blocks_eleventh_message() {
    let h = harness().await;
    for _ in 0..FREE_MESSAGE_LIMIT {
        h.service.send_message("user-1", "안녕", None).await.unwrap();
    }

    let err = h.service.send_message("user-1", "안녕", None).await.unwrap_err();
    assert!(err.is_quota_exceeded());
    assert_eq!(h.generator.call_count().await, FREE_MESSAGE_LIMIT as usize);
}

#[tokio::test]
async fn empty_turn_is_rejected() {
    let h = harness().await;
    let err = h.service.send_message("user-1", "  ", None).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(h.generator.call_count().await, 0);
}

#[tokio::test]
async fn unknown_user_has_no_persona() {
    let h = harness().await;
    let err = h.service.send_message("stranger", "안녕", None).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn offline_writes_are_queued_then_flushed() {
    let h = harness().await;
    h.service.send_message("user-1", "첫 번째", None).await.unwrap();

    h.messages.set_offline(true);
    h.personas.set_offline(true);
    let outcome = h.service.send_message("user-1", "두 번째", None).await.unwrap();
    assert_eq!(outcome.source, ReplySource::Generated);
    assert_eq!(h.service.pending_count().await, 2);

    // cached history still reached the generator
    let calls = h.generator.calls().await;
    let last = calls.last().unwrap();
    assert_eq!(last.turns.len(), 3);
    assert_eq!(last.turns[0].plain_text(), "첫 번째");

    assert_eq!(h.service.flush_pending().await, 0);

    h.messages.set_offline(false);
    assert_eq!(h.service.flush_pending().await, 2);
    assert_eq!(h.service.pending_count().await, 0);

    let texts: Vec<String> = h
        .messages
        .recent("user-1", 10)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.text)
        .collect();
    assert_eq!(texts[0], "첫 번째");
    assert_eq!(texts[2], "두 번째");
    assert_eq!(texts.len(), 4);
}

#[tokio::test]
async fn greeting_only_for_empty_log() {
    let h = harness().await;
    let welcome = h.service.greet("user-1").await.unwrap().unwrap();
    assert_eq!(welcome.sender, Sender::Pet);
    assert!(h.service.greet("user-1").await.unwrap().is_none());
    assert_eq!(h.messages.snapshot("user-1").await.len(), 1);
}

#[tokio::test]
async fn petting_is_not_logged() {
    let h = harness().await;
    let text = h.service.pet("user-1").await.unwrap();
    assert!(!text.is_empty());
    assert!(h.messages.snapshot("user-1").await.is_empty());
    assert_eq!(h.generator.call_count().await, 0);
}

#[tokio::test]
async fn safety_turn_is_logged_with_flag() {
    let h = harness().await;
    let outcome = h
        .service
        .send_message("user-1", "다 끝내고 싶어", None)
        .await
        .unwrap();
    assert!(outcome.crisis_notice.is_some());

    let log = h.messages.snapshot("user-1").await;
    assert!(log[1].is_safety_response);
    assert_eq!(h.generator.call_count().await, 0);
}

/// Message store whose appends hang or fail for chosen users.
#[derive(Default)]
struct SelectiveStore {
    inner: InMemoryMessageRepository,
    hung: Mutex<HashSet<String>>,
    failing: Mutex<HashSet<String>>,
}

impl SelectiveStore {
    fn hang(&self, user_id: &str) {
        self.hung.lock().unwrap().insert(user_id.to_string());
    }

    fn fail(&self, user_id: &str) {
        self.failing.lock().unwrap().insert(user_id.to_string());
    }

    fn recover(&self, user_id: &str) {
        self.failing.lock().unwrap().remove(user_id);
    }
}

#[async_trait]
impl MessageRepository for SelectiveStore {
    async fn append(&self, user_id: &str, message: &ConversationMessage) -> Result<()> {
        let hung = self.hung.lock().unwrap().contains(user_id);
        if hung {
            std::future::pending::<()>().await;
        }
        let failing = self.failing.lock().unwrap().contains(user_id);
        if failing {
            return Err(RainbowError::data_access("store unreachable"));
        }
        self.inner.append(user_id, message).await
    }

    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationMessage>> {
        self.inner.recent(user_id, limit).await
    }

    async fn since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ConversationMessage>> {
        self.inner.since(user_id, since).await
    }
}

async fn service_over(store: Arc<SelectiveStore>) -> ChatService {
    let personas = Arc::new(InMemoryPersonaRepository::new());
    for user_id in ["user-1", "user-2"] {
        let persona = PetPersona::new(
            "Bori",
            "누나",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            Archetype::Sweet,
        );
        personas.save(user_id, &persona).await.unwrap();
    }

    let orchestrator = ConversationOrchestrator::new(
        Arc::new(ScriptedGenerator::always("응, 나 여기 있어!")),
        Arc::new(FixedRandom::constant(0.9)),
        ChatConfig::default(),
    )
    .unwrap();
    ChatService::new(
        orchestrator,
        personas,
        store,
        Arc::new(SubscriptionQuota::new(Arc::new(
            InMemorySubscriptionRepository::new(),
        ))),
    )
}

#[tokio::test]
async fn hung_store_for_one_user_does_not_stall_another() {
    let store = Arc::new(SelectiveStore::default());
    store.hang("user-2");
    let service = service_over(store.clone()).await;

    let stuck = service.send_message("user-2", "느린 저장소", None);
    tokio::pin!(stuck);
    tokio::select! {
        _ = &mut stuck => panic!("append to a hung store finished"),
        _ = tokio::time::sleep(Duration::from_millis(20)) => {}
    }

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        service.send_message("user-1", "보리야", None),
    )
    .await
    .expect("user-1 waited on user-2's store")
    .unwrap();
    assert_eq!(outcome.source, ReplySource::Generated);
    assert_eq!(store.inner.snapshot("user-1").await.len(), 2);
}

#[tokio::test]
async fn queued_writes_for_one_user_stay_while_another_completes() {
    let store = Arc::new(SelectiveStore::default());
    store.fail("user-2");
    let service = service_over(store.clone()).await;

    service.send_message("user-2", "저장 안 됨", None).await.unwrap();
    assert_eq!(service.pending_count().await, 2);

    service.send_message("user-1", "보리야", None).await.unwrap();
    assert_eq!(store.inner.snapshot("user-1").await.len(), 2);
    assert_eq!(service.pending_count().await, 2);
    assert_eq!(service.flush_pending().await, 0);

    store.recover("user-2");
    assert_eq!(service.flush_pending().await, 2);
    assert_eq!(service.pending_count().await, 0);
    let log = store.inner.snapshot("user-2").await;
    assert_eq!(log[0].text, "저장 안 됨");
    assert_eq!(log[1].sender, Sender::Pet);
}

#[tokio::test]
async fn full_queue_drops_oldest_writes() {
    let store = Arc::new(SelectiveStore::default());
    store.fail("user-1");
    let service = service_over(store.clone()).await.with_pending_limit(3);

    for text in ["첫 번째", "두 번째", "세 번째"] {
        service.send_message("user-1", text, None).await.unwrap();
    }
    assert_eq!(service.pending_count().await, 3);

    store.recover("user-1");
    assert_eq!(service.flush_pending().await, 3);
    let log = store.inner.snapshot("user-1").await;
    assert_eq!(log.len(), 3);
    assert_eq!(log[0].sender, Sender::Pet);
    assert_eq!(log[1].text, "세 번째");
}
