//! Application layer for Rainbow.
//!
//! Coordinates the domain and the collaborators: a single conversation turn
//! ([`ConversationOrchestrator`]), the host chat flow ([`ChatService`]), the
//! daily quota and the companion features.

pub mod chat_service;
pub mod companion;
pub mod config;
pub mod orchestrator;
pub mod quota;
pub mod random;

pub use chat_service::ChatService;
pub use config::{ChatConfig, CompanionBudgets};
pub use orchestrator::{ConversationOrchestrator, ReplySource, TurnOutcome, UserTurn};
pub use quota::SubscriptionQuota;
pub use random::{FixedRandom, RandomSource, ThreadRandom};
