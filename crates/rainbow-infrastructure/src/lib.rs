//! Storage for Rainbow: paths, atomic TOML and JSON Lines files, and the
//! file-backed and in-memory repository implementations.

pub mod cache;
pub mod jsonl_keepsake_repository;
pub mod jsonl_message_repository;
pub mod memory;
pub mod paths;
pub mod storage;
pub mod toml_persona_repository;
pub mod toml_subscription_repository;

pub use cache::InMemoryCache;
pub use jsonl_keepsake_repository::JsonlKeepsakeRepository;
pub use jsonl_message_repository::JsonlMessageRepository;
pub use memory::{
    InMemoryKeepsakeRepository, InMemoryMessageRepository, InMemoryPersonaRepository,
    InMemorySubscriptionRepository,
};
pub use paths::{RainbowPaths, UserDataLayout};
pub use toml_persona_repository::TomlPersonaRepository;
pub use toml_subscription_repository::TomlSubscriptionRepository;
