//! Conversation log domain: messages and their repository.

mod message;
mod repository;

pub use message::{ConversationMessage, Sender};
pub use repository::MessageRepository;
