//! Persona repository trait.

use super::model::PetPersona;
use crate::error::Result;

/// An abstract repository for the persona owned by each user.
///
/// Decouples the application's core logic from the storage mechanism
/// (TOML file, document database, in-memory).
#[async_trait::async_trait]
pub trait PersonaRepository: Send + Sync {
    /// Retrieves the persona configured by `user_id`, if any.
    async fn get(&self, user_id: &str) -> Result<Option<PetPersona>>;

    /// Saves the persona for `user_id`, replacing any existing one.
    async fn save(&self, user_id: &str, persona: &PetPersona) -> Result<()>;
}
