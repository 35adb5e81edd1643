//! Persona domain module.
//!
//! # Module Structure
//!
//! - `model`: `PetPersona` and the `Archetype` presets
//! - `request`: onboarding request with validation
//! - `repository`: repository trait for persona persistence

mod model;
mod repository;
pub mod request;

pub use model::{Archetype, PetPersona};
pub use repository::PersonaRepository;
pub use request::CreatePetPersonaRequest;
