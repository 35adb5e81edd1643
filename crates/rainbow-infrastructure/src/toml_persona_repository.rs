//! TOML-backed PersonaRepository: one `persona.toml` per user.

use crate::paths::UserDataLayout;
use crate::storage::AtomicTomlFile;
use async_trait::async_trait;
use rainbow_core::Result;
use rainbow_core::persona::{PersonaRepository, PetPersona};

pub struct TomlPersonaRepository {
    layout: UserDataLayout,
}

impl TomlPersonaRepository {
    pub fn new(layout: UserDataLayout) -> Self {
        Self { layout }
    }

    fn file(&self, user_id: &str) -> Result<AtomicTomlFile<PetPersona>> {
        Ok(AtomicTomlFile::new(self.layout.persona_file(user_id)?))
    }
}

#[async_trait]
impl PersonaRepository for TomlPersonaRepository {
    async fn get(&self, user_id: &str) -> Result<Option<PetPersona>> {
        Ok(self.file(user_id)?.load()?)
    }

    async fn save(&self, user_id: &str, persona: &PetPersona) -> Result<()> {
        self.file(user_id)?.save(persona)?;
        tracing::debug!(user_id, pet = %persona.name, "Saved persona");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rainbow_core::persona::Archetype;
    use tempfile::TempDir;

    fn bori() -> PetPersona {
        let mut persona = PetPersona::new(
            "Bori",
            "누나",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            Archetype::Sweet,
        );
        persona.favorite_treat = "고구마".into();
        persona.photo_references = vec!["photos/bori-1.jpg".into()];
        persona
    }

    #[tokio::test]
    async fn save_then_get() {
        let dir = TempDir::new().unwrap();
        let repo = TomlPersonaRepository::new(UserDataLayout::new(dir.path()));

        assert!(repo.get("user-1").await.unwrap().is_none());
        repo.save("user-1", &bori()).await.unwrap();
        assert_eq!(repo.get("user-1").await.unwrap(), Some(bori()));
        assert!(repo.get("user-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bad_user_id_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let repo = TomlPersonaRepository::new(UserDataLayout::new(dir.path()));
        let err = repo.get("../escape").await.unwrap_err();
        assert!(err.is_validation());
    }
}
