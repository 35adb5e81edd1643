use crate::context::AppContext;
use anyhow::{Context, Result};
use rainbow_core::persona::{CreatePetPersonaRequest, PersonaRepository};
use rainbow_core::prompt::build_system_prompt;
use std::path::Path;

/// Validates an onboarding file and stores it as the user's persona.
pub async fn init(ctx: &AppContext, path: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let request: CreatePetPersonaRequest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    request.validate()?;

    let persona = request.into_persona();
    ctx.personas.save(&ctx.user_id, &persona).await?;
    println!("{} is ready to talk with {}.", persona.name, ctx.user_id);
    Ok(())
}

pub async fn prompt(ctx: &AppContext) -> Result<()> {
    let persona = ctx.persona().await?;
    println!("{}", build_system_prompt(&persona));
    Ok(())
}
