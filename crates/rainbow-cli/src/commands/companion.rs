use crate::context::AppContext;
use anyhow::Result;
use rainbow_core::keepsake::{KeepsakeRepository, gift_name_for_id};

pub async fn gift(ctx: &AppContext, gift_id: &str) -> Result<()> {
    let persona = ctx.persona().await?;
    let reply = ctx
        .gift_service()?
        .send_gift(&ctx.user_id, &persona, gift_id)
        .await?;
    println!("{} {}", reply.emoji.unwrap_or("🎁"), reply.gift_name);
    println!("{}: {}", persona.name, reply.text);
    Ok(())
}

pub async fn list_gifts(ctx: &AppContext) -> Result<()> {
    let gifts = ctx.keepsakes.recent_gifts(&ctx.user_id, 10).await?;
    if gifts.is_empty() {
        println!("(no gifts yet)");
    }
    for gift in gifts {
        println!(
            "{}  {}  {}",
            gift.timestamp.format("%Y-%m-%d %H:%M"),
            gift_name_for_id(&gift.gift_id),
            gift.response.unwrap_or_default()
        );
    }
    Ok(())
}

pub async fn dream(ctx: &AppContext, text: &str) -> Result<()> {
    let persona = ctx.persona().await?;
    let reply = ctx
        .dream_service()?
        .share_dream(&ctx.user_id, &persona, text)
        .await?;
    println!("{}: {}", persona.name, reply.text);
    Ok(())
}

pub async fn letter(ctx: &AppContext) -> Result<()> {
    let persona = ctx.persona().await?;
    let letter = ctx
        .letter_service()?
        .write_today_letter(&ctx.user_id, &persona)
        .await?;
    println!("{letter}");
    Ok(())
}

pub async fn weather(ctx: &AppContext) -> Result<()> {
    let persona = ctx.persona().await?;
    let message = ctx.weather_service()?.weather_message(&persona).await?;
    match message.weather.temperature_celsius {
        Some(celsius) => println!("[{} {celsius}°C]", message.weather.condition),
        None => println!("[{}]", message.weather.condition),
    }
    println!("{}: {}", persona.name, message.text);
    Ok(())
}

pub async fn analyze_photo(ctx: &AppContext, photo: &str) -> Result<()> {
    match ctx.photo_service()?.analyze(photo).await {
        Some(description) => println!("{description}"),
        None => anyhow::bail!("Could not describe {photo}"),
    }
    Ok(())
}
