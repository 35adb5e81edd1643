use crate::context::AppContext;
use anyhow::Result;
use rainbow_application::{ChatService, TurnOutcome};
use rainbow_core::RainbowError;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

fn print_outcome(name: &str, outcome: &TurnOutcome) {
    println!("{name}: {}", outcome.message.text);
    if let Some(photo) = &outcome.message.photo_reference {
        println!("  [photo] {photo}");
    }
    if let Some(notice) = &outcome.crisis_notice {
        println!();
        println!("{notice}");
    }
}

pub async fn once(ctx: &AppContext, message: &str, photo: Option<&str>) -> Result<()> {
    let persona = ctx.persona().await?;
    let service = ctx.chat_service()?;
    let outcome = service.send_message(&ctx.user_id, message, photo).await?;
    print_outcome(&persona.name, &outcome);
    warn_pending(&service).await;
    Ok(())
}

/// Line-by-line chat on stdin. Ctrl-C abandons the reply in flight; an
/// empty line or EOF ends the session.
pub async fn interactive(ctx: &AppContext) -> Result<()> {
    let persona = ctx.persona().await?;
    let service = ctx.chat_service()?;

    if let Some(welcome) = service.greet(&ctx.user_id).await? {
        println!("{}: {}", persona.name, welcome.text);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            break;
        }

        let token = CancellationToken::new();
        let cancel = token.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });

        let result = service
            .send_message_cancellable(&ctx.user_id, line, None, &token)
            .await;
        watcher.abort();

        match result {
            Ok(Some(outcome)) => print_outcome(&persona.name, &outcome),
            Ok(None) => println!("(cancelled)"),
            Err(RainbowError::QuotaExceeded { limit }) => {
                println!("오늘은 {limit}개의 메시지를 모두 보냈어요. 내일 다시 만나요.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    warn_pending(&service).await;
    Ok(())
}

pub async fn greet(ctx: &AppContext) -> Result<()> {
    let persona = ctx.persona().await?;
    match ctx.chat_service()?.greet(&ctx.user_id).await? {
        Some(message) => println!("{}: {}", persona.name, message.text),
        None => println!("(already talking with {})", persona.name),
    }
    Ok(())
}

pub async fn pet(ctx: &AppContext) -> Result<()> {
    let persona = ctx.persona().await?;
    let text = ctx.chat_service()?.pet(&ctx.user_id).await?;
    println!("{}: {text}", persona.name);
    Ok(())
}

async fn warn_pending(service: &ChatService) {
    let pending = service.pending_count().await;
    if pending > 0 {
        tracing::warn!(pending, "Some messages could not be saved");
    }
}
