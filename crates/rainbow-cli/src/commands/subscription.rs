use crate::context::AppContext;
use anyhow::{Result, ensure};
use chrono::{Duration, Utc};
use rainbow_core::subscription::{Plan, QuotaService};

pub async fn status(ctx: &AppContext) -> Result<()> {
    let status = ctx.quota().status(&ctx.user_id).await;
    match status.message_limit {
        Some(limit) => println!(
            "{}: {}/{} messages today",
            plan_label(status.plan),
            status.message_count,
            limit
        ),
        None => println!("{}: unlimited", plan_label(status.plan)),
    }
    if !status.can_send_message {
        println!("Daily limit reached.");
    }
    Ok(())
}

pub async fn upgrade(ctx: &AppContext, days: i64) -> Result<()> {
    ensure!(days > 0, "--days must be positive");
    let expires_at = Utc::now() + Duration::days(days);
    ctx.quota()
        .upgrade_to_premium(&ctx.user_id, Some(expires_at))
        .await?;
    println!("Premium until {}", expires_at.format("%Y-%m-%d"));
    Ok(())
}

fn plan_label(plan: Plan) -> &'static str {
    match plan {
        Plan::Free => "free",
        Plan::Premium => "premium",
    }
}
