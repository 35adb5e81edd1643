use anyhow::Result;
use clap::{Parser, Subcommand};
use rainbow_core::subscription::DEFAULT_PREMIUM_DAYS;
use rainbow_interaction::Provider;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;

use context::AppContext;

#[derive(Parser)]
#[command(name = "rainbow")]
#[command(about = "Rainbow - talk with the pet you remember", long_about = None)]
struct Cli {
    /// Data root (defaults to the platform data directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Whose pet to talk to
    #[arg(long, global = true, default_value = "default")]
    user: String,

    /// Text generation backend: openai, claude or offline
    #[arg(long, global = true, default_value = "openai")]
    provider: Provider,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or replace the pet persona from a TOML file
    Init {
        #[arg(long)]
        persona: PathBuf,
    },
    /// Print the system prompt built from the persona
    Prompt,
    /// Talk with the pet (interactive when no message is given)
    Chat {
        #[arg(short, long)]
        message: Option<String>,
        #[arg(long)]
        photo: Option<String>,
    },
    /// Show the welcome message of an empty conversation
    Greet,
    /// Pet the pet
    Pet,
    /// Send a virtual gift (sweet-potato, treat, toy, flower, heart)
    Gift {
        gift_id: Option<String>,
        /// List recent gifts instead of sending one
        #[arg(long)]
        list: bool,
    },
    /// Tell the pet about a dream
    Dream { text: String },
    /// Ask for today's rainbow letter
    Letter,
    /// Weather greeting
    Weather,
    /// Describe a photo
    AnalyzePhoto { photo: String },
    /// Show today's message allowance
    Status,
    /// Switch to the premium plan
    Upgrade {
        #[arg(long, default_value_t = DEFAULT_PREMIUM_DAYS)]
        days: i64,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rainbow=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let ctx = AppContext::new(cli.data_dir, cli.user, cli.provider)?;

    match cli.command {
        Commands::Init { persona } => commands::persona::init(&ctx, &persona).await?,
        Commands::Prompt => commands::persona::prompt(&ctx).await?,
        Commands::Chat { message, photo } => match message {
            Some(message) => commands::chat::once(&ctx, &message, photo.as_deref()).await?,
            None => commands::chat::interactive(&ctx).await?,
        },
        Commands::Greet => commands::chat::greet(&ctx).await?,
        Commands::Pet => commands::chat::pet(&ctx).await?,
        Commands::Gift { gift_id, list } => match (gift_id, list) {
            (_, true) => commands::companion::list_gifts(&ctx).await?,
            (Some(gift_id), false) => commands::companion::gift(&ctx, &gift_id).await?,
            (None, false) => anyhow::bail!("Give a gift id or --list"),
        },
        Commands::Dream { text } => commands::companion::dream(&ctx, &text).await?,
        Commands::Letter => commands::companion::letter(&ctx).await?,
        Commands::Weather => commands::companion::weather(&ctx).await?,
        Commands::AnalyzePhoto { photo } => commands::companion::analyze_photo(&ctx, &photo).await?,
        Commands::Status => commands::subscription::status(&ctx).await?,
        Commands::Upgrade { days } => commands::subscription::upgrade(&ctx, days).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn provider_parses_case_insensitively() {
        let cli = Cli::try_parse_from(["rainbow", "--provider", "Offline", "status"]).unwrap();
        assert_eq!(cli.provider, Provider::Offline);
        assert_eq!(cli.user, "default");
    }
}
