use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{AuthCommand, ConfigCommand, GuestCommand, ViewCommand, WeddingCommand};
use weddingcard::config::Config;

#[derive(Parser)]
#[command(name = "weddingcard")]
#[command(version)]
#[command(about = "Edit and share your wedding page from the command line", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Owner session (overrides config and WEDDINGCARD_SESSION)
    #[arg(long, global = true)]
    session: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register or log in
    Auth(AuthCommand),

    /// Edit your wedding page
    Wedding(WeddingCommand),

    /// View a shared wedding page
    View(ViewCommand),

    /// RSVP or sign the guestbook of a shared wedding
    Guest(GuestCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.clone())?;
    if let Some(session) = cli.session {
        config.session.value = Some(session);
    }

    match cli.command {
        Some(Commands::Auth(cmd)) => {
            let config_path = cli.config.unwrap_or_else(Config::default_config_path);
            cmd.run(&config, &config_path).await?;
        }
        Some(Commands::Wedding(cmd)) => {
            cmd.run(&config).await?;
        }
        Some(Commands::View(cmd)) => {
            cmd.run(&config).await?;
        }
        Some(Commands::Guest(cmd)) => {
            cmd.run(&config).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
