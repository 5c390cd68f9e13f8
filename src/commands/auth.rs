//! Account commands.
//!
//! A successful register or login stores the session in the config file so
//! later commands act as that owner.

use clap::{Args, Subcommand};
use std::io::{self, Write};
use std::path::Path;

use weddingcard::config::Config;
use weddingcard_core::api::AuthResponse;
use weddingcard_core::HttpStore;

use super::require_session;

#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand)]
enum AuthSubcommand {
    /// Create an account
    Register {
        /// Username
        #[arg(long, short)]
        username: Option<String>,

        /// Password (prompted if omitted)
        #[arg(long, short)]
        password: Option<String>,
    },
    /// Log in to an existing account
    Login {
        /// Username
        #[arg(long, short)]
        username: Option<String>,

        /// Password (prompted if omitted)
        #[arg(long, short)]
        password: Option<String>,
    },
    /// Show the logged-in account
    Status,
}

impl AuthCommand {
    pub async fn run(
        &self,
        config: &Config,
        config_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let client = HttpStore::new(config.server_url.value.clone());

        match &self.command {
            AuthSubcommand::Register { username, password } => {
                let username = value_or_prompt(username, "Username")?;
                let password = value_or_prompt(password, "Password")?;
                let response = client.register(&username, &password).await?;
                save(&response, config_path)?;
                println!("Registered as {}.", response.username);
            }
            AuthSubcommand::Login { username, password } => {
                let username = value_or_prompt(username, "Username")?;
                let password = value_or_prompt(password, "Password")?;
                let response = client.login(&username, &password).await?;
                save(&response, config_path)?;
                println!("Logged in as {}.", response.username);
            }
            AuthSubcommand::Status => {
                let session = require_session(config)?;
                let profile = client.profile(session).await?;
                println!("Logged in as {}", profile.username);
                println!("  user id: {}", profile.id);
                println!("  since:   {}", profile.created_at.format("%Y-%m-%d"));
            }
        }

        Ok(())
    }
}

fn save(response: &AuthResponse, config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    Config::save_session(config_path, &response.session_id)?;
    tracing::debug!("Session saved to {}", config_path.display());
    Ok(())
}

fn value_or_prompt(value: &Option<String>, label: &str) -> io::Result<String> {
    if let Some(v) = value {
        return Ok(v.clone());
    }

    print!("{}: ", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_string();

    if input.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} cannot be empty", label),
        ));
    }
    Ok(input)
}
