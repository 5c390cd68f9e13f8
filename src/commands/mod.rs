mod auth;
mod config_cmd;
mod guest;
mod view;
mod wedding;

pub use auth::AuthCommand;
pub use config_cmd::ConfigCommand;
pub use guest::GuestCommand;
pub use view::ViewCommand;
pub use wedding::WeddingCommand;

use clap::ValueEnum;

use weddingcard::config::Config;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// The owner session from flag, environment or config file.
fn require_session(config: &Config) -> Result<&str, Box<dyn std::error::Error>> {
    config
        .session
        .value
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| "Not logged in. Run `weddingcard auth login` first.".into())
}
