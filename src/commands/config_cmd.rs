use clap::{Args, Subcommand};

use super::OutputFormat;
use weddingcard::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("database_path: {}", config.database_path.value.display());
                        println!("  source: {}", config.database_path.source);
                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!("port: {}", config.port.value);
                        println!("  source: {}", config.port.source);
                        println!("server_url: {}", config.server_url.value);
                        println!("  source: {}", config.server_url.source);
                        println!(
                            "session: {}",
                            if config.session.value.is_some() {
                                "(set)"
                            } else {
                                "(none)"
                            }
                        );
                        println!("  source: {}", config.session.source);
                        println!("autosave_delay_ms: {}", config.autosave_delay_ms.value);
                        println!("  source: {}", config.autosave_delay_ms.source);
                        println!("public_base_url: {}", config.public_base_url.value);
                        println!("  source: {}", config.public_base_url.source);
                    }
                }
                Ok(())
            }
        }
    }
}
