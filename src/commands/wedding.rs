use clap::{Args, Subcommand};
use std::path::PathBuf;

use weddingcard::config::Config;
use weddingcard_core::models::TEXT_FIELDS;
use weddingcard_core::{
    check_server, AutosaveConfig, AutosaveCoordinator, Draft, HttpStore, LocalCache, PatchError,
    SaveEvent, WeddingPatch,
};

use super::{require_session, OutputFormat};

#[derive(Args)]
pub struct WeddingCommand {
    #[command(subcommand)]
    pub command: WeddingSubcommand,
}

#[derive(Subcommand)]
pub enum WeddingSubcommand {
    /// Show your wedding page content
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Set one or more fields, e.g. `set venue_name "Old Mill" theme boho`
    Set {
        /// FIELD VALUE pairs
        #[arg(num_args = 2.., value_names = ["FIELD", "VALUE"], required = true)]
        pairs: Vec<String>,
    },

    /// Merge a JSON patch file (use - for stdin)
    Import {
        /// Path to a JSON object of fields to replace
        file: PathBuf,
    },

    /// Print the public link to your wedding page
    Share,

    /// List RSVPs received so far
    Rsvps {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl WeddingCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let session = require_session(config)?;
        let store = HttpStore::new(config.server_url.value.clone());
        let cache = LocalCache::new(config.cache_dir());
        let autosave = AutosaveConfig::from_millis(config.autosave_delay_ms.value);

        let (editor, mut events) =
            AutosaveCoordinator::load(store.clone(), cache, session, autosave).await;

        match &self.command {
            WeddingSubcommand::Show { format } => {
                let draft = editor.current();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&draft.details)?);
                    }
                    OutputFormat::Text => {
                        print!("{}", draft.details);
                        print_status(&draft);
                    }
                }
            }
            WeddingSubcommand::Set { pairs } => {
                let patch = parse_pairs(pairs)?;
                let online = check_server(store.server_url()).await;
                editor.edit(patch)?;
                finish(editor, &mut events, online).await?;
            }
            WeddingSubcommand::Import { file } => {
                let contents = if file.as_os_str() == "-" {
                    std::io::read_to_string(std::io::stdin())?
                } else {
                    std::fs::read_to_string(file)?
                };
                let patch: WeddingPatch = serde_json::from_str(&contents)?;
                if patch.is_empty() {
                    return Err("No known fields found in import".into());
                }
                let online = check_server(store.server_url()).await;
                editor.edit(patch)?;
                finish(editor, &mut events, online).await?;
            }
            WeddingSubcommand::Share => {
                let draft = editor.current();
                match &draft.shareable_id {
                    Some(shareable_id) => {
                        println!(
                            "{}",
                            HttpStore::share_url(&config.public_base_url.value, shareable_id)
                        );
                    }
                    None => {
                        println!("Your wedding has not been saved yet. Edit it first with `weddingcard wedding set`.");
                    }
                }
            }
            WeddingSubcommand::Rsvps { format } => {
                let shareable_id = editor
                    .current()
                    .shareable_id
                    .ok_or("Your wedding has not been saved yet")?;
                let list = store.list_rsvps(session, &shareable_id).await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&list)?);
                    }
                    OutputFormat::Text => {
                        if list.rsvps.is_empty() {
                            println!("No RSVPs yet.");
                        } else {
                            let attending: i64 = list
                                .rsvps
                                .iter()
                                .filter(|r| r.attendance == weddingcard_core::Attendance::Yes)
                                .map(|r| r.guest_count)
                                .sum();
                            println!("{} RSVP(s), {} guest(s) attending\n", list.total_count, attending);
                            for rsvp in &list.rsvps {
                                println!(
                                    "  {:<24} {:<4} x{}  {}",
                                    rsvp.guest_name, rsvp.attendance, rsvp.guest_count, rsvp.guest_email
                                );
                                if !rsvp.dietary_restrictions.is_empty() {
                                    println!("      diet: {}", rsvp.dietary_restrictions);
                                }
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Builds one patch from `FIELD VALUE` pairs.
fn parse_pairs(pairs: &[String]) -> Result<WeddingPatch, Box<dyn std::error::Error>> {
    if pairs.len() % 2 != 0 {
        return Err("Expected FIELD VALUE pairs".into());
    }

    let mut patch = WeddingPatch::new();
    for pair in pairs.chunks(2) {
        let field_patch = WeddingPatch::from_field(&pair[0], &pair[1]).map_err(|e| match e {
            PatchError::UnknownField(_) => {
                format!("{}. Settable fields: {}", e, TEXT_FIELDS.join(", "))
            }
            other => other.to_string(),
        })?;
        patch = patch.then(field_patch);
    }
    Ok(patch)
}

/// Flushes pending edits and reports whether they reached the server.
///
/// When the server is down the edit stays in the local cache and is sent by
/// the next command that finds the server up.
async fn finish(
    editor: AutosaveCoordinator,
    events: &mut tokio::sync::mpsc::UnboundedReceiver<SaveEvent>,
    online: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !online {
        let draft = editor.current();
        editor.stop().await;
        println!("Server unreachable. Saved locally; the change will be sent once it is back.");
        print_status(&draft);
        return Ok(());
    }

    let result = editor.flush().await;
    let draft = editor.current();
    editor.close().await.ok();

    match result {
        Ok(()) => {
            if let Ok(SaveEvent::Saved { shareable_id, .. }) = events.try_recv() {
                println!("Saved. Share id: {}", shareable_id);
            } else {
                println!("Saved.");
            }
        }
        Err(e) => {
            eprintln!("Warning: {}", e);
            println!("Saved locally; the change will be sent on your next edit.");
        }
    }
    print_status(&draft);
    Ok(())
}

fn print_status(draft: &Draft) {
    if !draft.synced {
        println!("(unsynced local changes)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weddingcard_core::Theme;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_pairs() {
        let patch = parse_pairs(&strings(&["venue_name", "Old Mill", "theme", "boho"])).unwrap();
        assert_eq!(patch.venue_name.as_deref(), Some("Old Mill"));
        assert_eq!(patch.theme, Some(Theme::Boho));
    }

    #[test]
    fn test_parse_pairs_unknown_field_lists_fields() {
        let err = parse_pairs(&strings(&["colour", "red"])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("colour"));
        assert!(message.contains("venue_name"));
    }

    #[test]
    fn test_parse_pairs_odd_count() {
        assert!(parse_pairs(&strings(&["venue_name"])).is_err());
    }
}
