//! Guest-facing commands: RSVP and guestbook for a shared wedding page.

use clap::{Args, Subcommand};

use weddingcard::config::Config;
use weddingcard_core::{
    Attendance, HttpStore, NewGuestbookEntry, NewRsvp, PublicId, RecordStore, ResolveError,
};

use super::OutputFormat;

#[derive(Args)]
pub struct GuestCommand {
    #[command(subcommand)]
    pub command: GuestSubcommand,
}

#[derive(Subcommand)]
pub enum GuestSubcommand {
    /// Reply to a wedding invitation
    Rsvp {
        /// Shareable id from the share link
        #[arg(long, short)]
        share: String,

        /// Your name
        #[arg(long)]
        name: String,

        /// Your email
        #[arg(long)]
        email: String,

        /// Attending? (yes, no)
        #[arg(long, short)]
        attendance: Attendance,

        /// Number of guests in your party
        #[arg(long, default_value = "1")]
        guests: i64,

        /// Phone number
        #[arg(long, default_value = "")]
        phone: String,

        /// Dietary restrictions
        #[arg(long, default_value = "")]
        dietary: String,

        /// Message for the couple
        #[arg(long, short, default_value = "")]
        message: String,
    },

    /// Sign the guestbook
    Sign {
        /// Shareable id from the share link
        #[arg(long, short)]
        share: String,

        /// Your name
        #[arg(long)]
        name: String,

        /// How you know the couple
        #[arg(long, short, default_value = "")]
        relationship: String,

        /// Your message
        message: String,
    },

    /// Read the guestbook
    Messages {
        /// Shareable id from the share link
        #[arg(long, short)]
        share: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl GuestCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let client = HttpStore::new(config.server_url.value.clone());

        match &self.command {
            GuestSubcommand::Rsvp {
                share,
                name,
                email,
                attendance,
                guests,
                phone,
                dietary,
                message,
            } => {
                let rsvp = NewRsvp {
                    wedding_id: wedding_id(&client, share).await?,
                    guest_name: name.clone(),
                    guest_email: email.clone(),
                    guest_phone: phone.clone(),
                    attendance: *attendance,
                    guest_count: *guests,
                    dietary_restrictions: dietary.clone(),
                    special_message: message.clone(),
                };
                rsvp.validate()?;

                let response = client.submit_rsvp(&rsvp).await?;
                println!("{}", response.message);
            }
            GuestSubcommand::Sign {
                share,
                name,
                relationship,
                message,
            } => {
                let entry = NewGuestbookEntry {
                    wedding_id: wedding_id(&client, share).await?,
                    name: name.clone(),
                    relationship: relationship.clone(),
                    message: message.clone(),
                };
                entry.validate()?;

                let response = client.sign_guestbook(&entry).await?;
                println!("{}", response.message);
            }
            GuestSubcommand::Messages { share, format } => {
                let list = client.guestbook(share).await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&list)?);
                    }
                    OutputFormat::Text => {
                        if list.messages.is_empty() {
                            println!("No messages yet. Be the first to sign!");
                        }
                        for entry in &list.messages {
                            if entry.relationship.is_empty() {
                                println!("{}", entry.name);
                            } else {
                                println!("{} ({})", entry.name, entry.relationship);
                            }
                            println!("  {}", entry.message);
                            println!("  {}\n", entry.created_at.format("%Y-%m-%d %H:%M"));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Looks up the record id behind a share link.
async fn wedding_id(client: &HttpStore, shareable_id: &str) -> Result<String, ResolveError> {
    match client.get_by_shareable_id(shareable_id).await? {
        Some(record) => Ok(record.id),
        None => Err(ResolveError::RecordNotFound(PublicId::Shareable(
            shareable_id.to_string(),
        ))),
    }
}
