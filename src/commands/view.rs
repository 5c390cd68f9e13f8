use clap::Args;
use std::fmt::Write as _;

use weddingcard::config::Config;
use weddingcard_core::{resolve_public, HttpStore, PublicRequest, PublicWedding, Section};

use super::OutputFormat;

#[derive(Args)]
pub struct ViewCommand {
    /// Shareable id from a share link
    #[arg(long, short, conflicts_with = "legacy")]
    share: Option<String>,

    /// Record id from an older link
    #[arg(long, required_unless_present = "share")]
    legacy: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl ViewCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let store = HttpStore::new(config.server_url.value.clone());
        let request = PublicRequest {
            shareable_id: self.share.clone(),
            legacy_id: self.legacy.clone(),
        };

        let wedding = resolve_public(&store, &request).await?;

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&wedding)?);
            }
            OutputFormat::Text => {
                print!("{}", render(&wedding));
            }
        }

        Ok(())
    }
}

/// Renders the visible sections of a public page as plain text.
fn render(wedding: &PublicWedding) -> String {
    let mut out = String::new();

    for section in &wedding.sections {
        // Writing to a String cannot fail.
        let _ = render_section(&mut out, wedding, *section);
    }

    out
}

fn render_section(
    out: &mut String,
    w: &PublicWedding,
    section: Section,
) -> std::fmt::Result {
    match section {
        Section::Home => {
            writeln!(out, "{} & {}", w.couple_name_1, w.couple_name_2)?;
            writeln!(out, "{}", "=".repeat(w.couple_name_1.len() + w.couple_name_2.len() + 3))?;
            writeln!(out, "{}", w.ceremony_at.format("%A, %B %-d, %Y at %-I:%M %p"))?;
            writeln!(out, "{}, {}", w.venue_name, w.venue_location)?;
            writeln!(out, "Theme: {}", w.theme)?;
            if !w.their_story.is_empty() {
                writeln!(out, "\n{}", w.their_story)?;
            }
        }
        Section::Story => {
            heading(out, section)?;
            for event in &w.story_timeline {
                writeln!(out, "  {}  {}", event.year, event.title)?;
                if !event.description.is_empty() {
                    writeln!(out, "        {}", event.description)?;
                }
            }
        }
        Section::Rsvp => {
            heading(out, section)?;
            writeln!(
                out,
                "  RSVPs are open. Reply with `weddingcard guest rsvp --share {}`.",
                w.shareable_id
            )?;
        }
        Section::Schedule => {
            heading(out, section)?;
            for event in &w.schedule_events {
                let marker = if event.highlight { "*" } else { " " };
                writeln!(out, " {}{:<10} {}", marker, event.time, event.title)?;
                if !event.location.is_empty() {
                    writeln!(out, "   {:<10} {}", "", event.location)?;
                }
            }
        }
        Section::Gallery => {
            heading(out, section)?;
            for photo in &w.gallery_photos {
                writeln!(out, "  {}", photo.url)?;
            }
        }
        Section::Party => {
            heading(out, section)?;
            for member in w
                .bridal_party
                .iter()
                .chain(&w.groom_party)
                .chain(&w.special_roles)
            {
                writeln!(out, "  {:<24} {}", member.name, member.role)?;
            }
        }
        Section::Registry => {
            heading(out, section)?;
            for item in &w.registry_items {
                let name = item
                    .get("name")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| item.to_string());
                writeln!(out, "  - {}", name)?;
            }
            if !w.honeymoon_fund.is_empty() {
                writeln!(out, "  Honeymoon fund:")?;
                for (key, value) in &w.honeymoon_fund {
                    writeln!(out, "    {}: {}", key, value)?;
                }
            }
        }
        Section::Guestbook => {
            heading(out, section)?;
            writeln!(
                out,
                "  Leave a message with `weddingcard guest sign --share {}`.",
                w.shareable_id
            )?;
        }
        Section::Faq => {
            heading(out, section)?;
            for faq in &w.faqs {
                writeln!(out, "  Q: {}", faq.question)?;
                writeln!(out, "  A: {}", faq.answer)?;
            }
        }
    }
    Ok(())
}

fn heading(out: &mut String, section: Section) -> std::fmt::Result {
    writeln!(out, "\n{}", section)?;
    writeln!(out, "{}", "-".repeat(section.label().len()))
}
