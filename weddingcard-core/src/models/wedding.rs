use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::patch::WeddingPatch;
use super::theme::Theme;

/// Hour of day the ceremony is shown at; dates carry no time of their own.
pub const CEREMONY_HOUR: u32 = 15;

/// One milestone in the couple's story.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryEvent {
    pub year: String,
    pub title: String,
    pub description: String,
    pub image: String,
}

/// One entry of the wedding-day programme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleEvent {
    pub time: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub duration: String,
    pub highlight: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryPhoto {
    pub url: String,
}

/// Member of the bridal party, groom party or a special role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyMember {
    pub name: String,
    pub role: String,
    pub description: String,
    pub photo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// Editable content of a wedding page.
///
/// `Default` yields the template a new owner starts from, so a record built
/// from it is always fully renderable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeddingDetails {
    pub couple_name_1: String,
    pub couple_name_2: String,
    pub wedding_date: NaiveDate,
    pub venue_name: String,
    pub venue_location: String,
    pub their_story: String,
    pub story_timeline: Vec<StoryEvent>,
    pub schedule_events: Vec<ScheduleEvent>,
    pub gallery_photos: Vec<GalleryPhoto>,
    pub bridal_party: Vec<PartyMember>,
    pub groom_party: Vec<PartyMember>,
    pub special_roles: Vec<PartyMember>,
    pub faqs: Vec<Faq>,
    /// Registry entries are passed through untouched.
    pub registry_items: Vec<serde_json::Value>,
    pub honeymoon_fund: serde_json::Map<String, serde_json::Value>,
    pub theme: Theme,
    pub rsvp_enabled: bool,
}

impl Default for WeddingDetails {
    fn default() -> Self {
        Self {
            couple_name_1: "Sarah".to_string(),
            couple_name_2: "Michael".to_string(),
            wedding_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap_or_default(),
            venue_name: "Sunset Garden Estate".to_string(),
            venue_location: "Sunset Garden Estate • Napa Valley, California".to_string(),
            their_story: "We can't wait to celebrate our love story with the people who matter \
                          most to us. Join us for an unforgettable evening of joy, laughter, and \
                          new beginnings."
                .to_string(),
            story_timeline: vec![StoryEvent {
                year: "2019".to_string(),
                title: "First Meeting".to_string(),
                description: "We met at a coffee shop in downtown San Francisco on a rainy \
                              Tuesday morning."
                    .to_string(),
                image: "https://images.unsplash.com/photo-1511285560929-80b456fea0bc?w=600&h=400&fit=crop"
                    .to_string(),
            }],
            schedule_events: vec![ScheduleEvent {
                time: "2:00 PM".to_string(),
                title: "Guests Arrival & Welcome".to_string(),
                description: "Please arrive by 2:00 PM for welcome drinks and mingling."
                    .to_string(),
                location: "Sunset Garden Estate - Main Entrance".to_string(),
                duration: "30 minutes".to_string(),
                highlight: false,
            }],
            gallery_photos: Vec::new(),
            bridal_party: Vec::new(),
            groom_party: Vec::new(),
            special_roles: Vec::new(),
            faqs: Vec::new(),
            registry_items: Vec::new(),
            honeymoon_fund: serde_json::Map::new(),
            theme: Theme::Classic,
            rsvp_enabled: true,
        }
    }
}

impl WeddingDetails {
    /// Merges a patch into these details.
    ///
    /// Scalars overwrite, sequences and the honeymoon fund are replaced
    /// wholesale. Fields absent from the patch are left alone.
    pub fn apply(&mut self, patch: &WeddingPatch) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }

        set(&mut self.couple_name_1, &patch.couple_name_1);
        set(&mut self.couple_name_2, &patch.couple_name_2);
        set(&mut self.wedding_date, &patch.wedding_date);
        set(&mut self.venue_name, &patch.venue_name);
        set(&mut self.venue_location, &patch.venue_location);
        set(&mut self.their_story, &patch.their_story);
        set(&mut self.story_timeline, &patch.story_timeline);
        set(&mut self.schedule_events, &patch.schedule_events);
        set(&mut self.gallery_photos, &patch.gallery_photos);
        set(&mut self.bridal_party, &patch.bridal_party);
        set(&mut self.groom_party, &patch.groom_party);
        set(&mut self.special_roles, &patch.special_roles);
        set(&mut self.faqs, &patch.faqs);
        set(&mut self.registry_items, &patch.registry_items);
        set(&mut self.honeymoon_fund, &patch.honeymoon_fund);
        set(&mut self.theme, &patch.theme);
        set(&mut self.rsvp_enabled, &patch.rsvp_enabled);
    }

    /// Returns a copy with the patch applied.
    pub fn with_patch(mut self, patch: &WeddingPatch) -> Self {
        self.apply(patch);
        self
    }

    /// Date and conventional time the ceremony is displayed at.
    pub fn ceremony_at(&self) -> NaiveDateTime {
        let time = NaiveTime::from_hms_opt(CEREMONY_HOUR, 0, 0).unwrap_or_default();
        self.wedding_date.and_time(time)
    }

    /// "Sarah & Michael", tolerating empty draft names.
    pub fn couple_display(&self) -> String {
        match (
            self.couple_name_1.trim().is_empty(),
            self.couple_name_2.trim().is_empty(),
        ) {
            (false, false) => format!("{} & {}", self.couple_name_1, self.couple_name_2),
            (false, true) => self.couple_name_1.clone(),
            (true, false) => self.couple_name_2.clone(),
            (true, true) => "Untitled wedding".to_string(),
        }
    }
}

impl fmt::Display for WeddingDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.couple_display();
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.chars().count()))?;
        writeln!(f, "Date:  {}", self.ceremony_at().format("%A, %B %-d, %Y at %-I:%M %p"))?;
        writeln!(f, "Venue: {}", self.venue_name)?;
        if !self.venue_location.is_empty() {
            writeln!(f, "       {}", self.venue_location)?;
        }
        writeln!(f, "Theme: {}", self.theme)?;
        writeln!(
            f,
            "RSVP:  {}",
            if self.rsvp_enabled { "open" } else { "closed" }
        )?;

        if !self.story_timeline.is_empty() {
            writeln!(f, "\nStory:")?;
            for event in &self.story_timeline {
                writeln!(f, "  {} - {}", event.year, event.title)?;
            }
        }

        if !self.schedule_events.is_empty() {
            writeln!(f, "\nSchedule:")?;
            for event in &self.schedule_events {
                writeln!(f, "  {:>8}  {}", event.time, event.title)?;
            }
        }

        Ok(())
    }
}

/// A persisted wedding record.
///
/// `id`, `shareable_id`, `owner_session` and `created_at` are fixed when the
/// record is first saved; only `details` and `updated_at` change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeddingRecord {
    pub id: String,
    pub shareable_id: String,
    /// Empty in copies served to the public.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner_session: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: WeddingDetails,
}

impl WeddingRecord {
    /// Creates a record from template defaults overlaid by `patch`.
    pub fn create(
        id: impl Into<String>,
        shareable_id: impl Into<String>,
        owner_session: impl Into<String>,
        patch: &WeddingPatch,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            shareable_id: shareable_id.into(),
            owner_session: owner_session.into(),
            created_at: now,
            updated_at: now,
            details: WeddingDetails::default().with_patch(patch),
        }
    }

    /// Merges a patch into the record, leaving identity fields untouched.
    pub fn merge(&mut self, patch: &WeddingPatch) {
        self.details.apply(patch);
        self.updated_at = Utc::now();
    }

    /// Copy safe to hand to anonymous visitors.
    pub fn without_owner(mut self) -> Self {
        self.owner_session.clear();
        self
    }
}
