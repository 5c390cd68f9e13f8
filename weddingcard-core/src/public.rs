//! Read-only boundary used by the public wedding page.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{
    Faq, GalleryPhoto, PartyMember, ScheduleEvent, StoryEvent, Theme, WeddingDetails,
    WeddingRecord,
};
use crate::resolver::{resolve_public_id, RequestContext, ResolveError};
use crate::store::RecordStore;

/// Sections of the public page, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Home,
    Story,
    Rsvp,
    Schedule,
    Gallery,
    Party,
    Registry,
    Guestbook,
    Faq,
}

impl Section {
    pub const ALL: [Section; 9] = [
        Section::Home,
        Section::Story,
        Section::Rsvp,
        Section::Schedule,
        Section::Gallery,
        Section::Party,
        Section::Registry,
        Section::Guestbook,
        Section::Faq,
    ];

    /// Whether this section has anything to show for the given content.
    ///
    /// Sections backed by a sequence are suppressed when it is empty rather
    /// than rendered as an empty container.
    pub fn is_visible(self, details: &WeddingDetails) -> bool {
        match self {
            Section::Home | Section::Guestbook => true,
            Section::Rsvp => details.rsvp_enabled,
            Section::Story => !details.story_timeline.is_empty(),
            Section::Schedule => !details.schedule_events.is_empty(),
            Section::Gallery => !details.gallery_photos.is_empty(),
            Section::Party => {
                !(details.bridal_party.is_empty()
                    && details.groom_party.is_empty()
                    && details.special_roles.is_empty())
            }
            Section::Registry => {
                !(details.registry_items.is_empty() && details.honeymoon_fund.is_empty())
            }
            Section::Faq => !details.faqs.is_empty(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::Home => "Home",
            Section::Story => "Our Story",
            Section::Rsvp => "RSVP",
            Section::Schedule => "Schedule",
            Section::Gallery => "Gallery",
            Section::Party => "Wedding Party",
            Section::Registry => "Registry",
            Section::Guestbook => "Guestbook",
            Section::Faq => "FAQ",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifiers a public visitor may arrive with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicRequest {
    pub shareable_id: Option<String>,
    pub legacy_id: Option<String>,
}

/// The themed, section-structured payload handed to the public page.
///
/// Owner identity is stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicWedding {
    pub id: String,
    pub shareable_id: String,
    pub theme: Theme,
    pub sections: Vec<Section>,
    pub couple_name_1: String,
    pub couple_name_2: String,
    pub ceremony_at: NaiveDateTime,
    pub venue_name: String,
    pub venue_location: String,
    pub their_story: String,
    pub rsvp_enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub story_timeline: Vec<StoryEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schedule_events: Vec<ScheduleEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gallery_photos: Vec<GalleryPhoto>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bridal_party: Vec<PartyMember>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groom_party: Vec<PartyMember>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub special_roles: Vec<PartyMember>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faqs: Vec<Faq>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registry_items: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub honeymoon_fund: serde_json::Map<String, serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

impl PublicWedding {
    pub fn has_section(&self, section: Section) -> bool {
        self.sections.contains(&section)
    }
}

impl From<WeddingRecord> for PublicWedding {
    fn from(record: WeddingRecord) -> Self {
        let details = record.details;
        let sections = Section::ALL
            .into_iter()
            .filter(|s| s.is_visible(&details))
            .collect();

        Self {
            id: record.id,
            shareable_id: record.shareable_id,
            theme: details.theme,
            sections,
            ceremony_at: details.ceremony_at(),
            couple_name_1: details.couple_name_1,
            couple_name_2: details.couple_name_2,
            venue_name: details.venue_name,
            venue_location: details.venue_location,
            their_story: details.their_story,
            rsvp_enabled: details.rsvp_enabled,
            story_timeline: details.story_timeline,
            schedule_events: details.schedule_events,
            gallery_photos: details.gallery_photos,
            bridal_party: details.bridal_party,
            groom_party: details.groom_party,
            special_roles: details.special_roles,
            faqs: details.faqs,
            registry_items: details.registry_items,
            honeymoon_fund: details.honeymoon_fund,
            updated_at: record.updated_at,
        }
    }
}

/// Resolves a public request to its page payload.
///
/// The shareable id wins when both identifiers are present. A missing
/// record is always an error; no sample content is substituted.
pub async fn resolve_public<S: RecordStore + ?Sized>(
    store: &S,
    request: &PublicRequest,
) -> Result<PublicWedding, ResolveError> {
    let ctx = RequestContext {
        owner_session: None,
        shareable_id: request.shareable_id.clone(),
        legacy_id: request.legacy_id.clone(),
    };
    let id = ctx.public_id().ok_or(ResolveError::MissingIdentifier)?;
    let record = resolve_public_id(store, &id).await?;
    Ok(PublicWedding::from(record))
}
