use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::theme::Theme;
use super::wedding::{Faq, GalleryPhoto, PartyMember, ScheduleEvent, StoryEvent, WeddingDetails};

/// A partial update to a wedding's content.
///
/// `None` means "leave unchanged". Sequences are replacements, never
/// element-wise edits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeddingPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub couple_name_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub couple_name_2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wedding_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub their_story: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_timeline: Option<Vec<StoryEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_events: Option<Vec<ScheduleEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery_photos: Option<Vec<GalleryPhoto>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridal_party: Option<Vec<PartyMember>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groom_party: Option<Vec<PartyMember>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_roles: Option<Vec<PartyMember>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faqs: Option<Vec<Faq>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_items: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub honeymoon_fund: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsvp_enabled: Option<bool>,
}

/// Scalar fields that can be edited from a single text value.
pub const TEXT_FIELDS: [&str; 8] = [
    "couple_name_1",
    "couple_name_2",
    "wedding_date",
    "venue_name",
    "venue_location",
    "their_story",
    "theme",
    "rsvp_enabled",
];

/// Error building a patch from a field name and text value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl WeddingPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A patch that sets every field to the given content.
    pub fn from_details(details: &WeddingDetails) -> Self {
        Self {
            couple_name_1: Some(details.couple_name_1.clone()),
            couple_name_2: Some(details.couple_name_2.clone()),
            wedding_date: Some(details.wedding_date),
            venue_name: Some(details.venue_name.clone()),
            venue_location: Some(details.venue_location.clone()),
            their_story: Some(details.their_story.clone()),
            story_timeline: Some(details.story_timeline.clone()),
            schedule_events: Some(details.schedule_events.clone()),
            gallery_photos: Some(details.gallery_photos.clone()),
            bridal_party: Some(details.bridal_party.clone()),
            groom_party: Some(details.groom_party.clone()),
            special_roles: Some(details.special_roles.clone()),
            faqs: Some(details.faqs.clone()),
            registry_items: Some(details.registry_items.clone()),
            honeymoon_fund: Some(details.honeymoon_fund.clone()),
            theme: Some(details.theme),
            rsvp_enabled: Some(details.rsvp_enabled),
        }
    }

    /// Builds a single-field patch from a field name and its text form.
    pub fn from_field(field: &str, value: &str) -> Result<Self, PatchError> {
        let invalid = |reason: String| PatchError::InvalidValue {
            field: field.to_string(),
            reason,
        };

        let patch = Self::new();
        Ok(match field {
            "couple_name_1" => patch.couple_name_1(value),
            "couple_name_2" => patch.couple_name_2(value),
            "venue_name" => patch.venue_name(value),
            "venue_location" => patch.venue_location(value),
            "their_story" => patch.their_story(value),
            "wedding_date" => {
                let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                    .map_err(|e| invalid(format!("{} (expected YYYY-MM-DD)", e)))?;
                patch.wedding_date(date)
            }
            "theme" => patch.theme(Theme::from_str(value).map_err(invalid)?),
            "rsvp_enabled" => {
                let enabled = match value.trim().to_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    other => return Err(invalid(format!("'{}' is not a boolean", other))),
                };
                patch.rsvp_enabled(enabled)
            }
            other => return Err(PatchError::UnknownField(other.to_string())),
        })
    }

    /// Composes two patches; fields set in `later` win.
    pub fn then(mut self, later: WeddingPatch) -> Self {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.couple_name_1, later.couple_name_1);
        take(&mut self.couple_name_2, later.couple_name_2);
        take(&mut self.wedding_date, later.wedding_date);
        take(&mut self.venue_name, later.venue_name);
        take(&mut self.venue_location, later.venue_location);
        take(&mut self.their_story, later.their_story);
        take(&mut self.story_timeline, later.story_timeline);
        take(&mut self.schedule_events, later.schedule_events);
        take(&mut self.gallery_photos, later.gallery_photos);
        take(&mut self.bridal_party, later.bridal_party);
        take(&mut self.groom_party, later.groom_party);
        take(&mut self.special_roles, later.special_roles);
        take(&mut self.faqs, later.faqs);
        take(&mut self.registry_items, later.registry_items);
        take(&mut self.honeymoon_fund, later.honeymoon_fund);
        take(&mut self.theme, later.theme);
        take(&mut self.rsvp_enabled, later.rsvp_enabled);
        self
    }

    /// True if the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn couple_name_1(mut self, value: impl Into<String>) -> Self {
        self.couple_name_1 = Some(value.into());
        self
    }

    pub fn couple_name_2(mut self, value: impl Into<String>) -> Self {
        self.couple_name_2 = Some(value.into());
        self
    }

    pub fn wedding_date(mut self, value: NaiveDate) -> Self {
        self.wedding_date = Some(value);
        self
    }

    pub fn venue_name(mut self, value: impl Into<String>) -> Self {
        self.venue_name = Some(value.into());
        self
    }

    pub fn venue_location(mut self, value: impl Into<String>) -> Self {
        self.venue_location = Some(value.into());
        self
    }

    pub fn their_story(mut self, value: impl Into<String>) -> Self {
        self.their_story = Some(value.into());
        self
    }

    pub fn story_timeline(mut self, value: Vec<StoryEvent>) -> Self {
        self.story_timeline = Some(value);
        self
    }

    pub fn schedule_events(mut self, value: Vec<ScheduleEvent>) -> Self {
        self.schedule_events = Some(value);
        self
    }

    pub fn gallery_photos(mut self, value: Vec<GalleryPhoto>) -> Self {
        self.gallery_photos = Some(value);
        self
    }

    pub fn bridal_party(mut self, value: Vec<PartyMember>) -> Self {
        self.bridal_party = Some(value);
        self
    }

    pub fn groom_party(mut self, value: Vec<PartyMember>) -> Self {
        self.groom_party = Some(value);
        self
    }

    pub fn faqs(mut self, value: Vec<Faq>) -> Self {
        self.faqs = Some(value);
        self
    }

    pub fn theme(mut self, value: Theme) -> Self {
        self.theme = Some(value);
        self
    }

    pub fn rsvp_enabled(mut self, value: bool) -> Self {
        self.rsvp_enabled = Some(value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_patch_is_empty() {
        assert!(WeddingPatch::new().is_empty());
        assert!(!WeddingPatch::new().venue_name("x").is_empty());
    }

    #[test]
    fn test_then_later_value_wins() {
        let first = WeddingPatch::new().couple_name_1("E1").venue_name("Hall");
        let second = WeddingPatch::new().couple_name_1("E2");

        let combined = first.then(second);

        assert_eq!(combined.couple_name_1.as_deref(), Some("E2"));
        assert_eq!(combined.venue_name.as_deref(), Some("Hall"));
    }

    #[test]
    fn test_then_replaces_arrays() {
        let first = WeddingPatch::new().gallery_photos(vec![
            GalleryPhoto { url: "a".into() },
            GalleryPhoto { url: "b".into() },
        ]);
        let second = WeddingPatch::new().gallery_photos(vec![GalleryPhoto { url: "c".into() }]);

        let combined = first.then(second);

        assert_eq!(
            combined.gallery_photos,
            Some(vec![GalleryPhoto { url: "c".into() }])
        );
    }

    #[test]
    fn test_serialization_skips_unset_fields() {
        let patch = WeddingPatch::new().couple_name_2("Tom");
        let json = serde_json::to_value(&patch).unwrap();

        assert_eq!(json, serde_json::json!({ "couple_name_2": "Tom" }));
    }

    #[test]
    fn test_deserialize_partial_body() {
        let patch: WeddingPatch = serde_json::from_str(
            r#"{ "theme": "modern", "faqs": [{ "question": "Q", "answer": "A" }] }"#,
        )
        .unwrap();

        assert_eq!(patch.theme, Some(Theme::Modern));
        assert_eq!(patch.faqs.as_ref().map(Vec::len), Some(1));
        assert!(patch.couple_name_1.is_none());
    }

    #[test]
    fn test_from_details_reproduces_content() {
        let mut details = WeddingDetails::default();
        details.venue_name = "Lakehouse".to_string();

        let rebuilt = WeddingDetails {
            venue_name: "somewhere else".to_string(),
            ..WeddingDetails::default()
        }
        .with_patch(&WeddingPatch::from_details(&details));

        assert_eq!(rebuilt, details);
    }

    #[test]
    fn test_from_field_text_values() {
        let patch = WeddingPatch::from_field("couple_name_1", "Ana").unwrap();
        assert_eq!(patch.couple_name_1.as_deref(), Some("Ana"));

        let patch = WeddingPatch::from_field("wedding_date", "2026-09-12").unwrap();
        assert_eq!(patch.wedding_date, NaiveDate::from_ymd_opt(2026, 9, 12));

        let patch = WeddingPatch::from_field("theme", "boho").unwrap();
        assert_eq!(patch.theme, Some(Theme::Boho));

        let patch = WeddingPatch::from_field("rsvp_enabled", "no").unwrap();
        assert_eq!(patch.rsvp_enabled, Some(false));
    }

    #[test]
    fn test_from_field_errors() {
        assert!(matches!(
            WeddingPatch::from_field("id", "x"),
            Err(PatchError::UnknownField(_))
        ));
        assert!(matches!(
            WeddingPatch::from_field("wedding_date", "June 15"),
            Err(PatchError::InvalidValue { .. })
        ));
        assert!(matches!(
            WeddingPatch::from_field("rsvp_enabled", "maybe"),
            Err(PatchError::InvalidValue { .. })
        ));
    }
}
