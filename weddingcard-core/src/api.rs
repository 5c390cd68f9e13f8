//! Request and response bodies shared by the server and the HTTP client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{GuestbookEntry, Rsvp, WeddingPatch};

/// Body of `PUT /wedding`: the owner's session plus the patch fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertRequest {
    #[serde(alias = "session_id")]
    pub owner: String,
    #[serde(flatten)]
    pub patch: WeddingPatch,
}

/// Query string carrying an owner session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerQuery {
    #[serde(alias = "session_id")]
    pub owner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub session_id: String,
    pub user_id: String,
    pub username: String,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Acknowledgement of an RSVP submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsvpSubmitted {
    pub success: bool,
    pub message: String,
    pub rsvp_id: String,
}

/// Acknowledgement of a guestbook message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestbookSubmitted {
    pub success: bool,
    pub message: String,
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsvpList {
    pub success: bool,
    pub rsvps: Vec<Rsvp>,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestbookList {
    pub success: bool,
    pub messages: Vec<GuestbookEntry>,
    pub total_count: usize,
}

/// JSON error body returned for every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Theme;

    #[test]
    fn test_upsert_request_is_flat() {
        let request = UpsertRequest {
            owner: "sess-1".to_string(),
            patch: WeddingPatch::new().theme(Theme::Modern),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "owner": "sess-1", "theme": "modern" })
        );
    }

    #[test]
    fn test_upsert_request_accepts_session_id_and_ignores_identity_fields() {
        let request: UpsertRequest = serde_json::from_value(serde_json::json!({
            "session_id": "sess-1",
            "id": "attempted-override",
            "shareable_id": "zzzzzzzz",
            "couple_name_1": "Ana"
        }))
        .unwrap();

        assert_eq!(request.owner, "sess-1");
        assert_eq!(request.patch, WeddingPatch::new().couple_name_1("Ana"));
    }
}
