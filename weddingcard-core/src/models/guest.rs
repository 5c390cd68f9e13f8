//! Guest-submitted data: RSVP responses and guestbook messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    Yes,
    No,
}

impl fmt::Display for Attendance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attendance::Yes => write!(f, "yes"),
            Attendance::No => write!(f, "no"),
        }
    }
}

impl FromStr for Attendance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yes" => Ok(Attendance::Yes),
            "no" => Ok(Attendance::No),
            _ => Err(format!("Invalid attendance '{}'. Valid options: yes, no", s)),
        }
    }
}

fn default_guest_count() -> i64 {
    1
}

/// RSVP as submitted by a guest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRsvp {
    pub wedding_id: String,
    pub guest_name: String,
    pub guest_email: String,
    #[serde(default)]
    pub guest_phone: String,
    pub attendance: Attendance,
    #[serde(default = "default_guest_count")]
    pub guest_count: i64,
    #[serde(default)]
    pub dietary_restrictions: String,
    #[serde(default)]
    pub special_message: String,
}

impl NewRsvp {
    /// Checks the fields a guest must fill in.
    pub fn validate(&self) -> Result<(), String> {
        if self.guest_name.trim().is_empty() {
            return Err("guest_name is required".to_string());
        }
        if self.guest_count < 1 {
            return Err("guest_count must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn into_rsvp(self) -> Rsvp {
        Rsvp {
            id: Uuid::new_v4().to_string(),
            wedding_id: self.wedding_id,
            guest_name: self.guest_name.trim().to_string(),
            guest_email: self.guest_email.trim().to_string(),
            guest_phone: self.guest_phone,
            attendance: self.attendance,
            guest_count: self.guest_count,
            dietary_restrictions: self.dietary_restrictions,
            special_message: self.special_message,
            submitted_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rsvp {
    pub id: String,
    pub wedding_id: String,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    pub attendance: Attendance,
    pub guest_count: i64,
    pub dietary_restrictions: String,
    pub special_message: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGuestbookEntry {
    pub wedding_id: String,
    pub name: String,
    #[serde(default)]
    pub relationship: String,
    pub message: String,
}

impl NewGuestbookEntry {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        if self.message.trim().is_empty() {
            return Err("message is required".to_string());
        }
        Ok(())
    }

    pub fn into_entry(self) -> GuestbookEntry {
        GuestbookEntry {
            id: Uuid::new_v4().to_string(),
            wedding_id: self.wedding_id,
            name: self.name.trim().to_string(),
            relationship: self.relationship,
            message: self.message,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestbookEntry {
    pub id: String,
    pub wedding_id: String,
    pub name: String,
    pub relationship: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
