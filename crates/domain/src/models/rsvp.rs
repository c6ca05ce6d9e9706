//! RSVP submission domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

fn default_true() -> bool {
    true
}

/// An accepted public submission, immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpResponse {
    pub id: Uuid,
    pub site_id: Uuid,
    pub guest_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub confirmed: bool,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the RSVP inbox.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRsvp {
    pub site_id: Uuid,
    pub guest_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub confirmed: bool,
    pub message: Option<String>,
    /// Dedup key over (site, normalized name, phone digits, answer, message).
    pub fingerprint: String,
}

/// Result of an inbox insert.
#[derive(Debug, Clone, PartialEq)]
pub enum InboxInsert {
    Inserted(RsvpResponse),
    /// An identical submission landed inside the dedup window.
    Duplicate(RsvpResponse),
}

impl InboxInsert {
    pub fn response(&self) -> &RsvpResponse {
        match self {
            InboxInsert::Inserted(r) | InboxInsert::Duplicate(r) => r,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, InboxInsert::Duplicate(_))
    }
}

/// Form fields a visitor posts to a public site.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RsvpSubmission {
    #[serde(default, alias = "guest_name")]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    #[validate(length(max = 120, message = "Name must be at most 120 characters"))]
    pub guest_name: String,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    #[validate(length(max = 255, message = "Email must be at most 255 characters"))]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Message must be at most 1000 characters"))]
    pub message: Option<String>,

    #[serde(default = "default_true")]
    pub confirmed: bool,
}

impl RsvpSubmission {
    /// Trims every field and turns blank optionals into `None`.
    pub fn normalized(self) -> Self {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            guest_name: self.guest_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: blank_to_none(self.email),
            message: blank_to_none(self.message),
            confirmed: self.confirmed,
        }
    }
}
