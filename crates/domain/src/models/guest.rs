//! Guest ledger domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Match key for a guest name: trimmed, inner whitespace collapsed, lowercased.
pub fn name_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Guest grouping shown on the guest list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GuestCategory {
    #[serde(rename = "família", alias = "familia")]
    Familia,
    #[default]
    #[serde(rename = "amigos")]
    Amigos,
    #[serde(rename = "trabalho")]
    Trabalho,
}

impl GuestCategory {
    /// Storage key (ASCII).
    pub fn as_str(&self) -> &'static str {
        match self {
            GuestCategory::Familia => "familia",
            GuestCategory::Amigos => "amigos",
            GuestCategory::Trabalho => "trabalho",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            GuestCategory::Familia => "família",
            GuestCategory::Amigos => "amigos",
            GuestCategory::Trabalho => "trabalho",
        }
    }
}

impl FromStr for GuestCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "familia" | "família" => Ok(GuestCategory::Familia),
            "amigos" => Ok(GuestCategory::Amigos),
            "trabalho" => Ok(GuestCategory::Trabalho),
            _ => Err(format!("Invalid guest category: {}", s)),
        }
    }
}

impl fmt::Display for GuestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Tri-state attendance. Serialized as `true`, `false` or `"pending"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Confirmation {
    Confirmed,
    Declined,
    #[default]
    Pending,
}

impl Confirmation {
    pub fn as_option(&self) -> Option<bool> {
        match self {
            Confirmation::Confirmed => Some(true),
            Confirmation::Declined => Some(false),
            Confirmation::Pending => None,
        }
    }
}

impl From<bool> for Confirmation {
    fn from(value: bool) -> Self {
        if value {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

impl From<Option<bool>> for Confirmation {
    fn from(value: Option<bool>) -> Self {
        value.map(Confirmation::from).unwrap_or(Confirmation::Pending)
    }
}

impl Serialize for Confirmation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Confirmation::Confirmed => serializer.serialize_bool(true),
            Confirmation::Declined => serializer.serialize_bool(false),
            Confirmation::Pending => serializer.serialize_str("pending"),
        }
    }
}

impl<'de> Deserialize<'de> for Confirmation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Text(String),
            Null(()),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => Ok(Confirmation::from(b)),
            Raw::Null(()) => Ok(Confirmation::Pending),
            Raw::Text(s) => match s.as_str() {
                "pending" => Ok(Confirmation::Pending),
                "true" => Ok(Confirmation::Confirmed),
                "false" => Ok(Confirmation::Declined),
                other => Err(serde::de::Error::custom(format!(
                    "invalid confirmation '{}', expected true, false or \"pending\"",
                    other
                ))),
            },
        }
    }
}

/// How a guest entered the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestOrigin {
    Manual,
    Rsvp,
}

impl GuestOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuestOrigin::Manual => "manual",
            GuestOrigin::Rsvp => "rsvp",
        }
    }
}

/// A guest on an owner's private list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestRecord {
    pub id: Uuid,
    #[serde(skip)]
    pub owner_id: Uuid,
    pub name: String,
    pub category: GuestCategory,
    pub confirmed: Confirmation,
    pub plus_ones: i32,
    pub origin: GuestOrigin,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl GuestRecord {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Insert payload for the guest ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGuest {
    pub owner_id: Uuid,
    pub name: String,
    pub category: GuestCategory,
    pub confirmed: Confirmation,
    pub plus_ones: i32,
    pub origin: GuestOrigin,
}

/// Result of a create-if-absent insert.
#[derive(Debug, Clone, PartialEq)]
pub enum GuestCreate {
    Created(GuestRecord),
    /// A guest (possibly deleted) already holds the name key.
    Existing(GuestRecord),
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuestPatch {
    pub name: Option<String>,
    pub category: Option<GuestCategory>,
    pub confirmed: Option<Confirmation>,
    pub plus_ones: Option<i32>,
}

impl GuestPatch {
    pub fn confirmation(confirmed: Confirmation) -> Self {
        Self {
            confirmed: Some(confirmed),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.confirmed.is_none()
            && self.plus_ones.is_none()
    }
}

/// Request payload for adding a guest by hand.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGuestRequest {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    #[validate(length(max = 120, message = "Name must be at most 120 characters"))]
    pub name: String,

    #[serde(default)]
    pub category: GuestCategory,

    #[serde(default)]
    pub confirmed: Confirmation,

    #[serde(default)]
    #[validate(range(min = 0, max = 20, message = "Plus-ones must be between 0 and 20"))]
    pub plus_ones: i32,
}

/// Request payload for editing a guest.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGuestRequest {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    #[validate(length(max = 120, message = "Name must be at most 120 characters"))]
    pub name: Option<String>,

    pub category: Option<GuestCategory>,

    pub confirmed: Option<Confirmation>,

    #[validate(range(min = 0, max = 20, message = "Plus-ones must be between 0 and 20"))]
    pub plus_ones: Option<i32>,
}

impl From<UpdateGuestRequest> for GuestPatch {
    fn from(request: UpdateGuestRequest) -> Self {
        Self {
            name: request.name.map(|n| n.trim().to_string()),
            category: request.category,
            confirmed: request.confirmed,
            plus_ones: request.plus_ones,
        }
    }
}

/// Attendance counters for the guest list header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestTotals {
    pub total: usize,
    pub confirmed: usize,
    pub declined: usize,
    pub pending: usize,
    /// Confirmed guests plus their plus-ones.
    pub expected_headcount: i64,
}

impl GuestTotals {
    pub fn from_guests(guests: &[GuestRecord]) -> Self {
        guests.iter().fold(Self::default(), |mut totals, guest| {
            totals.total += 1;
            match guest.confirmed {
                Confirmation::Confirmed => {
                    totals.confirmed += 1;
                    totals.expected_headcount += 1 + i64::from(guest.plus_ones);
                }
                Confirmation::Declined => totals.declined += 1,
                Confirmation::Pending => totals.pending += 1,
            }
            totals
        })
    }
}

/// Response for listing guests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestListResponse {
    pub data: Vec<GuestRecord>,
    pub totals: GuestTotals,
}

impl GuestListResponse {
    pub fn new(data: Vec<GuestRecord>) -> Self {
        let totals = GuestTotals::from_guests(&data);
        Self { data, totals }
    }
}
