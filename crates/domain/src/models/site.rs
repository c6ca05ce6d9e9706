//! Wedding microsite domain models.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Maximum number of photos in a site album.
pub const MAX_ALBUM_PHOTOS: usize = 60;

/// Visual theme of a public site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SiteTheme {
    #[default]
    Classic,
    Boho,
    Modern,
}

impl SiteTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteTheme::Classic => "Classic",
            SiteTheme::Boho => "Boho",
            SiteTheme::Modern => "Modern",
        }
    }
}

impl FromStr for SiteTheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" => Ok(SiteTheme::Classic),
            "boho" => Ok(SiteTheme::Boho),
            "modern" => Ok(SiteTheme::Modern),
            _ => Err(format!("Invalid theme: {}", s)),
        }
    }
}

impl fmt::Display for SiteTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_true() -> bool {
    true
}

/// Owner-editable content of a site.
///
/// Unset text fields are empty strings, unset date/time are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SiteContent {
    #[serde(default)]
    #[validate(custom(function = "validate_optional_slug"))]
    pub slug: String,

    #[serde(default)]
    pub theme: SiteTheme,

    #[serde(default)]
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub bride_name: String,

    #[serde(default)]
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub groom_name: String,

    #[serde(default, with = "shared::datetime::optional_date")]
    pub event_date: Option<NaiveDate>,

    #[serde(default, with = "shared::datetime::optional_time")]
    pub event_time: Option<NaiveTime>,

    #[serde(default)]
    #[validate(length(max = 200, message = "Location name must be at most 200 characters"))]
    pub location_name: String,

    #[serde(default)]
    #[validate(length(max = 300, message = "Address must be at most 300 characters"))]
    pub location_address: String,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_http_url"))]
    pub location_map_url: String,

    #[serde(default)]
    #[validate(length(max = 200, message = "Headline must be at most 200 characters"))]
    pub headline: String,

    #[serde(default)]
    #[validate(length(max = 10000, message = "Story must be at most 10000 characters"))]
    pub story: String,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_media_url"))]
    pub hero_image: String,

    #[serde(default)]
    #[validate(custom(function = "validate_album"))]
    pub album: Vec<String>,

    #[serde(default = "default_true")]
    pub rsvp_enabled: bool,
}

impl Default for SiteContent {
    fn default() -> Self {
        Self {
            slug: String::new(),
            theme: SiteTheme::Classic,
            bride_name: String::new(),
            groom_name: String::new(),
            event_date: None,
            event_time: None,
            location_name: String::new(),
            location_address: String::new(),
            location_map_url: String::new(),
            headline: String::new(),
            story: String::new(),
            hero_image: String::new(),
            album: Vec::new(),
            rsvp_enabled: true,
        }
    }
}

/// Validates a slug that may still be empty (derived at save time).
pub fn validate_optional_slug(slug: &str) -> Result<(), validator::ValidationError> {
    if slug.is_empty() {
        return Ok(());
    }
    shared::validation::validate_slug(slug)
}

/// Validates album size and each photo reference.
pub fn validate_album(album: &[String]) -> Result<(), validator::ValidationError> {
    if album.len() > MAX_ALBUM_PHOTOS {
        let mut err = validator::ValidationError::new("album_size");
        err.message = Some(format!("Album holds at most {} photos", MAX_ALBUM_PHOTOS).into());
        return Err(err);
    }
    for url in album {
        if url.is_empty() {
            let mut err = validator::ValidationError::new("album_entry");
            err.message = Some("Album entries must not be empty".into());
            return Err(err);
        }
        shared::validation::validate_media_url(url)?;
    }
    Ok(())
}

/// A persisted site, one per owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[serde(flatten)]
    pub content: SiteContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SiteRecord {
    pub fn slug(&self) -> &str {
        &self.content.slug
    }
}

/// Read-only projection served to anonymous visitors.
///
/// Carries no storage or owner identifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSite {
    #[serde(flatten)]
    pub content: SiteContent,
}

impl From<SiteRecord> for PublicSite {
    fn from(record: SiteRecord) -> Self {
        Self {
            content: record.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_theme_from_str() {
        assert_eq!(SiteTheme::from_str("classic").unwrap(), SiteTheme::Classic);
        assert_eq!(SiteTheme::from_str("BOHO").unwrap(), SiteTheme::Boho);
        assert_eq!(SiteTheme::from_str("Modern").unwrap(), SiteTheme::Modern);
        assert!(SiteTheme::from_str("rustic").is_err());
    }

    #[test]
    fn test_site_theme_serializes_capitalized() {
        assert_eq!(serde_json::to_string(&SiteTheme::Boho).unwrap(), "\"Boho\"");
    }

    #[test]
    fn test_content_deserializes_with_defaults() {
        let content: SiteContent =
            serde_json::from_str(r#"{"brideName":"Ana","groomName":"João"}"#).unwrap();
        assert_eq!(content.bride_name, "Ana");
        assert_eq!(content.groom_name, "João");
        assert_eq!(content.slug, "");
        assert_eq!(content.theme, SiteTheme::Classic);
        assert!(content.rsvp_enabled);
        assert!(content.album.is_empty());
        assert!(content.event_date.is_none());
    }

    #[test]
    fn test_content_wire_names() {
        let content = SiteContent {
            bride_name: "Ana".into(),
            event_date: NaiveDate::from_ymd_opt(2025, 5, 15),
            event_time: NaiveTime::from_hms_opt(18, 0, 0),
            ..Default::default()
        };
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["brideName"], "Ana");
        assert_eq!(json["eventDate"], "2025-05-15");
        assert_eq!(json["eventTime"], "18:00");
        assert_eq!(json["locationMapUrl"], "");
        assert_eq!(json["rsvpEnabled"], true);
    }

    #[test]
    fn test_content_validation() {
        let valid = SiteContent {
            slug: "ana-e-joao".into(),
            location_map_url: "https://maps.app.goo.gl/xyz".into(),
            hero_image: "/media/owner/hero.jpg".into(),
            album: vec!["https://cdn.example.com/1.jpg".into()],
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        let empty_slug = SiteContent::default();
        assert!(empty_slug.validate().is_ok());

        let bad_slug = SiteContent {
            slug: "Ana e João".into(),
            ..Default::default()
        };
        assert!(bad_slug.validate().is_err());

        let bad_map = SiteContent {
            location_map_url: "javascript:alert(1)".into(),
            ..Default::default()
        };
        assert!(bad_map.validate().is_err());
    }

    #[test]
    fn test_validate_album() {
        assert!(validate_album(&[]).is_ok());
        assert!(validate_album(&["".to_string()]).is_err());
        let too_many = vec!["/media/a.jpg".to_string(); MAX_ALBUM_PHOTOS + 1];
        assert_eq!(validate_album(&too_many).unwrap_err().code, "album_size");
    }

    #[test]
    fn test_public_site_hides_owner() {
        let record = SiteRecord {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            content: SiteContent {
                slug: "ana-e-joao".into(),
                ..Default::default()
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(PublicSite::from(record)).unwrap();
        assert_eq!(json["slug"], "ana-e-joao");
        assert!(json.get("ownerId").is_none());
        assert!(json.get("id").is_none());
    }
}
