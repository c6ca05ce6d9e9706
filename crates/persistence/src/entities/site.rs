//! Wedding site entity (database row mapping).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use domain::models::{SiteContent, SiteRecord, SiteTheme};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for site themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "site_theme", rename_all = "lowercase")]
pub enum SiteThemeDb {
    Classic,
    Boho,
    Modern,
}

impl From<SiteThemeDb> for SiteTheme {
    fn from(theme: SiteThemeDb) -> Self {
        match theme {
            SiteThemeDb::Classic => SiteTheme::Classic,
            SiteThemeDb::Boho => SiteTheme::Boho,
            SiteThemeDb::Modern => SiteTheme::Modern,
        }
    }
}

impl From<SiteTheme> for SiteThemeDb {
    fn from(theme: SiteTheme) -> Self {
        match theme {
            SiteTheme::Classic => SiteThemeDb::Classic,
            SiteTheme::Boho => SiteThemeDb::Boho,
            SiteTheme::Modern => SiteThemeDb::Modern,
        }
    }
}

/// Database row mapping for the wedding_sites table.
#[derive(Debug, Clone, FromRow)]
pub struct SiteEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub slug: String,
    pub theme: SiteThemeDb,
    pub bride_name: String,
    pub groom_name: String,
    pub event_date: Option<NaiveDate>,
    pub event_time: Option<NaiveTime>,
    pub location_name: String,
    pub location_address: String,
    pub location_map_url: String,
    pub headline: String,
    pub story: String,
    pub hero_image: String,
    pub album: Vec<String>,
    pub rsvp_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SiteEntity> for SiteRecord {
    fn from(entity: SiteEntity) -> Self {
        Self {
            id: entity.id,
            owner_id: entity.owner_id,
            content: SiteContent {
                slug: entity.slug,
                theme: entity.theme.into(),
                bride_name: entity.bride_name,
                groom_name: entity.groom_name,
                event_date: entity.event_date,
                event_time: entity.event_time,
                location_name: entity.location_name,
                location_address: entity.location_address,
                location_map_url: entity.location_map_url,
                headline: entity.headline,
                story: entity.story,
                hero_image: entity.hero_image,
                album: entity.album,
                rsvp_enabled: entity.rsvp_enabled,
            },
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
