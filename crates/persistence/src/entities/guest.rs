//! Guest ledger entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Confirmation, GuestCategory, GuestOrigin, GuestRecord};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for guest categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "guest_category", rename_all = "lowercase")]
pub enum GuestCategoryDb {
    Familia,
    Amigos,
    Trabalho,
}

impl From<GuestCategoryDb> for GuestCategory {
    fn from(category: GuestCategoryDb) -> Self {
        match category {
            GuestCategoryDb::Familia => GuestCategory::Familia,
            GuestCategoryDb::Amigos => GuestCategory::Amigos,
            GuestCategoryDb::Trabalho => GuestCategory::Trabalho,
        }
    }
}

impl From<GuestCategory> for GuestCategoryDb {
    fn from(category: GuestCategory) -> Self {
        match category {
            GuestCategory::Familia => GuestCategoryDb::Familia,
            GuestCategory::Amigos => GuestCategoryDb::Amigos,
            GuestCategory::Trabalho => GuestCategoryDb::Trabalho,
        }
    }
}

/// Database enum for how a guest entered the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "guest_origin", rename_all = "lowercase")]
pub enum GuestOriginDb {
    Manual,
    Rsvp,
}

impl From<GuestOriginDb> for GuestOrigin {
    fn from(origin: GuestOriginDb) -> Self {
        match origin {
            GuestOriginDb::Manual => GuestOrigin::Manual,
            GuestOriginDb::Rsvp => GuestOrigin::Rsvp,
        }
    }
}

impl From<GuestOrigin> for GuestOriginDb {
    fn from(origin: GuestOrigin) -> Self {
        match origin {
            GuestOrigin::Manual => GuestOriginDb::Manual,
            GuestOrigin::Rsvp => GuestOriginDb::Rsvp,
        }
    }
}

/// Database row mapping for the guests table.
///
/// `confirmed` is tri-state: NULL means pending.
#[derive(Debug, Clone, FromRow)]
pub struct GuestEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub name_key: String,
    pub category: GuestCategoryDb,
    pub confirmed: Option<bool>,
    pub plus_ones: i32,
    pub origin: GuestOriginDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<GuestEntity> for GuestRecord {
    fn from(entity: GuestEntity) -> Self {
        Self {
            id: entity.id,
            owner_id: entity.owner_id,
            name: entity.name,
            category: entity.category.into(),
            confirmed: Confirmation::from(entity.confirmed),
            plus_ones: entity.plus_ones,
            origin: entity.origin.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: entity.deleted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(confirmed: Option<bool>) -> GuestEntity {
        let now = Utc::now();
        GuestEntity {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Maria Souza".into(),
            name_key: "maria souza".into(),
            category: GuestCategoryDb::Trabalho,
            confirmed,
            plus_ones: 1,
            origin: GuestOriginDb::Rsvp,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_null_confirmation_is_pending() {
        let record = GuestRecord::from(entity(None));
        assert_eq!(record.confirmed, Confirmation::Pending);
        assert_eq!(record.category, GuestCategory::Trabalho);
        assert_eq!(record.origin, GuestOrigin::Rsvp);
        assert!(!record.is_deleted());
    }

    #[test]
    fn test_boolean_confirmation_maps() {
        assert_eq!(
            GuestRecord::from(entity(Some(true))).confirmed,
            Confirmation::Confirmed
        );
        assert_eq!(
            GuestRecord::from(entity(Some(false))).confirmed,
            Confirmation::Declined
        );
    }

    #[test]
    fn test_category_round_trip() {
        for category in [
            GuestCategory::Familia,
            GuestCategory::Amigos,
            GuestCategory::Trabalho,
        ] {
            assert_eq!(GuestCategory::from(GuestCategoryDb::from(category)), category);
        }
    }
}
