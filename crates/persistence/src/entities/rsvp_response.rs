//! RSVP response entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::RsvpResponse;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the rsvp_responses table.
#[derive(Debug, Clone, FromRow)]
pub struct RsvpResponseEntity {
    pub id: Uuid,
    pub site_id: Uuid,
    pub guest_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub confirmed: bool,
    pub message: Option<String>,
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
}

impl From<RsvpResponseEntity> for RsvpResponse {
    fn from(entity: RsvpResponseEntity) -> Self {
        Self {
            id: entity.id,
            site_id: entity.site_id,
            guest_name: entity.guest_name,
            email: entity.email,
            phone: entity.phone,
            confirmed: entity.confirmed,
            message: entity.message,
            created_at: entity.created_at,
        }
    }
}
