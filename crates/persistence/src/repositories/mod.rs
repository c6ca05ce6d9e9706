//! Repository implementations for database operations.
//!
//! Each repository exposes inherent query methods returning `sqlx::Error` and
//! implements the matching domain store trait on top of them.

pub mod guest;
pub mod rsvp;
pub mod site;

use domain::StoreError;

pub use guest::GuestRepository;
pub use rsvp::RsvpRepository;
pub use site::SiteRepository;

/// PostgreSQL SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Maps a database error onto the domain store error.
pub(crate) fn store_err(error: sqlx::Error) -> StoreError {
    match &error {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::Conflict(db.message().to_string())
        }
        _ => StoreError::Unavailable(error.to_string()),
    }
}
