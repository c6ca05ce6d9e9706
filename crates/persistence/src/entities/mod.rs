//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod guest;
pub mod rsvp_response;
pub mod site;

pub use guest::{GuestCategoryDb, GuestEntity, GuestOriginDb};
pub use rsvp_response::RsvpResponseEntity;
pub use site::{SiteEntity, SiteThemeDb};
