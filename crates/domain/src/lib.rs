//! Domain layer for the wedding sites backend.
//!
//! This crate contains:
//! - Domain models (SiteRecord, RsvpResponse, GuestRecord)
//! - Store traits the persistence layer implements, plus in-memory stores
//! - Business logic services (slug resolution, site editor, RSVP pipeline)
//! - Domain error types

pub mod errors;
pub mod models;
pub mod services;
pub mod stores;

pub use errors::{SiteError, StorageError, StoreError};
