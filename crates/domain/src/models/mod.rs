//! Domain models for the wedding sites backend.

pub mod guest;
pub mod rsvp;
pub mod site;

pub use guest::{
    name_key, Confirmation, CreateGuestRequest, GuestCategory, GuestCreate, GuestListResponse, GuestOrigin,
    GuestPatch, GuestRecord, GuestTotals, NewGuest, UpdateGuestRequest,
};
pub use rsvp::{InboxInsert, NewRsvp, RsvpResponse, RsvpSubmission};
pub use site::{PublicSite, SiteContent, SiteRecord, SiteTheme};
