//! Domain services for the wedding sites backend.
//!
//! Services contain business logic that operates on domain models through
//! the store traits.

pub mod editor;
pub mod guest_sync;
pub mod retry;
pub mod routing;
pub mod rsvp;
pub mod site;
pub mod slug;

pub use editor::{EditorActivity, PhotoSlot, PhotoUpload, PublicLink, SiteEditor};
pub use guest_sync::SyncOutcome;
pub use routing::{resolve, Route};
pub use rsvp::{RsvpForm, RsvpFormState, RsvpReceipt, RsvpService, RsvpSettings};
pub use site::{SaveMode, SiteService};
