//! Reconciles an accepted RSVP into the site owner's guest ledger.
//!
//! Matching is by normalized name only; it is a heuristic, not an identity
//! join. A guest the owner deleted is never brought back.

use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::{
    name_key, Confirmation, GuestCategory, GuestCreate, GuestOrigin, GuestPatch, GuestRecord,
    NewGuest,
};
use crate::stores::GuestLedger;

/// What the sync did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A new guest was created from the RSVP.
    Created(Uuid),
    /// An existing guest's confirmation changed.
    Updated(Uuid),
    /// An existing guest already had this confirmation.
    Unchanged(Uuid),
    /// The matching guest was deleted by the owner and stays deleted.
    SkippedDeleted(Uuid),
}

impl SyncOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOutcome::Created(_) => "created",
            SyncOutcome::Updated(_) => "updated",
            SyncOutcome::Unchanged(_) => "unchanged",
            SyncOutcome::SkippedDeleted(_) => "skipped_deleted",
        }
    }

    pub fn guest_id(&self) -> Uuid {
        match self {
            SyncOutcome::Created(id)
            | SyncOutcome::Updated(id)
            | SyncOutcome::Unchanged(id)
            | SyncOutcome::SkippedDeleted(id) => *id,
        }
    }
}

/// Creates or updates the owner's guest for `guest_name`.
pub async fn reconcile(
    ledger: &dyn GuestLedger,
    owner_id: Uuid,
    guest_name: &str,
    confirmed: bool,
) -> Result<SyncOutcome, StoreError> {
    let key = name_key(guest_name);
    let desired = Confirmation::from(confirmed);

    let existing = match ledger.find_by_owner_and_name(owner_id, &key).await? {
        Some(guest) => guest,
        None => {
            let new_guest = NewGuest {
                owner_id,
                name: guest_name.trim().to_string(),
                category: GuestCategory::Amigos,
                confirmed: desired,
                plus_ones: 0,
                origin: GuestOrigin::Rsvp,
            };
            match ledger.create_if_name_absent(new_guest, &key).await? {
                GuestCreate::Created(guest) => return Ok(SyncOutcome::Created(guest.id)),
                // Someone created it between the lookup and the insert.
                GuestCreate::Existing(guest) => guest,
            }
        }
    };

    apply_confirmation(ledger, owner_id, existing, desired).await
}

async fn apply_confirmation(
    ledger: &dyn GuestLedger,
    owner_id: Uuid,
    guest: GuestRecord,
    desired: Confirmation,
) -> Result<SyncOutcome, StoreError> {
    if guest.is_deleted() {
        return Ok(SyncOutcome::SkippedDeleted(guest.id));
    }
    if guest.confirmed == desired {
        return Ok(SyncOutcome::Unchanged(guest.id));
    }
    match ledger
        .update(owner_id, guest.id, &GuestPatch::confirmation(desired))
        .await?
    {
        Some(updated) => Ok(SyncOutcome::Updated(updated.id)),
        // Deleted concurrently by the owner.
        None => Ok(SyncOutcome::SkippedDeleted(guest.id)),
    }
}
