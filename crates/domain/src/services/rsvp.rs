//! Public RSVP submission pipeline.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

use crate::errors::{SiteError, StoreError};
use crate::models::{name_key, NewRsvp, RsvpResponse, RsvpSubmission, SiteRecord};
use crate::services::guest_sync::{self, SyncOutcome};
use crate::services::retry::retry_read;
use crate::stores::{GuestLedger, RsvpInbox, SiteStore};
use shared::crypto::fingerprint;
use shared::validation::phone_digits;

/// Default window in which an identical submission is treated as a retry.
pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy)]
pub struct RsvpSettings {
    pub dedup_window: Duration,
    pub read_retry_delay: Duration,
}

impl Default for RsvpSettings {
    fn default() -> Self {
        Self {
            dedup_window: DEFAULT_DEDUP_WINDOW,
            read_retry_delay: super::retry::DEFAULT_READ_RETRY_DELAY,
        }
    }
}

/// Confirmation returned to the submitter.
#[derive(Debug, Clone, PartialEq)]
pub struct RsvpReceipt {
    pub response: RsvpResponse,
    /// The inbox already held this submission.
    pub duplicate: bool,
    pub sync: SyncOutcome,
}

#[derive(Clone)]
pub struct RsvpService {
    sites: Arc<dyn SiteStore>,
    inbox: Arc<dyn RsvpInbox>,
    ledger: Arc<dyn GuestLedger>,
    settings: RsvpSettings,
}

impl RsvpService {
    pub fn new(
        sites: Arc<dyn SiteStore>,
        inbox: Arc<dyn RsvpInbox>,
        ledger: Arc<dyn GuestLedger>,
        settings: RsvpSettings,
    ) -> Self {
        Self {
            sites,
            inbox,
            ledger,
            settings,
        }
    }

    /// Accepts a visitor's submission for `slug`.
    ///
    /// Nothing is written when the site is missing, closed, or the input is
    /// invalid. An identical submission inside the dedup window reuses the
    /// stored response and re-runs the ledger sync. A changed answer is
    /// stored as a new response and synced with the new confirmation.
    pub async fn submit(
        &self,
        slug: &str,
        submission: RsvpSubmission,
    ) -> Result<RsvpReceipt, SiteError> {
        let site = self.resolve_site(slug).await?;
        if !site.content.rsvp_enabled {
            return Err(SiteError::RsvpClosed);
        }

        let submission = submission.normalized();
        submission.validate()?;

        let rsvp = NewRsvp {
            site_id: site.id,
            fingerprint: submission_fingerprint(&site, &submission),
            guest_name: submission.guest_name,
            email: submission.email,
            phone: Some(submission.phone),
            confirmed: submission.confirmed,
            message: submission.message,
        };

        let window = chrono::Duration::from_std(self.settings.dedup_window)
            .unwrap_or_else(|_| chrono::Duration::seconds(120));
        let inserted = self
            .inbox
            .insert(rsvp, Utc::now() - window)
            .await
            .map_err(|e| submission_failed(&site, "inbox_insert", e))?;
        let duplicate = inserted.is_duplicate();
        let response = inserted.response().clone();

        let sync = guest_sync::reconcile(
            self.ledger.as_ref(),
            site.owner_id,
            &response.guest_name,
            response.confirmed,
        )
        .await
        .map_err(|e| submission_failed(&site, "guest_sync", e))?;

        tracing::info!(
            site_id = %site.id,
            response_id = %response.id,
            duplicate,
            sync = sync.as_str(),
            guest_id = %sync.guest_id(),
            "RSVP accepted"
        );

        Ok(RsvpReceipt {
            response,
            duplicate,
            sync,
        })
    }

    async fn resolve_site(&self, slug: &str) -> Result<SiteRecord, SiteError> {
        retry_read(self.settings.read_retry_delay, || self.sites.get_by_slug(slug))
            .await
            .map_err(|e| {
                tracing::error!(slug = %slug, error = %e, "RSVP site lookup failed");
                SiteError::SubmissionFailed
            })?
            .ok_or(SiteError::SiteNotFound)
    }
}

/// Dedup key over everything the guest answered. A changed answer or
/// message is a new response, not a retry.
fn submission_fingerprint(site: &SiteRecord, submission: &RsvpSubmission) -> String {
    let site_key = site.id.to_string();
    let name = name_key(&submission.guest_name);
    let digits = phone_digits(&submission.phone);
    let answer = if submission.confirmed { "yes" } else { "no" };
    fingerprint(&[
        site_key.as_str(),
        name.as_str(),
        digits.as_str(),
        answer,
        submission.message.as_deref().unwrap_or_default(),
    ])
}

fn submission_failed(site: &SiteRecord, step: &'static str, error: StoreError) -> SiteError {
    tracing::error!(site_id = %site.id, step, error = %error, "RSVP submission failed");
    SiteError::SubmissionFailed
}

/// Where a visitor's RSVP form stands.
#[derive(Debug, Clone, PartialEq)]
pub enum RsvpFormState {
    Draft,
    Submitting,
    Accepted(RsvpReceipt),
    Rejected(SiteError),
}

/// Client-side form for one public site. Input survives every transition.
#[derive(Debug, Clone)]
pub struct RsvpForm {
    slug: String,
    input: RsvpSubmission,
    state: RsvpFormState,
}

impl RsvpForm {
    pub fn new(slug: impl Into<String>) -> Self {
        Self::with_input(
            slug,
            RsvpSubmission {
                guest_name: String::new(),
                phone: String::new(),
                email: None,
                message: None,
                confirmed: true,
            },
        )
    }

    pub fn with_input(slug: impl Into<String>, input: RsvpSubmission) -> Self {
        Self {
            slug: slug.into(),
            input,
            state: RsvpFormState::Draft,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn input(&self) -> &RsvpSubmission {
        &self.input
    }

    pub fn state(&self) -> &RsvpFormState {
        &self.state
    }

    /// Field edits are allowed until the form is accepted.
    pub fn edit<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut RsvpSubmission),
    {
        match self.state {
            RsvpFormState::Draft | RsvpFormState::Rejected(_) => {
                f(&mut self.input);
                true
            }
            RsvpFormState::Submitting | RsvpFormState::Accepted(_) => false,
        }
    }

    /// Submits from `Draft` or `Rejected`. Other states are left as they are.
    pub async fn submit(&mut self, service: &RsvpService) -> &RsvpFormState {
        if !matches!(self.state, RsvpFormState::Draft | RsvpFormState::Rejected(_)) {
            return &self.state;
        }
        self.state = RsvpFormState::Submitting;
        self.state = match service.submit(&self.slug, self.input.clone()).await {
            Ok(receipt) => RsvpFormState::Accepted(receipt),
            Err(e) => RsvpFormState::Rejected(e),
        };
        &self.state
    }
}
