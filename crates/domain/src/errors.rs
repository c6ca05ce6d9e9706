//! Domain error types.

use thiserror::Error;

/// Failure reported by a content, inbox or ledger store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not complete the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness constraint was violated (e.g. slug already held).
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Failure reported by the object storage adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The object was refused (bad path, unsupported content).
    #[error("upload rejected: {0}")]
    Rejected(String),

    /// The storage backend could not be reached or written.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the site editor, public renderer and RSVP pipeline.
///
/// Messages are user-facing. Internal causes are logged where they occur.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SiteError {
    #[error("Site not found")]
    SiteNotFound,

    #[error("Could not save the site, please try again")]
    SaveFailed,

    #[error("Could not send your confirmation, please try again")]
    SubmissionFailed,

    #[error("Could not upload the photo, please try again")]
    UploadFailed,

    #[error("{0}")]
    Validation(String),

    #[error("The address '{0}' is already in use")]
    SlugTaken(String),

    #[error("This site is not accepting confirmations")]
    RsvpClosed,

    #[error("Guest not found")]
    GuestNotFound,

    /// A read failed after its retry.
    #[error("Service temporarily unavailable, please try again")]
    Unavailable,
}

impl From<validator::ValidationErrors> for SiteError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        messages.sort();
        SiteError::Validation(messages.join("; "))
    }
}
