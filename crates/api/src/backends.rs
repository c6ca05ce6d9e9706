//! Store wiring for the configured backend.

use sqlx::PgPool;
use std::sync::Arc;

use domain::stores::{
    GuestLedger, MemoryGuestLedger, MemoryRsvpInbox, MemorySiteStore, RsvpInbox, SiteStore,
};
use persistence::repositories::{GuestRepository, RsvpRepository, SiteRepository};

/// The three stores behind the domain services.
#[derive(Clone)]
pub struct Stores {
    pub sites: Arc<dyn SiteStore>,
    pub inbox: Arc<dyn RsvpInbox>,
    pub guests: Arc<dyn GuestLedger>,
    /// Present for the postgres backend; used by health checks and pool metrics.
    pub pool: Option<PgPool>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            sites: Arc::new(SiteRepository::new(pool.clone())),
            inbox: Arc::new(RsvpRepository::new(pool.clone())),
            guests: Arc::new(GuestRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Process-local stores. Data is lost on restart.
    pub fn memory() -> Self {
        Self {
            sites: Arc::new(MemorySiteStore::new()),
            inbox: Arc::new(MemoryRsvpInbox::new()),
            guests: Arc::new(MemoryGuestLedger::new()),
            pool: None,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        if self.pool.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend() {
        let stores = Stores::memory();
        assert!(stores.pool.is_none());
        assert_eq!(stores.backend_name(), "memory");
    }
}
