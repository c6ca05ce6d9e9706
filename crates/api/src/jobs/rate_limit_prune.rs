//! Forgets clients of the RSVP rate limiter whose quota has replenished.

use std::sync::Arc;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::RateLimiterState;

pub struct RateLimitPruneJob {
    limiter: Arc<RateLimiterState>,
}

impl RateLimitPruneJob {
    pub fn new(limiter: Arc<RateLimiterState>) -> Self {
        Self { limiter }
    }
}

#[async_trait::async_trait]
impl Job for RateLimitPruneJob {
    fn name(&self) -> &'static str {
        "rate_limit_prune"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(5)
    }

    async fn execute(&self) -> Result<(), String> {
        let before = self.limiter.tracked_clients();
        self.limiter.prune();
        tracing::debug!(
            before,
            after = self.limiter.tracked_clients(),
            "Pruned rate limiter state"
        );
        Ok(())
    }
}
