//! Database metrics collection.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record database query duration.
pub fn record_query_duration(query_name: &str, duration_secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "query" => query_name.to_string()
    )
    .record(duration_secs);
}

/// Record database connection pool metrics.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times a database operation and records it on completion.
///
/// ```ignore
/// let timer = QueryTimer::new("find_site_by_slug");
/// let result = sqlx::query_as::<_, SiteEntity>(...).fetch_optional(&pool).await;
/// timer.record_result(&result);
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_query_duration(self.query_name, duration);
    }

    /// Record the duration, counting the query as failed on `Err`.
    pub fn record_result<T>(self, result: &Result<T, sqlx::Error>) {
        if let Err(e) = result {
            tracing::warn!(query = self.query_name, error = %e, "Database query failed");
            counter!(
                "database_query_errors_total",
                "query" => self.query_name
            )
            .increment(1);
        }
        self.record();
    }
}
