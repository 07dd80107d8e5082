//! Database metrics: query timings and pool gauges.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record one query's duration, labelled by query name and outcome.
pub fn record_query_duration(query: &'static str, outcome: &'static str, duration_secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "query" => query,
        "outcome" => outcome
    )
    .record(duration_secs);
}

/// Record connection pool gauges. Called periodically by the pool metrics job.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times a repository query.
///
/// ```ignore
/// let timer = QueryTimer::new("search_guests_by_name");
/// let result = sqlx::query_as::<_, GuestSearchRowEntity>(...).fetch_all(&pool).await;
/// timer.finish(&result);
/// result
/// ```
pub struct QueryTimer {
    query: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            start: Instant::now(),
        }
    }

    /// Records the elapsed time; failures also bump `database_query_errors_total`.
    pub fn finish<T>(self, result: &Result<T, sqlx::Error>) {
        let outcome = if result.is_ok() { "ok" } else { "error" };
        if result.is_err() {
            counter!("database_query_errors_total", "query" => self.query).increment(1);
        }
        record_query_duration(self.query, outcome, self.start.elapsed().as_secs_f64());
    }
}
