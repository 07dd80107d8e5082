//! Background job that expires idle RSVP sessions.

use std::sync::Arc;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::{record_active_sessions, RateLimiterState};
use crate::services::SessionStore;

/// Drops idle wizard sessions and forgets quiet rate-limit clients.
pub struct SessionCleanupJob {
    sessions: Arc<SessionStore>,
    rate_limiter: Option<Arc<RateLimiterState>>,
}

impl SessionCleanupJob {
    pub fn new(sessions: Arc<SessionStore>, rate_limiter: Option<Arc<RateLimiterState>>) -> Self {
        Self {
            sessions,
            rate_limiter,
        }
    }
}

#[async_trait::async_trait]
impl Job for SessionCleanupJob {
    fn name(&self) -> &'static str {
        "session_cleanup"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(1)
    }

    async fn execute(&self) -> Result<(), String> {
        let evicted = self.sessions.evict_expired();
        if evicted > 0 {
            tracing::info!(evicted, "Expired idle RSVP sessions");
        }
        record_active_sessions(self.sessions.len());

        if let Some(limiter) = &self.rate_limiter {
            limiter.prune();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    #[tokio::test]
    async fn test_evicts_idle_sessions() {
        let sessions = Arc::new(SessionStore::new(Duration::ZERO, 10));
        sessions.create().unwrap();
        sessions.create().unwrap();

        let job = SessionCleanupJob::new(Arc::clone(&sessions), None);
        assert!(job.execute().await.is_ok());
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn test_keeps_active_sessions() {
        let sessions = Arc::new(SessionStore::new(Duration::from_secs(3600), 10));
        sessions.create().unwrap();

        let job = SessionCleanupJob::new(Arc::clone(&sessions), None);
        job.execute().await.unwrap();
        assert_eq!(sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_prunes_rate_limiter() {
        let sessions = Arc::new(SessionStore::new(Duration::from_secs(3600), 10));
        let limiter = Arc::new(RateLimiterState::new(60));
        limiter
            .check(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)))
            .unwrap();

        let job = SessionCleanupJob::new(sessions, Some(Arc::clone(&limiter)));
        assert!(job.execute().await.is_ok());
    }

    #[test]
    fn test_metadata() {
        let sessions = Arc::new(SessionStore::new(Duration::from_secs(60), 1));
        let job = SessionCleanupJob::new(sessions, None);
        assert_eq!(job.name(), "session_cleanup");
        assert_eq!(job.frequency(), JobFrequency::Minutes(1));
    }
}
