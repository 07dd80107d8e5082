//! In-memory wizard sessions.
//!
//! A session holds one `RsvpWorkflow`. Nothing is persisted: a session
//! lives until it is idle longer than the configured TTL.

use domain::services::RsvpWorkflow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Too many active RSVP sessions, please try again shortly")]
    Full,
}

/// One guest's workflow.
///
/// The workflow lock is held for the whole of an operation, including the
/// submission await, so requests on one session are serialized.
pub struct Session {
    workflow: AsyncMutex<RsvpWorkflow>,
    last_seen: Mutex<Instant>,
}

impl Session {
    fn new() -> Self {
        Self {
            workflow: AsyncMutex::new(RsvpWorkflow::new()),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    pub async fn workflow(&self) -> tokio::sync::MutexGuard<'_, RsvpWorkflow> {
        self.workflow.lock().await
    }

    fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }

    fn is_busy(&self) -> bool {
        self.workflow.try_lock().is_err()
    }
}

pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Arc<Session>>>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
            max_sessions,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Arc<Session>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a new session at lookup.
    pub fn create(&self) -> Result<(Uuid, Arc<Session>), SessionError> {
        let mut sessions = self.lock();
        if sessions.len() >= self.max_sessions {
            return Err(SessionError::Full);
        }
        let id = Uuid::new_v4();
        let session = Arc::new(Session::new());
        sessions.insert(id, Arc::clone(&session));
        Ok((id, session))
    }

    /// Looks up a session and marks it as active.
    pub fn get(&self, id: Uuid) -> Option<Arc<Session>> {
        let session = self.lock().get(&id).cloned()?;
        session.touch();
        Some(session)
    }

    /// Removes sessions idle for at least the TTL. A session whose workflow
    /// is locked by an in-flight request is kept. Returns the number removed.
    pub fn evict_expired(&self) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| session.is_busy() || session.idle_for() < self.ttl);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get() {
        let store = SessionStore::new(Duration::from_secs(3600), 10);
        let (id, _) = store.create().unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.get(id).is_some());
        assert!(store.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_capacity() {
        let store = SessionStore::new(Duration::from_secs(3600), 2);
        store.create().unwrap();
        store.create().unwrap();
        assert_eq!(store.create().err(), Some(SessionError::Full));
    }

    #[test]
    fn test_fresh_sessions_survive_eviction() {
        let store = SessionStore::new(Duration::from_secs(3600), 10);
        store.create().unwrap();
        assert_eq!(store.evict_expired(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_idle_sessions_are_evicted() {
        let store = SessionStore::new(Duration::ZERO, 10);
        let (id, _) = store.create().unwrap();
        store.create().unwrap();

        assert_eq!(store.evict_expired(), 2);
        assert!(store.is_empty());
        assert!(store.get(id).is_none());
    }

    #[tokio::test]
    async fn test_busy_session_is_kept() {
        let store = SessionStore::new(Duration::ZERO, 10);
        let (id, session) = store.create().unwrap();

        let guard = session.workflow().await;
        assert_eq!(store.evict_expired(), 0);
        drop(guard);

        assert_eq!(store.evict_expired(), 1);
        assert!(store.get(id).is_none());
    }
}
