use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::models::{AssessmentSession, AssessmentStatus};

/// Exclusive handle to one session. Holding the lock is what keeps engine
/// updates for a session strictly sequential.
pub type SessionHandle = Arc<Mutex<AssessmentSession>>;

/// In-process registry of assessment sessions.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: AssessmentSession) -> SessionHandle {
        let id = session.id.clone();
        let handle = Arc::new(Mutex::new(session));
        self.inner.write().await.insert(id, handle.clone());
        handle
    }

    pub async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.inner.read().await.get(session_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Drops sessions untouched for longer than `ttl` and returns the status
    /// each evicted session had. Sessions locked by an in-flight request are
    /// left alone.
    pub async fn evict_idle(&self, ttl: Duration, now: DateTime<Utc>) -> Vec<AssessmentStatus> {
        let mut evicted = Vec::new();
        let mut sessions = self.inner.write().await;

        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) if session.updated_at + ttl < now => {
                evicted.push(session.status);
                false
            }
            _ => true,
        });

        evicted
    }
}
