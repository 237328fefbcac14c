use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::{sync::RwLock, task::JoinHandle};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    services::{RecommendationSource, Wizard},
};

/// Sessions untouched for longer than this are evicted unless configured otherwise
pub const DEFAULT_SESSION_IDLE_SECS: i64 = 30 * 60;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<RwLock<AppStateInner>>,
    pub recommender: Arc<dyn RecommendationSource>,
    pub session_idle_timeout: Duration,
}

/// Inner state that can be modified
#[derive(Default)]
pub struct AppStateInner {
    /// One wizard view-model per UI session
    pub sessions: HashMap<Uuid, Session>,
}

/// A wizard together with the last time a request touched it
pub struct Session {
    pub wizard: Wizard,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    pub fn new(wizard: Wizard) -> Self {
        Self {
            wizard,
            last_seen: Utc::now(),
        }
    }
}

impl AppStateInner {
    /// Drops every session idle for longer than `timeout` at `now`
    pub fn evict_idle(&mut self, now: DateTime<Utc>, timeout: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| now.signed_duration_since(session.last_seen) <= timeout);
        before - self.sessions.len()
    }
}

impl AppState {
    /// Creates an application state with no sessions
    pub fn new(recommender: Arc<dyn RecommendationSource>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(AppStateInner::default())),
            recommender,
            session_idle_timeout: Duration::seconds(DEFAULT_SESSION_IDLE_SECS),
        }
    }

    pub fn with_session_idle_timeout(mut self, timeout: Duration) -> Self {
        self.session_idle_timeout = timeout;
        self
    }

    /// Runs `f` against a session under the write lock and marks it as seen
    pub async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Wizard) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut inner = self.inner.write().await;
        let session = inner
            .sessions
            .get_mut(&id)
            .ok_or_else(|| session_not_found(id))?;
        session.last_seen = Utc::now();
        f(&mut session.wizard)
    }

    /// Evicts idle sessions, returning how many were dropped
    pub async fn evict_idle_sessions(&self) -> usize {
        let evicted = self
            .inner
            .write()
            .await
            .evict_idle(Utc::now(), self.session_idle_timeout);
        if evicted > 0 {
            tracing::info!(evicted, "Evicted idle sessions");
        }
        evicted
    }

    /// Spawns a task that evicts idle sessions every `period`
    pub fn spawn_session_sweeper(&self, period: std::time::Duration) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                state.evict_idle_sessions().await;
            }
        })
    }
}

pub fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {} not found", id))
}
