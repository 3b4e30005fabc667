//! Widget sessions and their store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use uuid::Uuid;

use crate::widget::{ChatWidget, SubmissionId, SubmissionState};

/// Default session timeout (30 minutes).
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// One browser tab's chat widget.
///
/// Cloning is cheap; clones share the same widget.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Unique session identifier.
    id: String,
    /// The view-model. Never locked across an await.
    widget: Mutex<ChatWidget>,
    /// Bumped after every mutation of `widget`.
    version: watch::Sender<u64>,
    /// Last activity time.
    last_activity: RwLock<DateTime<Utc>>,
}

impl Session {
    fn new(id: String) -> Self {
        let now = Utc::now();
        let (version, _) = watch::channel(0);
        Self {
            inner: Arc::new(SessionInner {
                id,
                widget: Mutex::new(ChatWidget::new()),
                version,
                last_activity: RwLock::new(now),
            }),
        }
    }

    /// Get the session ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Read the widget.
    pub fn read<R>(&self, f: impl FnOnce(&ChatWidget) -> R) -> R {
        let guard = self
            .inner
            .widget
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Mutate the widget and notify waiters.
    pub fn update<R>(&self, f: impl FnOnce(&mut ChatWidget) -> R) -> R {
        let result = {
            let mut guard = self
                .inner
                .widget
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            f(&mut guard)
        };
        self.inner.version.send_modify(|v| *v += 1);
        self.touch();
        result
    }

    /// Wait until a submission has left `AwaitingResponse`.
    ///
    /// Returns `None` for submissions this session never began.
    pub async fn wait_until_settled(&self, id: SubmissionId) -> Option<SubmissionState> {
        let mut changes = self.inner.version.subscribe();
        loop {
            match self.read(|w| w.submission_state(id)) {
                None => return None,
                Some(SubmissionState::AwaitingResponse) => {}
                settled => return settled,
            }
            // The sender lives as long as `self`, so this never errors.
            if changes.changed().await.is_err() {
                return self.read(|w| w.submission_state(id));
            }
        }
    }

    fn touch(&self) {
        let mut guard = self
            .inner
            .last_activity
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Utc::now();
    }

    /// Check if the session has been idle longer than `timeout`.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        let last = *self
            .inner
            .last_activity
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match (Utc::now() - last).to_std() {
            Ok(idle) => idle > timeout,
            // Last activity in the future means clock skew.
            Err(_) => false,
        }
    }
}

/// Thread-safe store for sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    /// Create a new session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new session and return it.
    #[must_use]
    pub fn create(&self) -> Session {
        self.create_with_id(Uuid::new_v4().to_string())
    }

    /// Create a new session with a specific ID, replacing any existing one.
    #[must_use]
    pub fn create_with_id(&self, id: impl Into<String>) -> Session {
        let id = id.into();
        let session = Session::new(id.clone());
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.insert(id, session.clone());
        session
    }

    /// Get a session by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Session> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(id).cloned()
    }

    /// Get a session by ID, creating it if it doesn't exist.
    #[must_use]
    pub fn get_or_create(&self, id: &str) -> Session {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard
            .entry(id.to_string())
            .or_insert_with(|| Session::new(id.to_string()))
            .clone()
    }

    /// Remove a session by ID.
    pub fn remove(&self, id: &str) -> Option<Session> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.remove(id)
    }

    /// Get the number of active sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if there are no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove sessions that have been inactive longer than the timeout.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|_, session| !session.is_expired_with_timeout(timeout));
        before - guard.len()
    }
}
