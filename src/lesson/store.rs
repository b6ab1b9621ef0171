//! In-memory store of generated sessions, keyed by id with a TTL.
//!
//! A session is created on generation, read on download and evicted once it
//! is older than the TTL (lazily on read, or by [`SessionStore::purge_expired`]).

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::lesson::request::SessionForm;
use crate::lesson::session::LessonSession;

/// Identifier handed back to the client after generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        SessionId(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(SessionId)
    }
}

/// A generated session together with the form that produced it.
#[derive(Debug, Clone)]
pub struct StoredSession {
    pub form: SessionForm,
    pub session: LessonSession,
    pub created_at: DateTime<Utc>,
}

/// Concurrent session store. Cloning shares the same underlying map.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<SessionId, Arc<StoredSession>>>,
    latest: Arc<RwLock<Option<SessionId>>>,
    ttl: chrono::Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            latest: Arc::new(RwLock::new(None)),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Store a freshly generated session and make it the latest one.
    pub fn insert(&self, form: SessionForm, session: LessonSession) -> SessionId {
        self.insert_at(form, session, Utc::now())
    }

    fn insert_at(
        &self,
        form: SessionForm,
        session: LessonSession,
        created_at: DateTime<Utc>,
    ) -> SessionId {
        let id = SessionId::new();
        self.sessions.insert(
            id,
            Arc::new(StoredSession {
                form,
                session,
                created_at,
            }),
        );
        if let Ok(mut latest) = self.latest.write() {
            *latest = Some(id);
        }
        debug!(session_id = %id, "Stored generated session");
        id
    }

    /// Look up a session, evicting it if it has expired.
    pub fn get(&self, id: &SessionId) -> Option<Arc<StoredSession>> {
        self.get_at(id, Utc::now())
    }

    fn get_at(&self, id: &SessionId, now: DateTime<Utc>) -> Option<Arc<StoredSession>> {
        let stored = self.sessions.get(id).map(|entry| entry.value().clone())?;
        if self.is_expired(&stored, now) {
            self.sessions.remove(id);
            debug!(session_id = %id, "Evicted expired session on read");
            return None;
        }
        Some(stored)
    }

    /// The most recently generated session, if it is still alive.
    pub fn latest(&self) -> Option<(SessionId, Arc<StoredSession>)> {
        self.latest_at(Utc::now())
    }

    fn latest_at(&self, now: DateTime<Utc>) -> Option<(SessionId, Arc<StoredSession>)> {
        let id = (*self.latest.read().ok()?)?;
        self.get_at(&id, now).map(|stored| (id, stored))
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, stored| !self.is_expired(stored, now));
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn is_expired(&self, stored: &StoredSession, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(stored.created_at) > self.ttl
    }
}
