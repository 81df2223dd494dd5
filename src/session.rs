//! Per-user admin sessions for multi-step flows.
//!
//! The only flow today is menu entry: after `/update_menu` the next text
//! message from that administrator is read as a menu. A session is keyed by
//! user id, cleared on successful ingestion or `/cancel`, and expires after
//! a fixed lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::debug;

/// What an administrator is in the middle of
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionMode {
    MenuEntry,
}

#[derive(Clone, Debug)]
pub struct AdminSession {
    pub mode: SessionMode,
    pub started_at: DateTime<Utc>,
}

impl AdminSession {
    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.started_at >= ttl
    }
}

/// Shared session table
#[derive(Clone, Debug)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<u64, AdminSession>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Put `user_id` into menu-entry mode, replacing any earlier session
    pub async fn begin_menu_entry(&self, user_id: u64) {
        self.begin_menu_entry_at(user_id, Utc::now()).await
    }

    pub async fn begin_menu_entry_at(&self, user_id: u64, now: DateTime<Utc>) {
        let session = AdminSession {
            mode: SessionMode::MenuEntry,
            started_at: now,
        };
        self.sessions.lock().await.insert(user_id, session);
        debug!(user_id, "Menu entry session started");
    }

    /// Whether the next text from `user_id` is a menu
    pub async fn awaiting_menu(&self, user_id: u64) -> bool {
        self.awaiting_menu_at(user_id, Utc::now()).await
    }

    pub async fn awaiting_menu_at(&self, user_id: u64, now: DateTime<Utc>) -> bool {
        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get(&user_id) else {
            return false;
        };
        if session.is_expired(now, self.ttl) {
            sessions.remove(&user_id);
            debug!(user_id, "Menu entry session expired");
            return false;
        }
        session.mode == SessionMode::MenuEntry
    }

    /// Drop the session, returning whether one existed
    pub async fn clear(&self, user_id: u64) -> bool {
        self.sessions.lock().await.remove(&user_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_expires() {
        let store = SessionStore::new(Duration::seconds(60));
        let start = Utc::now();
        store.begin_menu_entry_at(7, start).await;

        assert!(store.awaiting_menu_at(7, start + Duration::seconds(59)).await);
        assert!(!store.awaiting_menu_at(7, start + Duration::seconds(60)).await);
        // Expired sessions are removed, not revived
        assert!(!store.awaiting_menu_at(7, start).await);
    }

    #[tokio::test]
    async fn test_sessions_are_per_user() {
        let store = SessionStore::new(Duration::minutes(10));
        store.begin_menu_entry(1).await;
        assert!(store.awaiting_menu(1).await);
        assert!(!store.awaiting_menu(2).await);
        assert!(store.clear(1).await);
        assert!(!store.clear(1).await);
        assert!(!store.awaiting_menu(1).await);
    }
}
