use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::Clock;

/// Pending second-stage login attempt, keyed by the intermediate token.
#[derive(Debug, Clone)]
pub struct OtpSession {
    /// SHA-256 hex digest of the issued code; the plaintext never lands here.
    pub code_hash: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

/// TTL-aware store for pending-OTP sessions.
///
/// Sessions are single-use: callers `remove` on successful verification.
/// An expired session is indistinguishable from an absent one.
#[async_trait]
pub trait OtpSessionStore: Send + Sync {
    async fn insert(&self, token: String, session: OtpSession);
    async fn get(&self, token: &str) -> Option<OtpSession>;
    async fn remove(&self, token: &str) -> Option<OtpSession>;
}

/// In-process session table. Dropped wholesale on restart, which only costs
/// in-flight login attempts a re-login.
pub struct InMemorySessionStore {
    sessions: DashMap<String, OtpSession>,
    clock: Arc<dyn Clock>,
}

impl InMemorySessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: DashMap::new(),
            clock,
        }
    }
}

#[async_trait]
impl OtpSessionStore for InMemorySessionStore {
    async fn insert(&self, token: String, session: OtpSession) {
        self.sessions.insert(token, session);
    }

    async fn get(&self, token: &str) -> Option<OtpSession> {
        let expired = match self.sessions.get(token) {
            Some(entry) => entry.expires_at <= self.clock.now(),
            None => return None,
        };
        // Expiry is checked lazily on lookup; purge rather than keep a dead
        // entry around.
        if expired {
            self.sessions.remove(token);
            return None;
        }
        self.sessions.get(token).map(|entry| entry.clone())
    }

    async fn remove(&self, token: &str) -> Option<OtpSession> {
        self.sessions.remove(token).map(|(_, session)| session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ManualClock;
    use chrono::{Duration, TimeZone, Utc};

    fn store_with_clock() -> (InMemorySessionStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ));
        (InMemorySessionStore::new(clock.clone()), clock)
    }

    fn session(clock: &ManualClock, ttl_minutes: i64) -> OtpSession {
        OtpSession {
            code_hash: "digest".to_string(),
            user_id: "u-1".to_string(),
            expires_at: clock.now() + Duration::minutes(ttl_minutes),
        }
    }

    #[tokio::test]
    async fn live_session_is_returned() {
        let (store, clock) = store_with_clock();
        store.insert("tok".to_string(), session(&clock, 10)).await;

        let found = store.get("tok").await.expect("session should be live");
        assert_eq!(found.user_id, "u-1");
    }

    #[tokio::test]
    async fn expired_session_is_absent_and_purged() {
        let (store, clock) = store_with_clock();
        store.insert("tok".to_string(), session(&clock, 10)).await;

        clock.advance(Duration::minutes(11));
        assert!(store.get("tok").await.is_none());
        // Purged, not merely hidden: rewinding the clock does not revive it.
        clock.advance(Duration::minutes(-11));
        assert!(store.get("tok").await.is_none());
    }

    #[tokio::test]
    async fn remove_consumes_the_session() {
        let (store, clock) = store_with_clock();
        store.insert("tok".to_string(), session(&clock, 10)).await;

        assert!(store.remove("tok").await.is_some());
        assert!(store.get("tok").await.is_none());
        assert!(store.remove("tok").await.is_none());
    }
}
