//! Per-session conversation state with time-based expiry
//!
//! Sessions are created implicitly on first use of an id and removed
//! either explicitly (caller starts a new chat) or by the periodic
//! sweep once idle past the inactivity window. All mutation goes
//! through one store-wide mutex, so the sweep and concurrent request
//! handling can never interleave half-written turns.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::SessionConfig;
use crate::types::{ConversationTurn, Role, SessionStats};

/// One logical conversation thread
#[derive(Debug, Clone)]
struct Session {
    /// Ordered turns, append-only
    turns: Vec<ConversationTurn>,
    /// Instruction snapshot frozen at session creation. Never changes
    /// afterwards, even if the global template does, so the session's
    /// framing stays internally consistent.
    system_instruction: String,
    /// Last inbound activity
    last_activity: DateTime<Utc>,
}

impl Session {
    fn new(system_instruction: String, now: DateTime<Utc>) -> Self {
        Self {
            turns: Vec::new(),
            system_instruction,
            last_activity: now,
        }
    }
}

/// Session store: owns all sessions and their turns
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    inactivity_window: Duration,
    created_total: AtomicU64,
    expired_total: AtomicU64,
}

impl SessionStore {
    /// Create a store from config
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            inactivity_window: Duration::seconds(config.inactivity_window_secs as i64),
            created_total: AtomicU64::new(0),
            expired_total: AtomicU64::new(0),
        }
    }

    /// True exactly until the first exchange is recorded for this id.
    /// An id evicted and later reused is first-call again by design
    /// (fresh session, not a bug).
    pub fn is_first_call(&self, session_id: &str) -> bool {
        let sessions = self.sessions.lock();
        sessions
            .get(session_id)
            .map(|s| s.turns.is_empty())
            .unwrap_or(true)
    }

    /// Conversation history for a session, oldest first. Empty for an
    /// unknown or evicted id.
    pub fn history(&self, session_id: &str) -> Vec<ConversationTurn> {
        let sessions = self.sessions.lock();
        sessions
            .get(session_id)
            .map(|s| s.turns.clone())
            .unwrap_or_default()
    }

    /// Freeze the system instruction for a session, creating the
    /// session if needed. The snapshot only takes effect on creation;
    /// an existing session keeps its original framing.
    pub fn snapshot_system_instruction(&self, session_id: &str, instruction: &str) -> String {
        let now = Utc::now();
        let mut sessions = self.sessions.lock();
        if let Some(session) = sessions.get(session_id) {
            return session.system_instruction.clone();
        }
        self.created_total.fetch_add(1, Ordering::Relaxed);
        sessions.insert(
            session_id.to_string(),
            Session::new(instruction.to_string(), now),
        );
        instruction.to_string()
    }

    /// The frozen instruction for a session, or `default` for an
    /// unknown id.
    pub fn system_instruction(&self, session_id: &str, default: &str) -> String {
        let sessions = self.sessions.lock();
        sessions
            .get(session_id)
            .map(|s| s.system_instruction.clone())
            .unwrap_or_else(|| default.to_string())
    }

    /// Refresh a session's last-activity timestamp. Called on every
    /// inbound question before use so eviction reflects true last use.
    /// A no-op for unknown ids.
    pub fn touch(&self, session_id: &str) {
        let now = Utc::now();
        let mut sessions = self.sessions.lock();
        if let Some(session) = sessions.get_mut(session_id) {
            session.last_activity = now;
        }
    }

    /// Append a question/answer exchange as two turns under a single
    /// lock acquisition, creating the session if needed.
    pub fn append_exchange(
        &self,
        session_id: &str,
        question: &str,
        answer: &str,
        instruction_if_new: &str,
    ) {
        let now = Utc::now();
        let mut sessions = self.sessions.lock();
        if !sessions.contains_key(session_id) {
            self.created_total.fetch_add(1, Ordering::Relaxed);
            sessions.insert(
                session_id.to_string(),
                Session::new(instruction_if_new.to_string(), now),
            );
        }
        if let Some(session) = sessions.get_mut(session_id) {
            session
                .turns
                .push(ConversationTurn::new(Role::User, question, now));
            session
                .turns
                .push(ConversationTurn::new(Role::Assistant, answer, now));
            session.last_activity = now;
        }
    }

    /// Remove a session and all its state. Returns whether it existed.
    pub fn evict(&self, session_id: &str) -> bool {
        let removed = self.sessions.lock().remove(session_id).is_some();
        if removed {
            self.expired_total.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Evicted session {}", session_id);
        }
        removed
    }

    /// Sweep body: remove every session whose last activity predates
    /// the inactivity window relative to `now`. Returns how many were
    /// evicted.
    pub fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.inactivity_window;
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, s| s.last_activity >= cutoff);
        let evicted = before - sessions.len();
        if evicted > 0 {
            self.expired_total.fetch_add(evicted as u64, Ordering::Relaxed);
            tracing::info!("Session sweep evicted {} idle session(s)", evicted);
        }
        evicted
    }

    /// Store counters
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            total_sessions: self.created_total.load(Ordering::Relaxed),
            active_sessions: self.sessions.lock().len() as u64,
            expired_sessions: self.expired_total.load(Ordering::Relaxed),
        }
    }

    #[cfg(test)]
    fn backdate(&self, session_id: &str, by: Duration) {
        let mut sessions = self.sessions.lock();
        if let Some(session) = sessions.get_mut(session_id) {
            session.last_activity -= by;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(&SessionConfig::default())
    }

    #[test]
    fn first_call_is_true_exactly_until_first_exchange() {
        let store = store();
        assert!(store.is_first_call("s1"));

        store.snapshot_system_instruction("s1", "persona v1");
        assert!(store.is_first_call("s1"), "no turns yet");

        store.append_exchange("s1", "q1", "a1", "persona v1");
        assert!(!store.is_first_call("s1"));

        store.append_exchange("s1", "q2", "a2", "persona v1");
        assert!(!store.is_first_call("s1"));
    }

    #[test]
    fn history_preserves_turn_order() {
        let store = store();
        store.append_exchange("s1", "q1", "a1", "persona");
        store.append_exchange("s1", "q2", "a2", "persona");

        let history = store.history("s1");
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "q1");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, "a1");
        assert_eq!(history[2].content, "q2");
        assert_eq!(history[3].content, "a2");
    }

    #[test]
    fn instruction_snapshot_is_frozen_at_creation() {
        let store = store();
        let frozen = store.snapshot_system_instruction("s1", "persona v1");
        assert_eq!(frozen, "persona v1");

        // A later snapshot with an altered template must not change
        // the session's framing.
        let still = store.snapshot_system_instruction("s1", "persona v2");
        assert_eq!(still, "persona v1");
        assert_eq!(store.system_instruction("s1", "default"), "persona v1");
    }

    #[test]
    fn unknown_session_gets_the_default_instruction() {
        let store = store();
        assert_eq!(store.system_instruction("ghost", "default"), "default");
    }

    #[test]
    fn evicted_session_behaves_as_fresh() {
        let store = store();
        store.append_exchange("s1", "q1", "a1", "persona");
        assert!(!store.is_first_call("s1"));

        assert!(store.evict("s1"));
        assert!(store.history("s1").is_empty());
        assert!(store.is_first_call("s1"));
        assert!(!store.evict("s1"), "second evict is a no-op");
    }

    #[test]
    fn sweep_evicts_only_past_the_window() {
        let store = store();
        store.append_exchange("old", "q", "a", "persona");
        store.append_exchange("fresh", "q", "a", "persona");

        // 2 hours + a minute idle: gone. 1 hour 59 minutes: retained.
        store.backdate("old", Duration::hours(2) + Duration::minutes(1));
        store.backdate("fresh", Duration::hours(1) + Duration::minutes(59));

        let evicted = store.evict_expired(Utc::now());
        assert_eq!(evicted, 1);
        assert!(store.history("old").is_empty());
        assert_eq!(store.history("fresh").len(), 2);
    }

    #[test]
    fn touch_defers_eviction() {
        let store = store();
        store.append_exchange("s1", "q", "a", "persona");
        store.backdate("s1", Duration::hours(3));
        store.touch("s1");

        assert_eq!(store.evict_expired(Utc::now()), 0);
        assert_eq!(store.history("s1").len(), 2);
    }

    #[test]
    fn stats_track_lifecycle() {
        let store = store();
        store.append_exchange("a", "q", "a", "persona");
        store.append_exchange("b", "q", "a", "persona");
        store.evict("a");

        let stats = store.stats();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.active_sessions, 1);
        assert_eq!(stats.expired_sessions, 1);
    }
}
