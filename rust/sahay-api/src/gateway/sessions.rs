//! In-memory session store for conversation and mood history.
//!
//! Sessions are keyed by UUID and hold two capped history lists. There
//! is no persistence: the store is shared state behind `AppState`, safe
//! for concurrent handlers, and idle sessions are swept on access once
//! their TTL elapses.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use uuid::Uuid;

use crate::domain::{ChatEntry, MoodRecord, ResponseResult, Role};

/// Most entries kept per history list; oldest are dropped first.
pub const HISTORY_CAP: usize = 50;

/// Most mood records returned from a history query.
pub const MOOD_QUERY_LIMIT: usize = 20;

/// Per-session conversation state.
#[derive(Debug)]
struct SessionState {
    history: VecDeque<ChatEntry>,
    moods: VecDeque<MoodRecord>,
    last_seen: Instant,
}

impl SessionState {
    fn new() -> Self {
        Self {
            history: VecDeque::new(),
            moods: VecDeque::new(),
            last_seen: Instant::now(),
        }
    }
}

/// Session-id keyed store.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionState>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create a store whose sessions expire after `ttl` of inactivity.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Return a live session id: the caller's when it still exists, a
    /// freshly allocated one otherwise.
    pub fn resolve(&self, id: Option<&str>) -> String {
        let mut sessions = self.sessions.lock();
        let ttl = self.ttl;
        sessions.retain(|_, state| state.last_seen.elapsed() < ttl);

        if let Some(id) = id {
            if let Some(state) = sessions.get_mut(id) {
                state.last_seen = Instant::now();
                return id.to_string();
            }
        }

        let id = Uuid::new_v4().to_string();
        sessions.insert(id.clone(), SessionState::new());
        id
    }

    /// Append the user/assistant exchange and its mood record, evicting
    /// the oldest entries beyond the cap.
    pub fn record_exchange(&self, id: &str, user_message: &str, result: &ResponseResult) {
        let mut sessions = self.sessions.lock();
        let Some(state) = sessions.get_mut(id) else {
            return;
        };
        state.last_seen = Instant::now();

        push_capped(
            &mut state.history,
            ChatEntry {
                role: Role::User,
                content: user_message.to_string(),
            },
        );
        push_capped(
            &mut state.history,
            ChatEntry {
                role: Role::Assistant,
                content: result.reply.clone(),
            },
        );
        push_capped(
            &mut state.moods,
            MoodRecord::now(user_message, &result.mood_analysis),
        );
    }

    /// The most recent mood records, oldest first, capped at
    /// [`MOOD_QUERY_LIMIT`]. Unknown ids yield an empty list.
    pub fn mood_history(&self, id: &str) -> Vec<MoodRecord> {
        let sessions = self.sessions.lock();
        match sessions.get(id) {
            Some(state) => {
                let skip = state.moods.len().saturating_sub(MOOD_QUERY_LIMIT);
                state.moods.iter().skip(skip).cloned().collect()
            }
            None => Vec::new(),
        }
    }

    /// The session's conversation history, oldest first.
    pub fn conversation(&self, id: &str) -> Vec<ChatEntry> {
        let sessions = self.sessions.lock();
        sessions
            .get(id)
            .map(|state| state.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Clear conversation history. Mood history is kept for continuity
    /// in tracking.
    pub fn clear_conversation(&self, id: &str) {
        if let Some(state) = self.sessions.lock().get_mut(id) {
            state.history.clear();
        }
    }
}

fn push_capped<T>(queue: &mut VecDeque<T>, value: T) {
    queue.push_back(value);
    while queue.len() > HISTORY_CAP {
        queue.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Mood, MoodAnalysis};

    fn result_with(reply: &str, intensity: u8) -> ResponseResult {
        ResponseResult {
            reply: reply.to_string(),
            mood_analysis: MoodAnalysis {
                mood: Mood::Neutral,
                intensity,
                explanation: String::new(),
            },
            is_crisis: false,
        }
    }

    fn store() -> SessionStore {
        SessionStore::new(Duration::from_secs(86400))
    }

    #[test]
    fn resolve_allocates_and_reuses_ids() {
        let store = store();
        let id = store.resolve(None);
        assert_eq!(store.resolve(Some(&id)), id);
        assert_ne!(store.resolve(Some("not-a-session")), "not-a-session");
    }

    #[test]
    fn histories_evict_oldest_beyond_cap() {
        let store = store();
        let id = store.resolve(None);

        for i in 0..60 {
            store.record_exchange(&id, &format!("message {i}"), &result_with("ok", 5));
        }

        let history = store.conversation(&id);
        assert_eq!(history.len(), HISTORY_CAP);
        // 60 exchanges x 2 entries, capped at 50: the tail survives.
        assert_eq!(history.last().unwrap().content, "ok");
        assert_eq!(history[0].content, "message 35");

        let moods = store.mood_history(&id);
        assert_eq!(moods.len(), MOOD_QUERY_LIMIT);
        assert_eq!(moods.last().unwrap().message, "message 59");
    }

    #[test]
    fn mood_history_caps_at_query_limit() {
        let store = store();
        let id = store.resolve(None);

        for i in 0..25 {
            store.record_exchange(&id, &format!("m{i}"), &result_with("r", 5));
        }

        let moods = store.mood_history(&id);
        assert_eq!(moods.len(), MOOD_QUERY_LIMIT);
        assert_eq!(moods[0].message, "m5");
    }

    #[test]
    fn clear_keeps_mood_history() {
        let store = store();
        let id = store.resolve(None);
        store.record_exchange(&id, "hello", &result_with("hi", 5));

        store.clear_conversation(&id);

        assert!(store.conversation(&id).is_empty());
        assert_eq!(store.mood_history(&id).len(), 1);
    }

    #[test]
    fn idle_sessions_are_swept() {
        let store = SessionStore::new(Duration::ZERO);
        let id = store.resolve(None);
        // TTL of zero: the next access sweeps the session away.
        assert_ne!(store.resolve(Some(&id)), id);
    }

    #[test]
    fn unknown_session_has_empty_histories() {
        let store = store();
        assert!(store.mood_history("missing").is_empty());
        assert!(store.conversation("missing").is_empty());
    }
}
