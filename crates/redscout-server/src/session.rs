//! In-memory dashboard sessions.
//!
//! A session is created by a successful password login and lives only as
//! long as the process. Linking a Reddit account attaches a refresh token
//! and username; any later authentication failure clears the whole session
//! and sends the user back to login.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

/// Reddit credentials attached to a logged-in session.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub refresh_token: String,
    pub username: String,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub reddit: Option<RedditCredentials>,
    /// Pending OAuth `state` value, set when an authorize URL is issued and
    /// consumed by the callback.
    pub oauth_state: Option<String>,
}

/// Token-keyed session map shared across handlers.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, Session>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh session and returns its bearer token.
    pub fn create(&self) -> String {
        let token = Uuid::new_v4().to_string();
        self.lock().insert(token.clone(), Session::default());
        token
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.lock().contains_key(token)
    }

    #[must_use]
    pub fn get(&self, token: &str) -> Option<Session> {
        self.lock().get(token).cloned()
    }

    /// Records a pending OAuth `state` for the session. Returns false if the
    /// session no longer exists.
    pub fn set_oauth_state(&self, token: &str, state: &str) -> bool {
        let mut sessions = self.lock();
        match sessions.get_mut(token) {
            Some(session) => {
                session.oauth_state = Some(state.to_string());
                true
            }
            None => false,
        }
    }

    /// Finds the session holding this pending OAuth `state`, consuming the
    /// state so a callback cannot be replayed.
    #[must_use]
    pub fn take_token_for_state(&self, state: &str) -> Option<String> {
        let mut sessions = self.lock();
        let token = sessions
            .iter()
            .find(|(_, s)| s.oauth_state.as_deref() == Some(state))
            .map(|(t, _)| t.clone())?;
        if let Some(session) = sessions.get_mut(&token) {
            session.oauth_state = None;
        }
        Some(token)
    }

    /// Attaches Reddit credentials to a session. Returns false if the
    /// session no longer exists.
    pub fn attach_reddit(&self, token: &str, credentials: RedditCredentials) -> bool {
        let mut sessions = self.lock();
        match sessions.get_mut(token) {
            Some(session) => {
                session.reddit = Some(credentials);
                true
            }
            None => false,
        }
    }

    /// Drops the session entirely. Used by logout and by every
    /// authentication failure.
    pub fn remove(&self, token: &str) {
        self.lock().remove(token);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        self.inner.lock().expect("session lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_session_is_found_and_starts_unlinked() {
        let store = SessionStore::new();
        let token = store.create();
        assert!(store.contains(&token));
        assert!(store.get(&token).expect("session").reddit.is_none());
    }

    #[test]
    fn oauth_state_maps_back_to_its_session_once() {
        let store = SessionStore::new();
        let token = store.create();
        assert!(store.set_oauth_state(&token, "state-abc"));

        assert_eq!(store.take_token_for_state("state-abc"), Some(token));
        assert_eq!(store.take_token_for_state("state-abc"), None);
    }

    #[test]
    fn attach_reddit_links_the_account() {
        let store = SessionStore::new();
        let token = store.create();
        assert!(store.attach_reddit(
            &token,
            RedditCredentials {
                refresh_token: "refresh".to_string(),
                username: "scout".to_string(),
            }
        ));
        let session = store.get(&token).expect("session");
        assert_eq!(session.reddit.expect("linked").username, "scout");
    }

    #[test]
    fn remove_invalidates_the_token() {
        let store = SessionStore::new();
        let token = store.create();
        store.remove(&token);
        assert!(!store.contains(&token));
        assert!(!store.attach_reddit(
            &token,
            RedditCredentials {
                refresh_token: "refresh".to_string(),
                username: "scout".to_string(),
            }
        ));
    }
}
