use std::sync::RwLock;
use tokio::sync::watch;

use crate::models::{AuthState, Session, User};

/// Current session plus the auth-state channel derived from it
///
/// Shared by auth and notes implementations so both see the same token.
pub struct SessionCell {
    session: RwLock<Option<Session>>,
    state_tx: watch::Sender<AuthState>,
}

impl SessionCell {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(AuthState::SignedOut);
        Self {
            session: RwLock::new(None),
            state_tx,
        }
    }

    pub fn get(&self) -> Option<Session> {
        self.session.read().ok().and_then(|s| s.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.get().map(|s| s.user)
    }

    pub fn access_token(&self) -> Option<String> {
        self.get().map(|s| s.access_token)
    }

    pub fn set(&self, session: Session) {
        let user = session.user.clone();
        if let Ok(mut guard) = self.session.write() {
            *guard = Some(session);
        }
        self.publish(AuthState::SignedIn(user));
    }

    pub fn clear(&self) {
        let had_session = match self.session.write() {
            Ok(mut guard) => guard.take().is_some(),
            Err(_) => false,
        };
        if had_session {
            self.publish(AuthState::SignedOut);
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    fn publish(&self, state: AuthState) {
        // send_if_modified keeps subscribers quiet when nothing changed
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }
}

impl Default for SessionCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(user_id: &str) -> Session {
        Session {
            access_token: format!("token-{}", user_id),
            refresh_token: None,
            expires_at: None,
            user: User {
                id: user_id.to_string(),
                email: None,
            },
        }
    }

    #[test]
    fn test_set_and_clear_publish_state() {
        let cell = SessionCell::new();
        let mut rx = cell.subscribe();
        assert_eq!(*rx.borrow_and_update(), AuthState::SignedOut);

        cell.set(session("u1"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().user().unwrap().id, "u1");
        assert_eq!(cell.access_token().as_deref(), Some("token-u1"));

        cell.clear();
        assert_eq!(*rx.borrow_and_update(), AuthState::SignedOut);
        assert!(cell.get().is_none());
    }

    #[test]
    fn test_clear_without_session_is_quiet() {
        let cell = SessionCell::new();
        let mut rx = cell.subscribe();
        rx.borrow_and_update();

        cell.clear();
        assert!(!rx.has_changed().unwrap());
    }
}
