//! Session state with an explicit lifecycle.
//!
//! The original client read the signed-in user from an ambient context;
//! here the [`SessionContext`] is an ordinary value owned by
//! [`AppState`](crate::AppState): created at startup, updated by the auth
//! commands, torn down on sign-out.  Interested views subscribe to its
//! event stream instead of polling a global.

use tokio::sync::broadcast;

use kirala_shared::UserId;

/// The authenticated identity, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl Session {
    /// Name shown on messages: display name, or the email local part, or
    /// the bare id.
    pub fn visible_name(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        if let Some(email) = self.email.as_deref() {
            if let Some((local, _)) = email.split_once('@') {
                return local.to_string();
            }
        }
        self.user_id.to_string()
    }
}

/// Where the client currently stands with the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    SignedOut,
    /// Browsing without an account; most writes are refused.
    Guest,
    SignedIn(Session),
}

/// Session transition, broadcast to interested views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut,
    ContinuedAsGuest,
}

/// Owner of the session state and its event stream.
#[derive(Debug)]
pub struct SessionContext {
    state: SessionState,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionContext {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            state: SessionState::SignedOut,
            events,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The signed-in session, if any (guests get `None`).
    pub fn current(&self) -> Option<&Session> {
        match &self.state {
            SessionState::SignedIn(session) => Some(session),
            _ => None,
        }
    }

    /// Subscribe to session transitions.  Dropping the receiver
    /// unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn signed_in(&mut self, session: Session) {
        tracing::info!(user = %session.user_id, "session established");
        self.state = SessionState::SignedIn(session.clone());
        let _ = self.events.send(SessionEvent::SignedIn(session));
    }

    pub(crate) fn continued_as_guest(&mut self) {
        self.state = SessionState::Guest;
        let _ = self.events.send(SessionEvent::ContinuedAsGuest);
    }

    pub(crate) fn signed_out(&mut self) {
        tracing::info!("session torn down");
        self.state = SessionState::SignedOut;
        let _ = self.events.send(SessionEvent::SignedOut);
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str) -> Session {
        Session {
            user_id: UserId::from(id),
            email: Some("ayse.kaya@example.com".to_string()),
            phone: None,
            display_name: None,
            photo_url: None,
        }
    }

    #[test]
    fn visible_name_falls_back_to_email_local_part() {
        let mut s = session("uid-1");
        assert_eq!(s.visible_name(), "ayse.kaya");

        s.display_name = Some("Ayşe".to_string());
        assert_eq!(s.visible_name(), "Ayşe");

        s.display_name = None;
        s.email = None;
        assert_eq!(s.visible_name(), "uid-1");
    }

    #[tokio::test]
    async fn transitions_are_broadcast() {
        let mut ctx = SessionContext::new();
        let mut rx = ctx.subscribe();

        ctx.signed_in(session("uid-1"));
        assert!(matches!(rx.recv().await.unwrap(), SessionEvent::SignedIn(_)));
        assert!(ctx.current().is_some());

        ctx.signed_out();
        assert_eq!(rx.recv().await.unwrap(), SessionEvent::SignedOut);
        assert_eq!(ctx.state(), &SessionState::SignedOut);
        assert!(ctx.current().is_none());
    }
}
