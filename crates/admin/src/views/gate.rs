//! Access decision for the protected dashboard.

use std::fmt::Display;

use fresh_shine_core::{AdminUserId, SessionEvent};
use serde::{Deserialize, Serialize};

/// What the protected page should do right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Session lookup still outstanding: render nothing, decide nothing.
    Wait,
    /// Render the protected content.
    Render,
    /// Send the visitor to the login page.
    RedirectToLogin,
}

/// Auth gate state.
///
/// Starts in [`AuthGate::Loading`]. A lookup result or a session event
/// resolves it; lookup failures resolve to [`AuthGate::Denied`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "user_id")]
pub enum AuthGate {
    #[default]
    Loading,
    Granted(AdminUserId),
    Denied,
}

impl AuthGate {
    #[must_use]
    pub const fn new() -> Self {
        Self::Loading
    }

    /// Fold the result of the session lookup into the gate.
    ///
    /// A failed lookup counts as "no session".
    #[must_use]
    pub fn resolve<E: Display>(self, lookup: Result<Option<AdminUserId>, E>) -> Self {
        match lookup {
            Ok(Some(user_id)) => Self::Granted(user_id),
            Ok(None) => Self::Denied,
            Err(err) => {
                tracing::warn!(error = %err, "Session lookup failed, denying access");
                Self::Denied
            }
        }
    }

    /// React to a session-change notification.
    ///
    /// Once granted, events about other identities are ignored.
    #[must_use]
    pub fn on_event(self, event: &SessionEvent) -> Self {
        if let Self::Granted(current) = self
            && current != event.user_id()
        {
            return self;
        }
        if event.has_session() {
            Self::Granted(event.user_id())
        } else {
            Self::Denied
        }
    }

    #[must_use]
    pub const fn decision(&self) -> GateDecision {
        match self {
            Self::Loading => GateDecision::Wait,
            Self::Granted(_) => GateDecision::Render,
            Self::Denied => GateDecision::RedirectToLogin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_makes_no_decision() {
        assert_eq!(AuthGate::new().decision(), GateDecision::Wait);
    }

    #[test]
    fn test_missing_or_failed_session_redirects() {
        let missing = AuthGate::new().resolve::<String>(Ok(None));
        assert_eq!(missing.decision(), GateDecision::RedirectToLogin);

        let failed = AuthGate::new().resolve(Err("connection refused"));
        assert_eq!(failed.decision(), GateDecision::RedirectToLogin);
    }

    #[test]
    fn test_session_renders_content() {
        let user_id = AdminUserId::random();
        let gate = AuthGate::new().resolve::<String>(Ok(Some(user_id)));
        assert_eq!(gate.decision(), GateDecision::Render);
        assert_eq!(gate, AuthGate::Granted(user_id));
    }

    #[test]
    fn test_events_update_decision_without_reload() {
        let user_id = AdminUserId::random();
        let gate = AuthGate::Granted(user_id);

        let refreshed = gate.on_event(&SessionEvent::TokenRefreshed { user_id });
        assert_eq!(refreshed, gate);

        let signed_out = gate.on_event(&SessionEvent::SignedOut { user_id });
        assert_eq!(signed_out.decision(), GateDecision::RedirectToLogin);

        let signed_in = signed_out.on_event(&SessionEvent::SignedIn { user_id });
        assert_eq!(signed_in.decision(), GateDecision::Render);
    }

    #[test]
    fn test_events_for_other_identities_are_ignored() {
        let user_id = AdminUserId::random();
        let other = AdminUserId::random();
        let gate = AuthGate::Granted(user_id);
        assert_eq!(
            gate.on_event(&SessionEvent::SignedOut { user_id: other }),
            gate
        );
    }

    #[test]
    fn test_event_can_resolve_loading() {
        let user_id = AdminUserId::random();
        let gate = AuthGate::new().on_event(&SessionEvent::SignedIn { user_id });
        assert_eq!(gate, AuthGate::Granted(user_id));
    }
}
