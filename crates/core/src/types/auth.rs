//! Authentication session types.
//!
//! Tokens are held as [`SecretString`] so they never appear in logs or
//! `Debug` output.

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{AdminUserId, Email};

/// The identity behind a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: AdminUserId,
    pub email: Email,
}

/// A signed-in session issued by the auth service.
#[derive(Debug)]
pub struct AuthSession {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl AuthSession {
    /// Whether the access token has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether the access token expires within `window` of `now`.
    #[must_use]
    pub fn expires_within(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        self.expires_at <= now + window
    }
}

impl Clone for AuthSession {
    fn clone(&self) -> Self {
        Self {
            access_token: SecretString::from(self.access_token.expose_secret()),
            refresh_token: SecretString::from(self.refresh_token.expose_secret()),
            expires_at: self.expires_at,
            user: self.user.clone(),
        }
    }
}

/// A change to an identity's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    SignedIn { user_id: AdminUserId },
    SignedOut { user_id: AdminUserId },
    TokenRefreshed { user_id: AdminUserId },
}

impl SessionEvent {
    /// The identity this event concerns.
    #[must_use]
    pub const fn user_id(&self) -> AdminUserId {
        match self {
            Self::SignedIn { user_id }
            | Self::SignedOut { user_id }
            | Self::TokenRefreshed { user_id } => *user_id,
        }
    }

    /// Whether the identity still holds a session after this event.
    #[must_use]
    pub const fn has_session(&self) -> bool {
        !matches!(self, Self::SignedOut { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn session(expires_at: DateTime<Utc>) -> AuthSession {
        AuthSession {
            access_token: SecretString::from("access"),
            refresh_token: SecretString::from("refresh"),
            expires_at,
            user: AuthUser {
                id: AdminUserId::random(),
                email: Email::parse("ops@freshshine.co.uk").unwrap(),
            },
        }
    }

    #[test]
    fn test_expiry_helpers() {
        let now = Utc::now();
        let live = session(now + TimeDelta::minutes(30));
        assert!(!live.is_expired(now));
        assert!(!live.expires_within(now, TimeDelta::minutes(5)));
        assert!(live.expires_within(now, TimeDelta::hours(1)));

        let stale = session(now - TimeDelta::seconds(1));
        assert!(stale.is_expired(now));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let debug = format!("{:?}", session(Utc::now()));
        assert!(!debug.contains("access\""));
        assert!(!debug.contains("refresh\""));
    }

    #[test]
    fn test_clone_keeps_tokens() {
        let original = session(Utc::now());
        let copy = original.clone();
        assert_eq!(copy.access_token.expose_secret(), "access");
        assert_eq!(copy.user, original.user);
    }

    #[test]
    fn test_session_event_wire_format() {
        let user_id = AdminUserId::random();
        let event = SessionEvent::SignedOut { user_id };
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["event"], "signed_out");
        assert_eq!(event.user_id(), user_id);
        assert!(!event.has_session());
        assert!(SessionEvent::TokenRefreshed { user_id }.has_session());
    }
}
