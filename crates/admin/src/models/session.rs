//! Session-related types for admin authentication.
//!
//! Types stored in the server-side session. The cookie only carries the
//! session id; tokens never reach the browser.

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use fresh_shine_core::{AdminRole, AdminUser, AdminUserId, AuthSession, Email};

/// Refresh this long before the access token actually expires.
const REFRESH_MARGIN_SECONDS: i64 = 60;

/// Session-stored admin identity.
///
/// Rebuilt from the `admin_users` row on every authenticated request, so a
/// role change or row deletion takes effect immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Auth identity id (same as the `admin_users` row id).
    pub id: AdminUserId,
    /// Admin's email address.
    pub email: Email,
    /// Optional display name.
    pub full_name: Option<String>,
    /// Admin's role/permission level.
    pub role: AdminRole,
}

impl CurrentAdmin {
    /// Name to show in the header.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.email.as_str())
    }

    #[must_use]
    pub const fn can_manage_users(&self) -> bool {
        self.role.can_manage_users()
    }
}

impl From<&AdminUser> for CurrentAdmin {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
        }
    }
}

/// Backend tokens kept in the server-side session.
///
/// Stored as plain strings because the session store serializes them;
/// accessors hand them out as [`SecretString`].
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    /// Identity the tokens were issued for.
    pub user_id: AdminUserId,
    access_token: String,
    refresh_token: String,
    /// Access token expiry.
    pub expires_at: DateTime<Utc>,
}

impl SessionTokens {
    #[must_use]
    pub fn access_token(&self) -> SecretString {
        SecretString::from(self.access_token.as_str())
    }

    #[must_use]
    pub fn refresh_token(&self) -> SecretString {
        SecretString::from(self.refresh_token.as_str())
    }

    /// Whether the access token is expired or about to expire.
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now + TimeDelta::seconds(REFRESH_MARGIN_SECONDS)
    }
}

impl From<&AuthSession> for SessionTokens {
    fn from(session: &AuthSession) -> Self {
        Self {
            user_id: session.user.id,
            access_token: session.access_token.expose_secret().to_string(),
            refresh_token: session.refresh_token.expose_secret().to_string(),
            expires_at: session.expires_at,
        }
    }
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("user_id", &self.user_id)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// An authenticated admin and the token to act as them.
///
/// Produced by [`crate::middleware::RequireAdminAuth`].
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub admin: CurrentAdmin,
    pub access_token: SecretString,
}

/// Kind of one-off notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Error,
}

/// A notice carried across one redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, FlashKind::Error)
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for the backend access and refresh tokens.
    pub const TOKENS: &str = "auth_tokens";

    /// Key for a notice shown on the next rendered page.
    pub const FLASH: &str = "flash";
}
