//! Backend ports.
//!
//! The hosted backend owns row storage, authentication and realtime
//! delivery. These traits describe the calls the rest of the workspace makes
//! against it so flows can be exercised against an in-memory backend.

use secrecy::SecretString;

use crate::types::{
    AdminUser, AdminUserId, AuthSession, AuthUser, Email, NewAdminUser, NewQuote, Quote,
    QuoteId, QuotePatch,
};

/// Errors returned by every backend port.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Missing, expired or rejected credentials, or a row-level security denial.
    #[error("not authorized")]
    Unauthorized,

    /// The addressed row does not exist.
    #[error("not found")]
    NotFound,

    /// A unique constraint was violated (e.g. duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other non-success response.
    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be decoded.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Whether the caller's session should be considered invalid.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Result alias for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Write-only access to the `quotes` table, as used by the public booking form.
pub trait QuoteInbox: Send + Sync {
    /// Insert one quote request. The stored status is always `pending`.
    async fn submit_quote(&self, quote: &NewQuote) -> BackendResult<()>;
}

/// Admin access to the `quotes` table.
pub trait QuoteRepository: Send + Sync {
    /// All quotes, newest first.
    async fn list_quotes(&self) -> BackendResult<Vec<Quote>>;

    /// Overwrite the admin-mutable fields of one quote.
    async fn update_quote(&self, id: QuoteId, patch: &QuotePatch) -> BackendResult<()>;

    async fn delete_quote(&self, id: QuoteId) -> BackendResult<()>;
}

/// Admin access to the `admin_users` table.
pub trait AdminUserRepository: Send + Sync {
    /// All admin users, newest first.
    async fn list_admin_users(&self) -> BackendResult<Vec<AdminUser>>;

    async fn find_admin_user(&self, id: AdminUserId) -> BackendResult<Option<AdminUser>>;

    async fn insert_admin_user(&self, user: &NewAdminUser) -> BackendResult<()>;

    /// Delete the profile row only; the auth identity is left in place.
    async fn delete_admin_user(&self, id: AdminUserId) -> BackendResult<()>;
}

/// The backend's authentication service.
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> BackendResult<AuthSession>;

    /// Exchange a refresh token for a new session.
    async fn refresh_session(&self, refresh_token: &SecretString) -> BackendResult<AuthSession>;

    /// Resolve the identity behind an access token.
    async fn get_user(&self, access_token: &SecretString) -> BackendResult<AuthUser>;

    /// Revoke the session behind an access token.
    async fn sign_out(&self, access_token: &SecretString) -> BackendResult<()>;

    /// Create an identity with no confirmation step.
    async fn sign_up(&self, email: &Email, password: &SecretString) -> BackendResult<AuthUser>;
}
