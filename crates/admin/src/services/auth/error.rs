//! Admin authentication error types.

use fresh_shine_core::BackendError;
use thiserror::Error;

/// Errors that can occur during admin authentication operations.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Unknown email, wrong password or malformed email.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Signed in, but there is no `admin_users` row for the identity.
    #[error("Unauthorized access")]
    NotAnAdmin,

    /// The refresh token was rejected.
    #[error("session refresh failed: {0}")]
    RefreshFailed(#[source] BackendError),

    /// Backend call failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

impl AdminAuthError {
    /// Whether the stored session is dead and should be cleared.
    ///
    /// Transport failures leave it in place so a retry can succeed.
    #[must_use]
    pub const fn ends_session(&self) -> bool {
        match self {
            Self::NotAnAdmin | Self::RefreshFailed(_) => true,
            Self::Backend(err) => err.is_unauthorized(),
            Self::InvalidCredentials => false,
        }
    }

    /// Message safe to show on the login page.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials | Self::NotAnAdmin => self.to_string(),
            Self::RefreshFailed(_) => "Your session has expired. Please sign in again.".to_string(),
            Self::Backend(_) => "Sign-in failed. Please try again.".to_string(),
        }
    }
}
