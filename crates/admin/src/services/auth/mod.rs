//! Admin authentication service.
//!
//! Email and password sign-in against the hosted auth service, followed by
//! an `admin_users` lookup that decides whether the identity may use the
//! dashboard at all. The same lookup runs on every authenticated request.

mod error;

pub use error::AdminAuthError;

use chrono::{DateTime, Utc};
use fresh_shine_core::{AdminUserRepository, AuthProvider, Email};
use fresh_shine_supabase::{RestClient, SupabaseClient};
use secrecy::SecretString;
use tracing::instrument;

use crate::models::{CurrentAdmin, SessionTokens};

/// Access to `admin_users` as a particular signed-in user.
///
/// Row-level security evaluates every query as the token's identity.
pub trait UserScope: Send + Sync {
    type Users: AdminUserRepository;

    fn users_as(&self, access_token: &SecretString) -> Self::Users;
}

impl UserScope for SupabaseClient {
    type Users = RestClient;

    fn users_as(&self, access_token: &SecretString) -> RestClient {
        self.with_access_token(access_token)
    }
}

/// A session that passed the admin check.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub admin: CurrentAdmin,
    pub tokens: SessionTokens,
    /// Whether `tokens` were just refreshed and must be written back.
    pub refreshed: bool,
}

/// Admin authentication service.
pub struct AdminAuthService<B> {
    backend: B,
}

impl<B: AuthProvider + UserScope> AdminAuthService<B> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Sign in with email and password.
    ///
    /// An identity with no `admin_users` row is signed straight back out.
    ///
    /// # Errors
    ///
    /// Returns [`AdminAuthError::InvalidCredentials`] for a bad email or
    /// password, [`AdminAuthError::NotAnAdmin`] if the identity has no admin
    /// row, or [`AdminAuthError::Backend`] if a call fails.
    #[instrument(skip(self, password))]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<ResolvedSession, AdminAuthError> {
        let email = Email::parse(email).map_err(|_| AdminAuthError::InvalidCredentials)?;
        let session = self
            .backend
            .sign_in_with_password(&email, password)
            .await
            .map_err(|err| {
                if err.is_unauthorized() {
                    AdminAuthError::InvalidCredentials
                } else {
                    AdminAuthError::Backend(err)
                }
            })?;

        let tokens = SessionTokens::from(&session);
        let admin = self.lookup_admin(&tokens).await?;
        tracing::info!(admin_id = %admin.id, role = %admin.role, "Admin signed in");

        Ok(ResolvedSession {
            admin,
            tokens,
            refreshed: false,
        })
    }

    /// Check a stored session, refreshing the access token if needed.
    ///
    /// The token is checked against the auth service before the role lookup,
    /// so a revoked session is caught even while its expiry is in the future.
    ///
    /// Returns `Ok(None)` when there is no stored session.
    ///
    /// # Errors
    ///
    /// Returns [`AdminAuthError::RefreshFailed`] if the refresh token is
    /// rejected, [`AdminAuthError::Backend`] with an unauthorized error if the
    /// access token is revoked, [`AdminAuthError::NotAnAdmin`] if the token
    /// belongs to another identity or the admin row is gone, or
    /// [`AdminAuthError::Backend`] if a call fails.
    #[instrument(skip_all)]
    pub async fn resolve(
        &self,
        tokens: Option<SessionTokens>,
        now: DateTime<Utc>,
    ) -> Result<Option<ResolvedSession>, AdminAuthError> {
        let Some(mut tokens) = tokens else {
            return Ok(None);
        };

        let refreshed = tokens.needs_refresh(now);
        if refreshed {
            let session = self
                .backend
                .refresh_session(&tokens.refresh_token())
                .await
                .map_err(AdminAuthError::RefreshFailed)?;
            tracing::debug!(user_id = %session.user.id, "Access token refreshed");
            tokens = SessionTokens::from(&session);
        }

        let user = self.backend.get_user(&tokens.access_token()).await?;
        if user.id != tokens.user_id {
            tracing::warn!(
                stored = %tokens.user_id,
                token = %user.id,
                "Access token belongs to another identity"
            );
            return Err(AdminAuthError::NotAnAdmin);
        }

        let admin = self.lookup_admin(&tokens).await?;
        Ok(Some(ResolvedSession {
            admin,
            tokens,
            refreshed,
        }))
    }

    /// Revoke the session on the backend. Failures are logged and ignored.
    #[instrument(skip_all, fields(user_id = %tokens.user_id))]
    pub async fn sign_out(&self, tokens: &SessionTokens) {
        if let Err(e) = self.backend.sign_out(&tokens.access_token()).await {
            tracing::warn!(error = %e, "Backend sign-out failed");
        }
    }

    async fn lookup_admin(&self, tokens: &SessionTokens) -> Result<CurrentAdmin, AdminAuthError> {
        let users = self.backend.users_as(&tokens.access_token());
        match users.find_admin_user(tokens.user_id).await? {
            Some(row) => Ok(CurrentAdmin::from(&row)),
            None => {
                tracing::warn!(user_id = %tokens.user_id, "Identity has no admin_users row");
                self.sign_out(tokens).await;
                Err(AdminAuthError::NotAnAdmin)
            }
        }
    }
}
