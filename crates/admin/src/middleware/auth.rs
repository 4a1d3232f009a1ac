//! Authentication middleware and extractors for admin.
//!
//! Every protected handler runs the auth gate: read the stored tokens,
//! refresh them if needed, look up the `admin_users` row and decide. Any
//! failure along the way denies access.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use fresh_shine_core::SessionEvent;
use tower_sessions::Session;

use crate::error::set_sentry_user;
use crate::models::{AdminSession, CurrentAdmin, Flash, SessionTokens, session_keys};
use crate::services::AdminAuthError;
use crate::state::AppState;
use crate::views::{AuthGate, GateDecision};

use super::session::set_flash;

/// Login page path.
pub const LOGIN_PATH: &str = "/auth/login";

/// Extractor that requires admin authentication.
///
/// If the admin is not logged in, returns a redirect to the login page
/// for HTML requests, or 401 Unauthorized for API and event-stream requests.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(session): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", session.admin.display_name())
/// }
/// ```
pub struct RequireAdminAuth(pub AdminSession);

/// Error returned when admin authentication is required but the user is not logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl AdminAuthRejection {
    fn for_path(path: &str) -> Self {
        if path.starts_with("/api/") || path == "/events" {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin
        }
    }
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let rejection = AdminAuthRejection::for_path(parts.uri.path());

        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        authorize(state, &session).await.map(Self).ok_or(rejection)
    }
}

/// Extractor that requires super admin authentication.
///
/// If the admin is not logged in, redirects to login.
/// If the admin is not a super admin, returns 403 Forbidden.
pub struct RequireSuperAdmin(pub AdminSession);

/// Error returned when super admin authentication is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuperAdminRejection {
    /// Not signed in.
    Auth(AdminAuthRejection),
    /// Forbidden - user is admin but not super admin.
    Forbidden,
}

impl IntoResponse for SuperAdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(rejection) => rejection.into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "Only super admins can access this resource",
            )
                .into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = SuperAdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAdminAuth(session) = RequireAdminAuth::from_request_parts(parts, state)
            .await
            .map_err(SuperAdminRejection::Auth)?;

        if !session.admin.can_manage_users() {
            tracing::warn!(admin_id = %session.admin.id, "Super admin route refused");
            return Err(SuperAdminRejection::Forbidden);
        }

        Ok(Self(session))
    }
}

/// Run the auth gate for one request.
///
/// Returns the authenticated admin, or `None` if access is denied. A dead
/// session is cleared, a notice is left for the login page and `SignedOut`
/// is published.
pub async fn authorize(state: &AppState, session: &Session) -> Option<AdminSession> {
    let tokens = session
        .get::<SessionTokens>(session_keys::TOKENS)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read session tokens");
            None
        });
    let user_id = tokens.as_ref().map(|t| t.user_id);

    let lookup = state.auth_service().resolve(tokens, Utc::now()).await;
    let gate = AuthGate::new().resolve(
        lookup
            .as_ref()
            .map(|found| found.as_ref().map(|resolved| resolved.admin.id)),
    );

    match (gate.decision(), lookup) {
        (GateDecision::Render, Ok(Some(resolved))) => {
            if resolved.refreshed {
                if let Err(e) = session.insert(session_keys::TOKENS, &resolved.tokens).await {
                    tracing::warn!(error = %e, "Failed to store refreshed tokens");
                }
                state.session_events().publish(SessionEvent::TokenRefreshed {
                    user_id: resolved.admin.id,
                });
            }
            if let Err(e) = set_current_admin(session, &resolved.admin).await {
                tracing::warn!(error = %e, "Failed to store current admin");
            }
            set_sentry_user(resolved.admin.id, Some(resolved.admin.email.as_str()));

            Some(AdminSession {
                access_token: resolved.tokens.access_token(),
                admin: resolved.admin,
            })
        }
        (_, Err(err)) if err.ends_session() => {
            end_session(state, session, &err, user_id).await;
            None
        }
        _ => None,
    }
}

async fn end_session(
    state: &AppState,
    session: &Session,
    err: &AdminAuthError,
    user_id: Option<fresh_shine_core::AdminUserId>,
) {
    if let Err(e) = clear_current_admin(session).await {
        tracing::warn!(error = %e, "Failed to clear session");
    }
    if let Err(e) = set_flash(session, Flash::error(err.user_message())).await {
        tracing::warn!(error = %e, "Failed to store notice");
    }
    if let Some(user_id) = user_id {
        state
            .session_events()
            .publish(SessionEvent::SignedOut { user_id });
    }
}

/// Store a freshly signed-in admin and their tokens in the session.
///
/// The session id is cycled to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn sign_in_session(
    session: &Session,
    admin: &CurrentAdmin,
    tokens: &SessionTokens,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::TOKENS, tokens).await?;
    set_current_admin(session, admin).await
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin and tokens from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    session
        .remove::<SessionTokens>(session_keys::TOKENS)
        .await?;
    session.cycle_id().await
}
