//! Login and logout handlers.

use askama::Template;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use fresh_shine_core::SessionEvent;
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    error::{AppError, clear_sentry_user, set_sentry_user},
    filters,
    middleware::{
        auth::{LOGIN_PATH, sign_in_session},
        clear_current_admin, set_flash, take_flash,
    },
    models::{Flash, SessionTokens, session_keys},
    services::AdminAuthError,
    state::AppState,
};

/// Shown on the login page after logout.
pub const LOGGED_OUT: &str = "Logged out successfully";

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
    pub flash: Option<Flash>,
}

/// Login form.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Display the login page.
///
/// GET /auth/login
pub async fn login_page(session: Session) -> Result<Html<String>, AppError> {
    let template = LoginTemplate {
        email: String::new(),
        error: None,
        flash: take_flash(&session).await,
    };
    Ok(Html(template.render()?))
}

/// Sign in with email and password.
///
/// POST /auth/login
#[instrument(skip_all, fields(email = %form.email.trim()))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let password = SecretString::from(form.password);
    let err = match state.auth_service().sign_in(&form.email, &password).await {
        Ok(resolved) => {
            sign_in_session(&session, &resolved.admin, &resolved.tokens).await?;
            state.session_events().publish(SessionEvent::SignedIn {
                user_id: resolved.admin.id,
            });
            set_sentry_user(resolved.admin.id, Some(resolved.admin.email.as_str()));
            tracing::info!(admin_id = %resolved.admin.id, "Admin signed in");
            return Ok(Redirect::to("/dashboard").into_response());
        }
        Err(err) => err,
    };

    let status = match err {
        AdminAuthError::InvalidCredentials | AdminAuthError::NotAnAdmin => {
            tracing::info!(error = %err, "Sign-in refused");
            StatusCode::UNAUTHORIZED
        }
        _ => {
            tracing::error!(error = %err, "Sign-in failed");
            StatusCode::BAD_GATEWAY
        }
    };

    let template = LoginTemplate {
        email: form.email,
        error: Some(err.user_message()),
        flash: None,
    };
    Ok((status, Html(template.render()?)).into_response())
}

/// Sign out and return to the login page.
///
/// A request without a signed-in session leaves the store untouched.
///
/// POST /auth/logout
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect, AppError> {
    let Some(tokens) = session.get::<SessionTokens>(session_keys::TOKENS).await? else {
        return Ok(Redirect::to(LOGIN_PATH));
    };

    state.auth_service().sign_out(&tokens).await;
    state.session_events().publish(SessionEvent::SignedOut {
        user_id: tokens.user_id,
    });
    tracing::info!(admin_id = %tokens.user_id, "Admin signed out");

    clear_current_admin(&session).await?;
    clear_sentry_user();
    set_flash(&session, Flash::success(LOGGED_OUT)).await?;
    Ok(Redirect::to(LOGIN_PATH))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_page_shows_error_and_keeps_email() {
        let html = LoginTemplate {
            email: "ops@freshshine.co.uk".to_string(),
            error: Some("Invalid email or password".to_string()),
            flash: None,
        }
        .render()
        .unwrap();
        assert!(html.contains("ops@freshshine.co.uk"));
        assert!(html.contains("Invalid email or password"));
    }

    #[test]
    fn test_login_page_shows_flash() {
        let html = LoginTemplate {
            email: String::new(),
            error: None,
            flash: Some(Flash::error("Unauthorized access")),
        }
        .render()
        .unwrap();
        assert!(html.contains("Unauthorized access"));
    }
}
