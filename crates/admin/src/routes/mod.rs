//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Backend reachability
//!
//! # Auth
//! GET  /auth/login                 - Login page
//! POST /auth/login                 - Email and password sign-in
//! POST /auth/logout                - Logout
//!
//! # Dashboard
//! GET  /                           - Redirect to /dashboard
//! GET  /dashboard?status=&tab=     - Quotes and admin users
//! GET  /events                     - Server-sent change and session events
//! GET  /api/dashboard?status=      - Dashboard snapshot as JSON
//!
//! # Quotes
//! GET  /quotes/{id}                - Edit status, amount and notes
//! POST /quotes/{id}                - Save edits
//! GET  /quotes/{id}/delete         - Confirm delete
//! POST /quotes/{id}/delete         - Delete
//!
//! # Admin Users (super admin only)
//! POST /admin-users                - Create admin user
//! GET  /admin-users/{id}/delete    - Confirm delete
//! POST /admin-users/{id}/delete    - Delete admin user row
//! ```

pub mod admin_users;
pub mod api;
pub mod auth;
pub mod dashboard;
pub mod events;
pub mod quotes;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the backend is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.supabase().health_check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Create all routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        // Auth
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", post(auth::logout))
        // Dashboard
        .route("/", get(dashboard::index))
        .route("/dashboard", get(dashboard::show))
        .route("/events", get(events::stream))
        .route("/api/dashboard", get(api::dashboard))
        // Quotes
        .route("/quotes/{id}", get(quotes::edit).post(quotes::update))
        .route(
            "/quotes/{id}/delete",
            get(quotes::confirm_delete).post(quotes::delete),
        )
        // Admin users
        .route("/admin-users", post(admin_users::create))
        .route(
            "/admin-users/{id}/delete",
            get(admin_users::confirm_delete).post(admin_users::delete),
        )
}
