//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Booking page (minimal site shell)
//! POST /quote                  - Booking form submission (rate limited)
//! POST /api/quotes             - JSON booking submission (rate limited)
//! GET  /health                 - Liveness check
//! ```

pub mod booking;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::booking_rate_limiter;
use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Create the rate-limited submission routes.
pub fn submission_routes() -> Router<AppState> {
    Router::new()
        .route("/quote", post(booking::submit))
        .route("/api/quotes", post(booking::submit_json))
        .layer(booking_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(booking::page))
        .route("/health", get(health))
        .merge(submission_routes())
}
