//! Fresh Shine Admin library.
//!
//! The quote management dashboard as a library, so the router can be
//! exercised from tests.
//!
//! # Security
//!
//! Every request acts as the signed-in admin's own identity. Role checks
//! here only decide what is shown; row-level security on `quotes` and
//! `admin_users` is the real boundary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod views;

use axum::Router;

use crate::middleware::{create_session_layer, security_headers_middleware};
use crate::state::AppState;

/// Build the admin router with sessions and security headers, minus the
/// tracing, Sentry and static file layers added by the binary.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());
    routes::routes()
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(session_layer)
        .with_state(state)
}
