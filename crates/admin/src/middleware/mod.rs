//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Security headers
//! 4. Session layer (tower-sessions, in-memory store)
//! 5. Auth extractors on protected handlers

pub mod auth;
pub mod security_headers;
pub mod session;

pub use auth::{
    AdminAuthRejection, RequireAdminAuth, RequireSuperAdmin, clear_current_admin,
    set_current_admin,
};
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, set_flash, take_flash};
