//! Business logic services for admin.
//!
//! Services are generic over the backend ports so they run unchanged against
//! Supabase in production and against mocks in tests.

pub mod auth;
pub mod dashboard;
pub mod session_events;

pub use auth::{AdminAuthError, AdminAuthService, ResolvedSession, UserScope};
pub use dashboard::{DashboardError, DashboardService};
pub use session_events::SessionEvents;
