//! HTTP middleware for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Rate limiting on booking submissions (governor)

pub mod rate_limit;

pub use rate_limit::{ClientIpKeyExtractor, booking_rate_limiter};
