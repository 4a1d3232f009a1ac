//! Fresh Shine Core - Shared domain types and backend ports.
//!
//! This crate provides the types used across all Fresh Shine components:
//! - `storefront` - Public marketing site with the booking form
//! - `admin` - Quote management dashboard
//! - `cli` - Operational commands
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! Persistence, authentication and realtime delivery belong to the hosted
//! backend; the [`ports`] traits describe what the rest of the workspace
//! needs from it, and `fresh-shine-supabase` implements them.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, amounts, statuses and row types
//! - [`ports`] - Async backend traits and [`BackendError`]

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(async_fn_in_trait)]

pub mod ports;
pub mod types;

pub use ports::*;
pub use types::*;
