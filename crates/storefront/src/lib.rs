//! Fresh Shine Storefront library.
//!
//! The public site: a minimal page shell hosting the booking form, which
//! inserts one `pending` quote per submission through the anonymous role.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod booking;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod state;
