//! Fresh Shine Supabase - Hosted backend client.
//!
//! Implements the [`fresh_shine_core`] ports against a Supabase project:
//!
//! - [`rest`] - `PostgREST` table reads and writes (`quotes`, `admin_users`)
//! - [`auth`] - `GoTrue` password sign-in, refresh, sign-out and sign-up
//! - [`realtime`] - Phoenix channel websocket for table change notifications
//!
//! # Usage
//!
//! ```rust,ignore
//! let client = SupabaseClient::new(&SupabaseConfig::from_env()?)?;
//!
//! // Public booking form: anonymous role, insert only
//! client.anonymous().submit_quote(&new_quote).await?;
//!
//! // Admin dashboard: the signed-in user's token, so row-level security applies
//! let quotes = client.with_access_token(&session.access_token).list_quotes().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod realtime;
pub mod rest;

pub use client::SupabaseClient;
pub use config::{ConfigError, SupabaseConfig};
pub use error::SupabaseError;
pub use realtime::{ChangeSubscription, RealtimeHub};
pub use rest::RestClient;
