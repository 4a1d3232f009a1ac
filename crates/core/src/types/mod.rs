//! Core types for Fresh Shine.
//!
//! This module provides type-safe wrappers for the quote and admin domain.

pub mod admin_user;
pub mod amount;
pub mod auth;
pub mod email;
pub mod id;
pub mod quote;
pub mod realtime;
pub mod status;

pub use admin_user::{AdminUser, NewAdminUser};
pub use amount::{AmountError, QuoteAmount};
pub use auth::{AuthSession, AuthUser, SessionEvent};
pub use email::{Email, EmailError};
pub use id::*;
pub use quote::{NewQuote, Quote, QuotePatch, QuoteStats, StatusFilter};
pub use realtime::{ChangeKind, Table, TableChange};
pub use status::*;
