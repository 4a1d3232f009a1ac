//! Session-stored models for admin.

pub mod session;

pub use session::{AdminSession, CurrentAdmin, Flash, FlashKind, SessionTokens};
pub use session::keys as session_keys;
