//! Admin user profile rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AdminRole, AdminUserId, Email};

/// A profile row linking an authenticated identity to a role.
///
/// The id is the auth identity's id, so there is at most one row per identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub full_name: Option<String>,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
}

impl AdminUser {
    /// Name to show in the dashboard, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.email.as_str())
    }
}

/// Insert payload for an admin user row.
///
/// `created_at` is assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub full_name: Option<String>,
    pub role: AdminRole,
}

impl NewAdminUser {
    /// Build a row for an identity that has just been created.
    ///
    /// A blank full name is stored as `null`.
    #[must_use]
    pub fn new(id: AdminUserId, email: Email, full_name: Option<String>, role: AdminRole) -> Self {
        let full_name = full_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        Self {
            id,
            email,
            full_name,
            role,
        }
    }
}
