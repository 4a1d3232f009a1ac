//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Bootstrap the first super admin
//! FS_ADMIN_PASSWORD=... fs-cli admin create -e owner@freshshine.co.uk -n "Owner" -r super_admin
//!
//! # List admin users
//! fs-cli admin list
//! ```
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL` - Project URL
//! - `SUPABASE_SERVICE_ROLE_KEY` - Service role key (bypasses row-level security)

use fresh_shine_core::{
    AdminRole, AdminUserRepository, AuthProvider, BackendError, Email, NewAdminUser,
};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use super::{ClientError, service_client};

/// Shortest password the auth service accepts.
const MIN_PASSWORD_LEN: usize = 6;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,

    /// User already exists.
    #[error("Admin user already exists with email: {0}")]
    UserExists(String),

    /// The identity was created but its profile row was not.
    #[error(
        "Login identity {user_id} for {email} was created but the admin_users row was not \
         ({source}). Delete the identity in the Supabase dashboard before retrying."
    )]
    Orphaned {
        email: Email,
        user_id: fresh_shine_core::AdminUserId,
        #[source]
        source: BackendError,
    },

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Create a login identity, then an `admin_users` row with the same id.
///
/// Nothing is rolled back if the second step fails.
///
/// # Errors
///
/// Returns [`AdminError::UserExists`] if a row already has this email, the
/// sign-up failure, or [`AdminError::Orphaned`] if the row insert fails.
pub async fn bootstrap<A, R>(
    auth: &A,
    users: &R,
    email: Email,
    password: &SecretString,
    full_name: Option<String>,
    role: AdminRole,
) -> Result<NewAdminUser, AdminError>
where
    A: AuthProvider,
    R: AdminUserRepository,
{
    if password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
        return Err(AdminError::WeakPassword);
    }

    let existing = users.list_admin_users().await?;
    if existing.iter().any(|user| user.email == email) {
        return Err(AdminError::UserExists(email.to_string()));
    }

    let identity = auth.sign_up(&email, password).await?;
    let row = NewAdminUser::new(identity.id, email, full_name, role);

    if let Err(source) = users.insert_admin_user(&row).await {
        return Err(AdminError::Orphaned {
            email: row.email,
            user_id: identity.id,
            source,
        });
    }

    Ok(row)
}

/// Create a new admin user.
///
/// # Errors
///
/// Returns error if the arguments are invalid, configuration is missing or
/// either backend step fails.
pub async fn create_user(
    email: &str,
    password: &SecretString,
    name: Option<&str>,
    role: &str,
) -> Result<(), AdminError> {
    // Parse and validate role
    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))?;

    let client = service_client()?;
    tracing::info!("Creating admin user: {} ({})", email, role);

    let row = bootstrap(
        &client,
        &client.anonymous(),
        email,
        password,
        name.map(str::to_owned),
        role,
    )
    .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}, Role: {}",
        row.id,
        row.email,
        row.role
    );
    Ok(())
}

/// List admin users, newest first.
///
/// # Errors
///
/// Returns error if configuration is missing or the read fails.
pub async fn list_users() -> Result<(), AdminError> {
    let client = service_client()?;
    let users = client.anonymous().list_admin_users().await?;

    tracing::info!("{} admin user(s)", users.len());
    for user in &users {
        tracing::info!(
            "  {}  {:<40} {:<12} {}  {}",
            user.id,
            user.email,
            user.role,
            user.created_at.format("%Y-%m-%d"),
            user.full_name.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}
