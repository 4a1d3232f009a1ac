//! Command implementations.

pub mod admin;
pub mod quotes;

use fresh_shine_supabase::{ConfigError, SupabaseClient, SupabaseConfig, SupabaseError};
use thiserror::Error;

/// Errors from building the service role client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Supabase client error: {0}")]
    Client(#[from] SupabaseError),
}

/// Supabase client authenticated with the service role key.
///
/// Row-level security does not apply to anything done with it.
///
/// # Errors
///
/// Returns error if `SUPABASE_URL` or `SUPABASE_SERVICE_ROLE_KEY` is missing
/// or invalid.
pub fn service_client() -> Result<SupabaseClient, ClientError> {
    dotenvy::dotenv().ok();
    let config = SupabaseConfig::from_env_with_key("SUPABASE_SERVICE_ROLE_KEY")?;
    if !config.is_service_role() {
        tracing::warn!("SUPABASE_SERVICE_ROLE_KEY does not look like a service role key");
    }
    Ok(SupabaseClient::new(&config)?)
}
