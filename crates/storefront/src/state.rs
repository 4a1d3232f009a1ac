//! Application state shared across handlers.

use std::sync::Arc;

use fresh_shine_supabase::{RestClient, SupabaseClient, SupabaseError};

use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    supabase: SupabaseClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Supabase client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, SupabaseError> {
        let supabase = SupabaseClient::new(&config.supabase)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, supabase }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Quote inbox acting as the anonymous role.
    #[must_use]
    pub fn quote_inbox(&self) -> RestClient {
        self.inner.supabase.anonymous()
    }
}
