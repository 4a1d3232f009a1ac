//! Application state shared across handlers.

use std::sync::Arc;

use fresh_shine_supabase::{RestClient, SupabaseClient, SupabaseError};
use secrecy::SecretString;

use crate::config::AdminConfig;
use crate::services::{AdminAuthService, DashboardService, SessionEvents};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    supabase: SupabaseClient,
    session_events: SessionEvents,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns error if the Supabase client fails to build.
    pub fn new(config: AdminConfig) -> Result<Self, SupabaseError> {
        let supabase = SupabaseClient::new(&config.supabase)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                supabase,
                session_events: SessionEvents::new(),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn supabase(&self) -> &SupabaseClient {
        &self.inner.supabase
    }

    /// Auth state changes, fanned out to open event streams.
    #[must_use]
    pub fn session_events(&self) -> &SessionEvents {
        &self.inner.session_events
    }

    #[must_use]
    pub fn auth_service(&self) -> AdminAuthService<SupabaseClient> {
        AdminAuthService::new(self.inner.supabase.clone())
    }

    /// Dashboard operations acting as the admin behind `access_token`.
    #[must_use]
    pub fn dashboard(&self, access_token: &SecretString) -> DashboardService<RestClient, SupabaseClient> {
        DashboardService {
            repo: self.inner.supabase.with_access_token(access_token),
            auth: self.inner.supabase.clone(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("supabase", &self.inner.supabase)
            .finish_non_exhaustive()
    }
}
