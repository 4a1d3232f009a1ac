//! Shared HTTP client for one Supabase project.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::config::SupabaseConfig;
use crate::error::SupabaseError;
use crate::rest::RestClient;

/// Supabase project client.
///
/// Cheap to clone. The `apikey` header is sent on every request; the bearer
/// token is chosen per call, either the API key itself (anonymous) or a
/// signed-in user's access token via [`SupabaseClient::with_access_token`].
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl SupabaseClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        let mut headers = HeaderMap::new();

        let mut api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|_| SupabaseError::InvalidHeader("apikey"))?;
        api_key.set_sensitive(true);
        headers.insert("apikey", api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                http,
                base_url: config.url.clone(),
                api_key: config.api_key.clone(),
            }),
        })
    }

    /// `PostgREST` access as the anonymous role.
    #[must_use]
    pub fn anonymous(&self) -> RestClient {
        RestClient::new(self.clone(), self.inner.api_key.clone())
    }

    /// `PostgREST` access as the user behind `access_token`.
    #[must_use]
    pub fn with_access_token(&self, access_token: &SecretString) -> RestClient {
        RestClient::new(self.clone(), access_token.clone())
    }

    /// Project base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub(crate) fn api_key(&self) -> &SecretString {
        &self.inner.api_key
    }

    /// Resolve a path under the project URL (e.g. `/rest/v1/quotes`).
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, SupabaseError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Build a sensitive `Authorization: Bearer` header value.
    pub(crate) fn bearer(token: &SecretString) -> Result<HeaderValue, SupabaseError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|_| SupabaseError::InvalidHeader("Authorization"))?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Check that the auth service is reachable.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the service reports unhealthy.
    pub async fn health_check(&self) -> Result<(), SupabaseError> {
        let url = self.endpoint("/auth/v1/health")?;
        let response = self.http().get(url).send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(SupabaseError::from_reqwest(response).await)
    }
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
