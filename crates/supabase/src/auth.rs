//! `GoTrue` authentication endpoints.

use chrono::{DateTime, TimeDelta, Utc};
use fresh_shine_core::{AdminUserId, AuthProvider, AuthSession, AuthUser, BackendResult, Email};
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::SupabaseClient;
use crate::error::SupabaseError;

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: AdminUserId,
    email: Option<Email>,
}

impl UserResponse {
    fn into_auth_user(self) -> Result<AuthUser, SupabaseError> {
        let email = self
            .email
            .ok_or_else(|| SupabaseError::Parse("auth user has no email".to_string()))?;
        Ok(AuthUser { id: self.id, email })
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    expires_at: Option<i64>,
    user: UserResponse,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Result<AuthSession, SupabaseError> {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(|| now + TimeDelta::seconds(self.expires_in));
        Ok(AuthSession {
            access_token: SecretString::from(self.access_token),
            refresh_token: SecretString::from(self.refresh_token),
            expires_at,
            user: self.user.into_auth_user()?,
        })
    }
}

/// Sign-up returns a session when auto-confirm is on, a bare user otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session { user: UserResponse },
    User(UserResponse),
}

impl SupabaseClient {
    async fn token_grant<B: Serialize + Sync>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> Result<AuthSession, SupabaseError> {
        let mut url = self.endpoint("/auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);

        let response = self
            .http()
            .post(url)
            .header(AUTHORIZATION, Self::bearer(self.api_key())?)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // GoTrue answers bad credentials and revoked refresh tokens with 400.
            return Err(match SupabaseError::from_reqwest(response).await {
                SupabaseError::Api {
                    status: 400,
                    message,
                    ..
                } => SupabaseError::Unauthorized(message),
                other => other,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(format!("Failed to parse token response: {e}")))?;
        token.into_session(Utc::now())
    }
}

impl AuthProvider for SupabaseClient {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> BackendResult<AuthSession> {
        let grant = PasswordGrant {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        Ok(self.token_grant("password", &grant).await?)
    }

    #[instrument(skip_all)]
    async fn refresh_session(&self, refresh_token: &SecretString) -> BackendResult<AuthSession> {
        let grant = RefreshGrant {
            refresh_token: refresh_token.expose_secret(),
        };
        Ok(self.token_grant("refresh_token", &grant).await?)
    }

    #[instrument(skip_all)]
    async fn get_user(&self, access_token: &SecretString) -> BackendResult<AuthUser> {
        let url = self.endpoint("/auth/v1/user").map_err(SupabaseError::from)?;
        let response = self
            .http()
            .get(url)
            .header(AUTHORIZATION, Self::bearer(access_token)?)
            .send()
            .await
            .map_err(SupabaseError::from)?;
        if !response.status().is_success() {
            return Err(SupabaseError::from_reqwest(response).await.into());
        }
        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(format!("Failed to parse user: {e}")))?;
        Ok(user.into_auth_user()?)
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &SecretString) -> BackendResult<()> {
        let url = self.endpoint("/auth/v1/logout").map_err(SupabaseError::from)?;
        let response = self
            .http()
            .post(url)
            .header(AUTHORIZATION, Self::bearer(access_token)?)
            .send()
            .await
            .map_err(SupabaseError::from)?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(SupabaseError::from_reqwest(response).await.into())
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_up(&self, email: &Email, password: &SecretString) -> BackendResult<AuthUser> {
        let url = self.endpoint("/auth/v1/signup").map_err(SupabaseError::from)?;
        let body = PasswordGrant {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        let response = self
            .http()
            .post(url)
            .header(AUTHORIZATION, Self::bearer(self.api_key())?)
            .json(&body)
            .send()
            .await
            .map_err(SupabaseError::from)?;
        if !response.status().is_success() {
            return Err(SupabaseError::from_reqwest(response).await.into());
        }
        let created: SignUpResponse = response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(format!("Failed to parse sign-up response: {e}")))?;
        let user = match created {
            SignUpResponse::Session { user } | SignUpResponse::User(user) => user,
        };
        Ok(user.into_auth_user()?)
    }
}
