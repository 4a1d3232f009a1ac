//! `PostgREST` table access.
//!
//! Rows are addressed with `PostgREST` filter syntax (`id=eq.<uuid>`). Updates
//! and deletes ask for the affected rows back so that a filter matching
//! nothing (missing row, or one hidden by row-level security) surfaces as
//! [`SupabaseError::NotFound`] instead of silently succeeding.

use fresh_shine_core::{
    AdminUser, AdminUserId, AdminUserRepository, BackendResult, NewAdminUser, NewQuote, Quote,
    QuoteId, QuoteInbox, QuotePatch, QuoteRepository, Table,
};
use reqwest::header::AUTHORIZATION;
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::client::SupabaseClient;
use crate::error::SupabaseError;

const PREFER_MINIMAL: &str = "return=minimal";
const PREFER_REPRESENTATION: &str = "return=representation";
const NEWEST_FIRST: &str = "created_at.desc";

/// Table access scoped to one bearer token.
#[derive(Clone)]
pub struct RestClient {
    client: SupabaseClient,
    bearer: SecretString,
}

impl RestClient {
    pub(crate) const fn new(client: SupabaseClient, bearer: SecretString) -> Self {
        Self { client, bearer }
    }

    fn table_url(&self, table: Table, query: &[(&str, String)]) -> Result<Url, SupabaseError> {
        let mut url = self
            .client
            .endpoint(&format!("/rest/v1/{}", table.name()))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: Url,
    ) -> Result<reqwest::RequestBuilder, SupabaseError> {
        Ok(self
            .client
            .http()
            .request(method, url)
            .header(AUTHORIZATION, SupabaseClient::bearer(&self.bearer)?))
    }

    /// `GET` rows matching `filters`, newest first.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: Table,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, SupabaseError> {
        let mut query = vec![("select", "*".to_string()), ("order", NEWEST_FIRST.to_string())];
        query.extend(filters.iter().map(|(k, v)| (*k, v.clone())));
        let url = self.table_url(table, &query)?;

        let response = self.request(reqwest::Method::GET, url)?.send().await?;
        if !response.status().is_success() {
            return Err(SupabaseError::from_reqwest(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(format!("Failed to parse {table} rows: {e}")))
    }

    /// `POST` one row without reading it back.
    ///
    /// Reading back would need `SELECT` permission, which the anonymous
    /// role does not have on `quotes`.
    pub async fn insert<B: Serialize + Sync>(
        &self,
        table: Table,
        row: &B,
    ) -> Result<(), SupabaseError> {
        let url = self.table_url(table, &[])?;
        let response = self
            .request(reqwest::Method::POST, url)?
            .header("Prefer", PREFER_MINIMAL)
            .json(row)
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(SupabaseError::from_reqwest(response).await)
    }

    /// `PATCH` the row with `id`.
    pub async fn update_by_id<B: Serialize + Sync>(
        &self,
        table: Table,
        id: uuid::Uuid,
        body: &B,
    ) -> Result<(), SupabaseError> {
        let url = self.table_url(table, &[("id", format!("eq.{id}"))])?;
        let builder = self
            .request(reqwest::Method::PATCH, url)?
            .header("Prefer", PREFER_REPRESENTATION)
            .json(body);
        Self::expect_rows(builder).await
    }

    /// `DELETE` the row with `id`.
    pub async fn delete_by_id(&self, table: Table, id: uuid::Uuid) -> Result<(), SupabaseError> {
        let url = self.table_url(table, &[("id", format!("eq.{id}"))])?;
        let builder = self
            .request(reqwest::Method::DELETE, url)?
            .header("Prefer", PREFER_REPRESENTATION);
        Self::expect_rows(builder).await
    }

    async fn expect_rows(builder: reqwest::RequestBuilder) -> Result<(), SupabaseError> {
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(SupabaseError::from_reqwest(response).await);
        }
        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(format!("Failed to parse affected rows: {e}")))?;
        if rows.is_empty() {
            return Err(SupabaseError::NotFound);
        }
        Ok(())
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl QuoteInbox for RestClient {
    #[instrument(skip(self, quote), fields(service_type = %quote.service_type))]
    async fn submit_quote(&self, quote: &NewQuote) -> BackendResult<()> {
        Ok(self.insert(Table::Quotes, quote).await?)
    }
}

impl QuoteRepository for RestClient {
    #[instrument(skip(self))]
    async fn list_quotes(&self) -> BackendResult<Vec<Quote>> {
        Ok(self.select(Table::Quotes, &[]).await?)
    }

    #[instrument(skip(self, patch), fields(status = %patch.status))]
    async fn update_quote(&self, id: QuoteId, patch: &QuotePatch) -> BackendResult<()> {
        Ok(self.update_by_id(Table::Quotes, id.as_uuid(), patch).await?)
    }

    #[instrument(skip(self))]
    async fn delete_quote(&self, id: QuoteId) -> BackendResult<()> {
        Ok(self.delete_by_id(Table::Quotes, id.as_uuid()).await?)
    }
}

impl AdminUserRepository for RestClient {
    #[instrument(skip(self))]
    async fn list_admin_users(&self) -> BackendResult<Vec<AdminUser>> {
        Ok(self.select(Table::AdminUsers, &[]).await?)
    }

    #[instrument(skip(self))]
    async fn find_admin_user(&self, id: AdminUserId) -> BackendResult<Option<AdminUser>> {
        let rows: Vec<AdminUser> = self
            .select(Table::AdminUsers, &[("id", format!("eq.{id}"))])
            .await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self, user), fields(email = %user.email, role = %user.role))]
    async fn insert_admin_user(&self, user: &NewAdminUser) -> BackendResult<()> {
        Ok(self.insert(Table::AdminUsers, user).await?)
    }

    #[instrument(skip(self))]
    async fn delete_admin_user(&self, id: AdminUserId) -> BackendResult<()> {
        Ok(self.delete_by_id(Table::AdminUsers, id.as_uuid()).await?)
    }
}
