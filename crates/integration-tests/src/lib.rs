//! Integration tests for Fresh Shine Solutions.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fresh-shine-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `booking_flow` - Storefront submissions into the quote table
//! - `dashboard_flow` - Admin dashboard reads, edits and user management
//! - `auth_flow` - Sign-in, role lookup and the HTTP auth gate
//!
//! Flows run against [`MemoryBackend`], an in-process stand-in for the
//! hosted backend that implements every port.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use fresh_shine_admin::services::UserScope;
use fresh_shine_core::{
    AdminRole, AdminUser, AdminUserId, AdminUserRepository, AuthProvider, AuthSession, AuthUser,
    BackendError, BackendResult, Email, NewAdminUser, NewQuote, Quote, QuoteId, QuoteInbox,
    QuotePatch, QuoteRepository, QuoteStatus, ServiceType,
};
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug, Clone)]
struct Account {
    id: AdminUserId,
    password: String,
}

#[derive(Debug, Default)]
struct Tables {
    quotes: Vec<Quote>,
    admin_users: Vec<AdminUser>,
    accounts: HashMap<Email, Account>,
    fail_admin_user_insert: bool,
    signed_out: Vec<AdminUserId>,
}

/// In-memory backend: quotes, admin users and auth identities.
///
/// Clones share the same tables. Reads are newest first, as the hosted
/// backend orders them.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::unwrap_used)]
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    /// Add a quote directly, bypassing the inbox.
    pub fn seed_quote(&self, quote: Quote) {
        self.tables().quotes.push(quote);
    }

    /// Create an identity with an `admin_users` row.
    pub fn seed_admin(&self, email: &Email, password: &str, role: AdminRole) -> AdminUserId {
        let id = self.seed_identity(email, password);
        self.tables().admin_users.push(AdminUser {
            id,
            email: email.clone(),
            full_name: None,
            role,
            created_at: Utc::now(),
        });
        id
    }

    /// Create an identity with no `admin_users` row.
    pub fn seed_identity(&self, email: &Email, password: &str) -> AdminUserId {
        let id = AdminUserId::random();
        self.tables().accounts.insert(
            email.clone(),
            Account {
                id,
                password: password.to_string(),
            },
        );
        id
    }

    /// Make every later `admin_users` insert fail.
    pub fn fail_admin_user_inserts(&self) {
        self.tables().fail_admin_user_insert = true;
    }

    #[must_use]
    pub fn has_identity(&self, email: &Email) -> bool {
        self.tables().accounts.contains_key(email)
    }

    /// Identities whose session was revoked, in order.
    #[must_use]
    pub fn signed_out(&self) -> Vec<AdminUserId> {
        self.tables().signed_out.clone()
    }

    #[must_use]
    pub fn quote(&self, id: QuoteId) -> Option<Quote> {
        self.tables().quotes.iter().find(|q| q.id == id).cloned()
    }

    #[must_use]
    pub fn quote_count(&self) -> usize {
        self.tables().quotes.len()
    }

    fn session_for(id: AdminUserId, email: &Email) -> AuthSession {
        AuthSession {
            access_token: SecretString::from(format!("access-{id}")),
            refresh_token: SecretString::from(format!("refresh-{id}")),
            expires_at: Utc::now() + TimeDelta::hours(1),
            user: AuthUser {
                id,
                email: email.clone(),
            },
        }
    }

    fn account_by_token(&self, token: &str, prefix: &str) -> Option<(Email, AdminUserId)> {
        let id = token.strip_prefix(prefix)?;
        self.tables()
            .accounts
            .iter()
            .find(|(_, account)| account.id.to_string() == id)
            .map(|(email, account)| (email.clone(), account.id))
    }
}

fn newest_first<T: Clone>(rows: &[T], created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut rows = rows.to_vec();
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    rows
}

impl QuoteInbox for MemoryBackend {
    async fn submit_quote(&self, quote: &NewQuote) -> BackendResult<()> {
        self.tables().quotes.push(Quote {
            id: QuoteId::random(),
            created_at: Utc::now(),
            service_type: quote.service_type,
            address: quote.address.clone(),
            postcode: quote.postcode.clone(),
            bedrooms: quote.bedrooms.clone(),
            bathrooms: quote.bathrooms.clone(),
            preferred_date: quote.preferred_date,
            preferred_time: quote.preferred_time.clone(),
            email: quote.email.clone(),
            phone: quote.phone.clone(),
            status: quote.status(),
            quote_amount: None,
            admin_notes: None,
        });
        Ok(())
    }
}

impl QuoteRepository for MemoryBackend {
    async fn list_quotes(&self) -> BackendResult<Vec<Quote>> {
        Ok(newest_first(&self.tables().quotes, |q| q.created_at))
    }

    async fn update_quote(&self, id: QuoteId, patch: &QuotePatch) -> BackendResult<()> {
        let mut tables = self.tables();
        let quote = tables
            .quotes
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or(BackendError::NotFound)?;
        *quote = quote.with_patch(patch);
        Ok(())
    }

    async fn delete_quote(&self, id: QuoteId) -> BackendResult<()> {
        let mut tables = self.tables();
        let before = tables.quotes.len();
        tables.quotes.retain(|q| q.id != id);
        if tables.quotes.len() == before {
            return Err(BackendError::NotFound);
        }
        Ok(())
    }
}

impl AdminUserRepository for MemoryBackend {
    async fn list_admin_users(&self) -> BackendResult<Vec<AdminUser>> {
        Ok(newest_first(&self.tables().admin_users, |u| u.created_at))
    }

    async fn find_admin_user(&self, id: AdminUserId) -> BackendResult<Option<AdminUser>> {
        Ok(self
            .tables()
            .admin_users
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn insert_admin_user(&self, user: &NewAdminUser) -> BackendResult<()> {
        let mut tables = self.tables();
        if tables.fail_admin_user_insert {
            return Err(BackendError::Rejected {
                status: 500,
                message: "insert failed".to_string(),
            });
        }
        if tables.admin_users.iter().any(|u| u.id == user.id) {
            return Err(BackendError::Conflict("duplicate key value".to_string()));
        }
        tables.admin_users.push(AdminUser {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn delete_admin_user(&self, id: AdminUserId) -> BackendResult<()> {
        self.tables().admin_users.retain(|u| u.id != id);
        Ok(())
    }
}

impl AuthProvider for MemoryBackend {
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> BackendResult<AuthSession> {
        let account = self
            .tables()
            .accounts
            .get(email)
            .cloned()
            .ok_or(BackendError::Unauthorized)?;
        if account.password != password.expose_secret() {
            return Err(BackendError::Unauthorized);
        }
        Ok(Self::session_for(account.id, email))
    }

    async fn refresh_session(&self, refresh_token: &SecretString) -> BackendResult<AuthSession> {
        let (email, id) = self
            .account_by_token(refresh_token.expose_secret(), "refresh-")
            .ok_or(BackendError::Unauthorized)?;
        Ok(Self::session_for(id, &email))
    }

    async fn get_user(&self, access_token: &SecretString) -> BackendResult<AuthUser> {
        let (email, id) = self
            .account_by_token(access_token.expose_secret(), "access-")
            .ok_or(BackendError::Unauthorized)?;
        Ok(AuthUser { id, email })
    }

    async fn sign_out(&self, access_token: &SecretString) -> BackendResult<()> {
        if let Some((_, id)) = self.account_by_token(access_token.expose_secret(), "access-") {
            self.tables().signed_out.push(id);
        }
        Ok(())
    }

    async fn sign_up(&self, email: &Email, password: &SecretString) -> BackendResult<AuthUser> {
        if self.has_identity(email) {
            return Err(BackendError::Conflict("User already registered".to_string()));
        }
        let id = self.seed_identity(email, password.expose_secret());
        Ok(AuthUser {
            id,
            email: email.clone(),
        })
    }
}

impl UserScope for MemoryBackend {
    type Users = Self;

    fn users_as(&self, _access_token: &SecretString) -> Self {
        self.clone()
    }
}

/// A quote with fixed request fields, created `minutes_ago` minutes before a
/// fixed instant.
///
/// # Panics
///
/// Never; the fixture instant and email are valid.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn quote_fixture(status: QuoteStatus, minutes_ago: i64) -> Quote {
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    Quote {
        id: QuoteId::random(),
        created_at: base - TimeDelta::minutes(minutes_ago),
        service_type: ServiceType::Domestic,
        address: format!("{minutes_ago} Mill Lane"),
        postcode: Some("M1 1AA".to_string()),
        bedrooms: Some("3".to_string()),
        bathrooms: Some("1".to_string()),
        preferred_date: None,
        preferred_time: None,
        email: Email::parse("customer@example.com").unwrap(),
        phone: "0161 555 0100".to_string(),
        status,
        quote_amount: None,
        admin_notes: None,
    }
}
