//! Dashboard flows: load, quote mutation and admin user management.

use fresh_shine_core::{
    AdminUserId, AdminUserRepository, AuthProvider, BackendError, Email, NewAdminUser, Quote,
    QuoteId, QuotePatch, QuoteRepository, StatusFilter,
};
use thiserror::Error;
use tracing::instrument;

use crate::models::CurrentAdmin;
use crate::views::{DashboardView, NewAdminUserForm, QuoteEditor, QuoteEditorFields, Tab};

/// Notices shown after dashboard actions.
pub mod messages {
    pub const FETCH_FAILED: &str = "Failed to fetch quotes";
    pub const QUOTE_UPDATED: &str = "Quote updated successfully";
    pub const QUOTE_UPDATE_FAILED: &str = "Failed to update quote";
    pub const QUOTE_DELETED: &str = "Quote deleted successfully";
    pub const QUOTE_DELETE_FAILED: &str = "Failed to delete quote";
    pub const USER_CREATE_FAILED: &str = "Failed to create user";
    pub const USER_DELETED: &str = "Admin user deleted successfully";
    pub const USER_DELETE_FAILED: &str = "Failed to delete user";

    /// Success notice for a new admin user.
    #[must_use]
    pub fn user_created(email: &fresh_shine_core::Email) -> String {
        format!("Admin user created successfully. Email: {email}")
    }
}

/// Errors from dashboard flows.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Caught before any backend call.
    #[error("{0}")]
    Validation(String),

    /// The acting admin may not manage admin users.
    #[error("Only super admins can manage admin users")]
    Forbidden,

    #[error("Quote not found")]
    QuoteNotFound,

    /// The auth identity exists but its `admin_users` row could not be
    /// written. Nothing is rolled back.
    #[error(
        "Login identity for {email} was created but the admin profile could not be saved. \
         Remove the identity in the auth console before retrying."
    )]
    OrphanedIdentity {
        email: Email,
        user_id: AdminUserId,
        #[source]
        source: BackendError,
    },

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

impl DashboardError {
    /// Message safe to show the admin; `fallback` stands in for opaque
    /// backend failures.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Backend(BackendError::Conflict(message)) => message.clone(),
            Self::Backend(BackendError::Rejected { status, message })
                if (400..500).contains(status) && !message.is_empty() =>
            {
                message.clone()
            }
            Self::Backend(_) => fallback.to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the admin's own session was rejected by the backend.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Backend(BackendError::Unauthorized))
    }
}

/// Dashboard operations on behalf of one signed-in admin.
///
/// `repo` acts with the admin's own token; `auth` creates new identities.
pub struct DashboardService<R, A> {
    pub repo: R,
    pub auth: A,
}

impl<R, A> DashboardService<R, A>
where
    R: QuoteRepository + AdminUserRepository,
{
    /// Fetch both tables and build the dashboard.
    ///
    /// A failed admin user read is logged and shown as an empty list; a
    /// failed quote read fails the load.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Backend`] if the quotes cannot be read.
    #[instrument(skip(self, viewer), fields(viewer = %viewer.id))]
    pub async fn load(
        &self,
        viewer: &CurrentAdmin,
        filter: StatusFilter,
        tab: Tab,
    ) -> Result<DashboardView, DashboardError> {
        let (quotes, admin_users) =
            tokio::join!(self.repo.list_quotes(), self.repo.list_admin_users());
        let quotes = quotes?;
        let admin_users = admin_users.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to fetch admin users");
            Vec::new()
        });

        Ok(DashboardView::new(quotes, admin_users, viewer.role)
            .with_filter(filter)
            .with_tab(tab))
    }

    /// # Errors
    ///
    /// Returns [`DashboardError::QuoteNotFound`] if no fetched quote has `id`.
    pub async fn find_quote(&self, id: QuoteId) -> Result<Quote, DashboardError> {
        self.repo
            .list_quotes()
            .await?
            .into_iter()
            .find(|quote| quote.id == id)
            .ok_or(DashboardError::QuoteNotFound)
    }

    /// Save the three editable fields of one quote.
    ///
    /// # Errors
    ///
    /// Returns a validation error without calling the backend, or the
    /// backend failure.
    #[instrument(skip(self, fields))]
    pub async fn save_quote(
        &self,
        id: QuoteId,
        fields: &QuoteEditorFields,
    ) -> Result<QuotePatch, DashboardError> {
        let patch = fields.to_patch()?;
        self.repo.update_quote(id, &patch).await.map_err(|e| match e {
            BackendError::NotFound => DashboardError::QuoteNotFound,
            other => DashboardError::Backend(other),
        })?;
        tracing::info!(quote_id = %id, status = %patch.status, "Quote updated");
        Ok(patch)
    }

    /// Editor to show again after a failed save.
    ///
    /// The submitted fields survive even when the quote cannot be re-read.
    #[instrument(skip(self, fields, message))]
    pub async fn reopen_after_failed_save(
        &self,
        id: QuoteId,
        fields: QuoteEditorFields,
        message: impl Into<String>,
    ) -> QuoteEditor {
        let editor = match self.find_quote(id).await {
            Ok(quote) => QuoteEditor::with_fields(quote, fields),
            Err(e) => {
                tracing::warn!(error = %e, quote_id = %id, "Could not re-read quote after failed save");
                QuoteEditor::detached(id, fields)
            }
        };
        editor.failed(message)
    }

    /// # Errors
    ///
    /// Returns the backend failure; the row is left intact.
    #[instrument(skip(self))]
    pub async fn delete_quote(&self, id: QuoteId) -> Result<(), DashboardError> {
        self.repo.delete_quote(id).await.map_err(|e| match e {
            BackendError::NotFound => DashboardError::QuoteNotFound,
            other => DashboardError::Backend(other),
        })?;
        tracing::info!(quote_id = %id, "Quote deleted");
        Ok(())
    }

    /// Delete an `admin_users` row. The auth identity is not removed.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Forbidden`] unless `actor` is a super admin,
    /// a validation error when deleting yourself, or the backend failure.
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn delete_admin_user(
        &self,
        actor: &CurrentAdmin,
        id: AdminUserId,
    ) -> Result<(), DashboardError> {
        if !actor.can_manage_users() {
            return Err(DashboardError::Forbidden);
        }
        if actor.id == id {
            return Err(DashboardError::Validation(
                "You cannot delete your own account".to_string(),
            ));
        }
        self.repo.delete_admin_user(id).await?;
        tracing::info!(admin_user_id = %id, "Admin user deleted");
        Ok(())
    }
}

impl<R, A> DashboardService<R, A>
where
    R: AdminUserRepository,
    A: AuthProvider,
{
    /// Create an auth identity, then its `admin_users` row with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Forbidden`] unless `actor` is a super admin,
    /// a validation error, the sign-up failure, or
    /// [`DashboardError::OrphanedIdentity`] if the row insert fails after
    /// the identity was created.
    #[instrument(skip(self, actor, form), fields(actor = %actor.id, email = %form.email.trim()))]
    pub async fn create_admin_user(
        &self,
        actor: &CurrentAdmin,
        form: &NewAdminUserForm,
    ) -> Result<NewAdminUser, DashboardError> {
        if !actor.can_manage_users() {
            return Err(DashboardError::Forbidden);
        }
        let valid = form.validate()?;

        let identity = self.auth.sign_up(&valid.email, &valid.password).await?;
        let row = NewAdminUser::new(identity.id, valid.email, valid.full_name, valid.role);

        if let Err(source) = self.repo.insert_admin_user(&row).await {
            tracing::error!(
                error = %source,
                user_id = %identity.id,
                email = %row.email,
                "Admin identity created without admin_users row"
            );
            return Err(DashboardError::OrphanedIdentity {
                email: row.email,
                user_id: identity.id,
                source,
            });
        }

        tracing::info!(admin_user_id = %row.id, role = %row.role, "Admin user created");
        Ok(row)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use fresh_shine_core::{
        AdminRole, AdminUser, AuthSession, AuthUser, BackendResult, QuoteStatus, ServiceType,
    };
    use secrecy::SecretString;

    use super::*;

    #[derive(Default)]
    struct MockRepo {
        quotes: Mutex<Vec<Quote>>,
        users: Mutex<Vec<AdminUser>>,
        fail_users_read: bool,
        fail_insert: bool,
        fail_quotes: bool,
        updates: Mutex<Vec<(QuoteId, QuotePatch)>>,
    }

    impl QuoteRepository for MockRepo {
        async fn list_quotes(&self) -> BackendResult<Vec<Quote>> {
            if self.fail_quotes {
                return Err(BackendError::Transport("connection reset".to_string()));
            }
            Ok(self.quotes.lock().unwrap().clone())
        }

        async fn update_quote(&self, id: QuoteId, patch: &QuotePatch) -> BackendResult<()> {
            if self.fail_quotes {
                return Err(BackendError::Transport("connection reset".to_string()));
            }
            let mut quotes = self.quotes.lock().unwrap();
            let quote = quotes
                .iter_mut()
                .find(|q| q.id == id)
                .ok_or(BackendError::NotFound)?;
            *quote = quote.with_patch(patch);
            self.updates.lock().unwrap().push((id, patch.clone()));
            Ok(())
        }

        async fn delete_quote(&self, id: QuoteId) -> BackendResult<()> {
            let mut quotes = self.quotes.lock().unwrap();
            let before = quotes.len();
            quotes.retain(|q| q.id != id);
            if quotes.len() == before {
                return Err(BackendError::NotFound);
            }
            Ok(())
        }
    }

    impl AdminUserRepository for MockRepo {
        async fn list_admin_users(&self) -> BackendResult<Vec<AdminUser>> {
            if self.fail_users_read {
                return Err(BackendError::Transport("timeout".to_string()));
            }
            Ok(self.users.lock().unwrap().clone())
        }

        async fn find_admin_user(&self, id: AdminUserId) -> BackendResult<Option<AdminUser>> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }

        async fn insert_admin_user(&self, user: &NewAdminUser) -> BackendResult<()> {
            if self.fail_insert {
                return Err(BackendError::Rejected {
                    status: 403,
                    message: "new row violates row-level security policy".to_string(),
                });
            }
            self.users.lock().unwrap().push(AdminUser {
                id: user.id,
                email: user.email.clone(),
                full_name: user.full_name.clone(),
                role: user.role,
                created_at: Utc::now(),
            });
            Ok(())
        }

        async fn delete_admin_user(&self, id: AdminUserId) -> BackendResult<()> {
            self.users.lock().unwrap().retain(|u| u.id != id);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockAuth {
        sign_ups: Mutex<Vec<Email>>,
    }

    impl AuthProvider for MockAuth {
        async fn sign_in_with_password(
            &self,
            _email: &Email,
            _password: &SecretString,
        ) -> BackendResult<AuthSession> {
            Err(BackendError::Unauthorized)
        }

        async fn refresh_session(&self, _refresh_token: &SecretString) -> BackendResult<AuthSession> {
            Err(BackendError::Unauthorized)
        }

        async fn get_user(&self, _access_token: &SecretString) -> BackendResult<AuthUser> {
            Err(BackendError::Unauthorized)
        }

        async fn sign_out(&self, _access_token: &SecretString) -> BackendResult<()> {
            Ok(())
        }

        async fn sign_up(&self, email: &Email, _password: &SecretString) -> BackendResult<AuthUser> {
            self.sign_ups.lock().unwrap().push(email.clone());
            Ok(AuthUser {
                id: AdminUserId::random(),
                email: email.clone(),
            })
        }
    }

    fn admin(role: AdminRole) -> CurrentAdmin {
        CurrentAdmin {
            id: AdminUserId::random(),
            email: Email::parse("lead@freshshine.co.uk").unwrap(),
            full_name: None,
            role,
        }
    }

    fn quote(status: QuoteStatus) -> Quote {
        Quote {
            id: QuoteId::random(),
            created_at: Utc::now(),
            service_type: ServiceType::Student,
            address: "Flat 2, 9 Oxford Rd".to_string(),
            postcode: Some("M13 9PL".to_string()),
            bedrooms: Some("4".to_string()),
            bathrooms: Some("2".to_string()),
            preferred_date: None,
            preferred_time: Some("09:00".to_string()),
            email: Email::parse("student@example.ac.uk").unwrap(),
            phone: "07700 900456".to_string(),
            status,
            quote_amount: None,
            admin_notes: None,
        }
    }

    fn service(repo: MockRepo) -> DashboardService<MockRepo, MockAuth> {
        DashboardService {
            repo,
            auth: MockAuth::default(),
        }
    }

    fn new_user_form() -> NewAdminUserForm {
        NewAdminUserForm {
            email: "new@freshshine.co.uk".to_string(),
            password: "s3cure-enough".to_string(),
            full_name: "Sam Okafor".to_string(),
            role: "admin".to_string(),
            status: String::new(),
        }
    }

    #[tokio::test]
    async fn test_load_survives_admin_user_read_failure() {
        let repo = MockRepo {
            fail_users_read: true,
            ..MockRepo::default()
        };
        repo.quotes.lock().unwrap().push(quote(QuoteStatus::Pending));
        let view = service(repo)
            .load(&admin(AdminRole::Admin), StatusFilter::All, Tab::Quotes)
            .await
            .unwrap();
        assert_eq!(view.stats.total, 1);
        assert!(view.admin_users.is_empty());
        assert!(!view.can_manage_users);
    }

    #[tokio::test]
    async fn test_save_quote_touches_only_editable_fields() {
        let original = quote(QuoteStatus::Pending);
        let repo = MockRepo::default();
        repo.quotes.lock().unwrap().push(original.clone());
        let service = service(repo);

        let fields = QuoteEditorFields {
            status: "quoted".to_string(),
            quote_amount: "£120.5".to_string(),
            admin_notes: "Two hour job".to_string(),
        };
        service.save_quote(original.id, &fields).await.unwrap();

        let stored = service.find_quote(original.id).await.unwrap();
        assert_eq!(stored.status, QuoteStatus::Quoted);
        assert_eq!(stored.quote_amount.unwrap().to_string(), "£120.50");
        assert_eq!(stored.admin_notes.as_deref(), Some("Two hour job"));
        assert_eq!(
            Quote {
                status: original.status,
                quote_amount: original.quote_amount,
                admin_notes: original.admin_notes.clone(),
                ..stored
            },
            original
        );
    }

    #[tokio::test]
    async fn test_invalid_edit_makes_no_call() {
        let original = quote(QuoteStatus::Pending);
        let repo = MockRepo::default();
        repo.quotes.lock().unwrap().push(original.clone());
        let service = service(repo);

        let fields = QuoteEditorFields {
            status: "archived".to_string(),
            ..QuoteEditorFields::default()
        };
        let err = service.save_quote(original.id, &fields).await.unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
        assert!(service.repo.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_and_failed_reread_keep_edits() {
        let original = quote(QuoteStatus::Pending);
        let repo = MockRepo {
            fail_quotes: true,
            ..MockRepo::default()
        };
        repo.quotes.lock().unwrap().push(original.clone());
        let service = service(repo);

        let fields = QuoteEditorFields {
            status: "approved".to_string(),
            quote_amount: "95".to_string(),
            admin_notes: "Keys under the mat".to_string(),
        };
        let err = service.save_quote(original.id, &fields).await.unwrap_err();
        assert!(matches!(err, DashboardError::Backend(_)));

        let editor = service
            .reopen_after_failed_save(original.id, fields.clone(), messages::QUOTE_UPDATE_FAILED)
            .await;
        assert_eq!(editor.id, original.id);
        assert_eq!(editor.quote, None);
        assert_eq!(editor.fields, fields);
        assert_eq!(editor.error.as_deref(), Some(messages::QUOTE_UPDATE_FAILED));
        assert!(service.repo.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_reopens_with_stored_details() {
        let original = quote(QuoteStatus::Pending);
        let repo = MockRepo::default();
        repo.quotes.lock().unwrap().push(original.clone());
        let service = service(repo);

        let fields = QuoteEditorFields {
            status: "quoted".to_string(),
            quote_amount: "-4".to_string(),
            admin_notes: String::new(),
        };
        let editor = service
            .reopen_after_failed_save(original.id, fields.clone(), "Quote amount cannot be negative")
            .await;
        assert_eq!(editor.quote, Some(original));
        assert_eq!(editor.fields, fields);
    }

    #[tokio::test]
    async fn test_delete_quote_removes_exactly_that_id() {
        let keep = quote(QuoteStatus::Approved);
        let gone = quote(QuoteStatus::Rejected);
        let repo = MockRepo::default();
        repo.quotes.lock().unwrap().extend([keep.clone(), gone.clone()]);
        let service = service(repo);

        service.delete_quote(gone.id).await.unwrap();
        let remaining = service.repo.list_quotes().await.unwrap();
        assert_eq!(remaining, vec![keep]);

        let err = service.delete_quote(gone.id).await.unwrap_err();
        assert!(matches!(err, DashboardError::QuoteNotFound));
    }

    #[tokio::test]
    async fn test_create_admin_user_two_steps() {
        let service = service(MockRepo::default());
        let row = service
            .create_admin_user(&admin(AdminRole::SuperAdmin), &new_user_form())
            .await
            .unwrap();
        assert_eq!(row.full_name.as_deref(), Some("Sam Okafor"));
        assert_eq!(
            messages::user_created(&row.email),
            "Admin user created successfully. Email: new@freshshine.co.uk"
        );
        let users = service.repo.users.lock().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users.first().unwrap().id, row.id);
    }

    #[tokio::test]
    async fn test_non_super_admin_cannot_manage_users() {
        let service = service(MockRepo::default());
        let err = service
            .create_admin_user(&admin(AdminRole::Admin), &new_user_form())
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Forbidden));
        assert!(service.auth.sign_ups.lock().unwrap().is_empty());

        let err = service
            .delete_admin_user(&admin(AdminRole::Admin), AdminUserId::random())
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Forbidden));
    }

    #[tokio::test]
    async fn test_missing_password_makes_no_sign_up() {
        let service = service(MockRepo::default());
        let form = NewAdminUserForm {
            password: String::new(),
            ..new_user_form()
        };
        let err = service
            .create_admin_user(&admin(AdminRole::SuperAdmin), &form)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(messages::USER_CREATE_FAILED), "Email and password are required");
        assert!(service.auth.sign_ups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_insert_reports_orphaned_identity() {
        let service = service(MockRepo {
            fail_insert: true,
            ..MockRepo::default()
        });
        let err = service
            .create_admin_user(&admin(AdminRole::SuperAdmin), &new_user_form())
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::OrphanedIdentity { .. }));
        assert!(err.user_message(messages::USER_CREATE_FAILED).contains("new@freshshine.co.uk"));
        assert_eq!(service.auth.sign_ups.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cannot_delete_self() {
        let actor = admin(AdminRole::SuperAdmin);
        let err = service(MockRepo::default())
            .delete_admin_user(&actor, actor.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
    }

    #[test]
    fn test_backend_failures_use_fallback_message() {
        let err = DashboardError::Backend(BackendError::Transport("reset".to_string()));
        assert_eq!(err.user_message(messages::QUOTE_UPDATE_FAILED), "Failed to update quote");

        let err = DashboardError::Backend(BackendError::Conflict("User already registered".to_string()));
        assert_eq!(err.user_message(messages::USER_CREATE_FAILED), "User already registered");
    }
}
