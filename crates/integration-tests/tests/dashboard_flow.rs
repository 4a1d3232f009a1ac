//! Admin dashboard flows against the in-memory backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use askama::Template;
use fresh_shine_admin::models::CurrentAdmin;
use fresh_shine_admin::routes::dashboard::DashboardTemplate;
use fresh_shine_admin::services::{DashboardError, DashboardService};
use fresh_shine_admin::views::{NewAdminUserForm, QuoteEditorFields, Tab};
use fresh_shine_core::{
    AdminRole, AdminUserRepository, Email, QuoteAmount, QuoteStatus, StatusFilter,
};
use fresh_shine_integration_tests::{MemoryBackend, quote_fixture};

fn service(backend: &MemoryBackend) -> DashboardService<MemoryBackend, MemoryBackend> {
    DashboardService {
        repo: backend.clone(),
        auth: backend.clone(),
    }
}

async fn admin(backend: &MemoryBackend, email: &str, role: AdminRole) -> CurrentAdmin {
    let id = backend.seed_admin(&Email::parse(email).unwrap(), "password1", role);
    let row = backend.find_admin_user(id).await.unwrap().unwrap();
    CurrentAdmin::from(&row)
}

/// Ten quotes, three of them approved.
fn seed_quotes(backend: &MemoryBackend) {
    for minutes in 0..10 {
        let status = if minutes % 3 == 0 && minutes > 0 {
            QuoteStatus::Approved
        } else {
            QuoteStatus::Pending
        };
        backend.seed_quote(quote_fixture(status, minutes));
    }
}

#[tokio::test]
async fn test_approved_filter_and_stats() {
    let backend = MemoryBackend::new();
    seed_quotes(&backend);
    let viewer = admin(&backend, "ops@freshshine.co.uk", AdminRole::Admin).await;

    let view = service(&backend)
        .load(&viewer, StatusFilter::parse(Some("approved")).unwrap(), Tab::Quotes)
        .await
        .unwrap();

    let visible = view.visible_quotes();
    assert_eq!(visible.len(), 3);
    assert!(visible.iter().all(|q| q.status == QuoteStatus::Approved));
    assert_eq!(view.stats.total, 10);
    assert_eq!(view.stats.approved, 3);
    assert_eq!(view.stats.pending, 7);
    assert!(
        visible
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at)
    );
}

#[tokio::test]
async fn test_delete_removes_only_that_quote() {
    let backend = MemoryBackend::new();
    seed_quotes(&backend);
    let target = quote_fixture(QuoteStatus::Contacted, 42);
    let id = target.id;
    backend.seed_quote(target);

    service(&backend).delete_quote(id).await.unwrap();

    assert_eq!(backend.quote_count(), 10);
    assert!(backend.quote(id).is_none());
    assert!(matches!(
        service(&backend).delete_quote(id).await,
        Err(DashboardError::QuoteNotFound)
    ));
}

#[tokio::test]
async fn test_save_changes_only_editable_fields() {
    let backend = MemoryBackend::new();
    let original = quote_fixture(QuoteStatus::Pending, 5);
    let id = original.id;
    backend.seed_quote(original.clone());

    let fields = QuoteEditorFields {
        status: "quoted".to_string(),
        quote_amount: "120.50".to_string(),
        admin_notes: "Two hour job".to_string(),
    };
    service(&backend).save_quote(id, &fields).await.unwrap();

    let saved = backend.quote(id).unwrap();
    assert_eq!(saved.status, QuoteStatus::Quoted);
    assert_eq!(
        saved.quote_amount,
        QuoteAmount::parse_optional("120.50").unwrap()
    );
    assert_eq!(saved.admin_notes.as_deref(), Some("Two hour job"));
    assert_eq!(saved.address, original.address);
    assert_eq!(saved.email, original.email);
    assert_eq!(saved.phone, original.phone);
    assert_eq!(saved.created_at, original.created_at);
    assert_eq!(saved.service_type, original.service_type);
}

#[tokio::test]
async fn test_invalid_amount_is_not_saved() {
    let backend = MemoryBackend::new();
    let original = quote_fixture(QuoteStatus::Pending, 5);
    let id = original.id;
    backend.seed_quote(original.clone());

    let fields = QuoteEditorFields {
        status: "quoted".to_string(),
        quote_amount: "lots".to_string(),
        admin_notes: String::new(),
    };
    let err = service(&backend).save_quote(id, &fields).await.unwrap_err();
    assert!(matches!(err, DashboardError::Validation(_)));
    assert_eq!(backend.quote(id).unwrap(), original);
}

fn new_user_form(email: &str) -> NewAdminUserForm {
    NewAdminUserForm {
        email: email.to_string(),
        password: "s3cure-enough".to_string(),
        full_name: "New Starter".to_string(),
        role: "admin".to_string(),
        status: String::new(),
    }
}

#[tokio::test]
async fn test_create_admin_user_links_identity_and_row() {
    let backend = MemoryBackend::new();
    let actor = admin(&backend, "boss@freshshine.co.uk", AdminRole::SuperAdmin).await;

    let created = service(&backend)
        .create_admin_user(&actor, &new_user_form("new@freshshine.co.uk"))
        .await
        .unwrap();

    let row = backend.find_admin_user(created.id).await.unwrap().unwrap();
    assert_eq!(row.email.as_str(), "new@freshshine.co.uk");
    assert_eq!(row.role, AdminRole::Admin);
    assert_eq!(row.full_name.as_deref(), Some("New Starter"));
    assert_eq!(backend.list_admin_users().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_failed_row_insert_reports_orphaned_identity() {
    let backend = MemoryBackend::new();
    let actor = admin(&backend, "boss@freshshine.co.uk", AdminRole::SuperAdmin).await;
    backend.fail_admin_user_inserts();

    let err = service(&backend)
        .create_admin_user(&actor, &new_user_form("half@freshshine.co.uk"))
        .await
        .unwrap_err();

    let email = Email::parse("half@freshshine.co.uk").unwrap();
    assert!(matches!(err, DashboardError::OrphanedIdentity { .. }));
    assert!(backend.has_identity(&email));
    assert_eq!(backend.list_admin_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_regular_admin_cannot_manage_users() {
    let backend = MemoryBackend::new();
    let actor = admin(&backend, "ops@freshshine.co.uk", AdminRole::Admin).await;
    let other = admin(&backend, "other@freshshine.co.uk", AdminRole::Admin).await;

    let err = service(&backend)
        .create_admin_user(&actor, &new_user_form("new@freshshine.co.uk"))
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::Forbidden));
    assert!(!backend.has_identity(&Email::parse("new@freshshine.co.uk").unwrap()));

    let err = service(&backend)
        .delete_admin_user(&actor, other.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::Forbidden));
    assert!(backend.find_admin_user(other.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_super_admin_deletes_row_but_not_self() {
    let backend = MemoryBackend::new();
    let actor = admin(&backend, "boss@freshshine.co.uk", AdminRole::SuperAdmin).await;
    let other = admin(&backend, "leaver@freshshine.co.uk", AdminRole::Admin).await;

    service(&backend)
        .delete_admin_user(&actor, other.id)
        .await
        .unwrap();
    assert!(backend.find_admin_user(other.id).await.unwrap().is_none());
    assert!(backend.has_identity(&other.email));

    let err = service(&backend)
        .delete_admin_user(&actor, actor.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::Validation(_)));
}

#[tokio::test]
async fn test_rendered_dashboard_hides_controls_from_regular_admin() {
    let backend = MemoryBackend::new();
    seed_quotes(&backend);
    let viewer = admin(&backend, "ops@freshshine.co.uk", AdminRole::Admin).await;
    admin(&backend, "other@freshshine.co.uk", AdminRole::Admin).await;

    let view = service(&backend)
        .load(&viewer, StatusFilter::All, Tab::Users)
        .await
        .unwrap();
    let html = DashboardTemplate::new(&viewer, view, None, NewAdminUserForm::default(), false)
        .render()
        .unwrap();

    assert!(html.contains("other@freshshine.co.uk"));
    assert!(!html.contains("Add User"));
    assert!(!html.contains("/admin-users/"));
}
