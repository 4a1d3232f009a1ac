//! Quote edit and delete handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use fresh_shine_core::QuoteId;
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    error::AppError,
    filters,
    middleware::{RequireAdminAuth, set_flash},
    models::Flash,
    services::{DashboardError, dashboard::messages},
    state::AppState,
    views::{QuoteEditor, QuoteEditorFields, forms::StatusOption},
};

use super::dashboard::{AdminUserView, QuoteRow};

/// Quote edit page template.
#[derive(Template)]
#[template(path = "quotes/edit.html")]
pub struct QuoteEditTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub row: Option<QuoteRow>,
    pub editor: QuoteEditor,
    pub status_options: Vec<StatusOption>,
}

impl QuoteEditTemplate {
    fn new(admin_user: AdminUserView, editor: QuoteEditor) -> Self {
        Self {
            admin_user,
            current_path: "/dashboard".to_string(),
            flash: None,
            row: editor.quote.as_ref().map(QuoteRow::from),
            status_options: editor.status_options(),
            editor,
        }
    }
}

/// Confirmation page shared by destructive actions.
#[derive(Template)]
#[template(path = "confirm.html")]
pub struct ConfirmTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub title: String,
    pub message: &'static str,
    pub action: String,
    pub cancel_href: String,
}

/// Shown before a quote is deleted.
pub const CONFIRM_DELETE_QUOTE: &str = "Are you sure you want to delete this quote?";

async fn back_to_dashboard(session: &Session, flash: Flash) -> Result<Response, AppError> {
    set_flash(session, flash).await?;
    Ok(Redirect::to("/dashboard").into_response())
}

/// Open the quote editor.
///
/// GET /quotes/{id}
#[instrument(skip(state, session, auth))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<QuoteId>,
) -> Result<Response, AppError> {
    let quote = match state.dashboard(&auth.access_token).find_quote(id).await {
        Ok(quote) => quote,
        Err(DashboardError::QuoteNotFound) => {
            return Err(AppError::NotFound(format!("quote {id}")));
        }
        Err(e) => {
            tracing::error!(error = %e, quote_id = %id, "Failed to load quote");
            return back_to_dashboard(&session, Flash::error(messages::FETCH_FAILED)).await;
        }
    };

    let template = QuoteEditTemplate::new(AdminUserView::from(&auth.admin), QuoteEditor::open(quote));
    Ok(Html(template.render()?).into_response())
}

/// Save status, amount and notes.
///
/// POST /quotes/{id}
///
/// On failure the editor is shown again with the submitted values.
#[instrument(skip(state, session, auth, fields))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<QuoteId>,
    Form(fields): Form<QuoteEditorFields>,
) -> Result<Response, AppError> {
    let dashboard = state.dashboard(&auth.access_token);
    let err = match dashboard.save_quote(id, &fields).await {
        Ok(_) => return back_to_dashboard(&session, Flash::success(messages::QUOTE_UPDATED)).await,
        Err(err) => err,
    };

    let status = if matches!(err, DashboardError::Validation(_)) {
        tracing::info!(error = %err, quote_id = %id, "Quote edit rejected by validation");
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        tracing::error!(error = %err, quote_id = %id, "Failed to update quote");
        StatusCode::BAD_GATEWAY
    };
    let message = err.user_message(messages::QUOTE_UPDATE_FAILED);

    let editor = dashboard.reopen_after_failed_save(id, fields, message).await;
    let template = QuoteEditTemplate::new(AdminUserView::from(&auth.admin), editor);
    Ok((status, Html(template.render()?)).into_response())
}

/// Ask before deleting a quote.
///
/// GET /quotes/{id}/delete
pub async fn confirm_delete(
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<QuoteId>,
) -> Result<Html<String>, AppError> {
    let template = ConfirmTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/dashboard".to_string(),
        flash: None,
        title: "Delete quote".to_string(),
        message: CONFIRM_DELETE_QUOTE,
        action: format!("/quotes/{id}/delete"),
        cancel_href: "/dashboard".to_string(),
    };
    Ok(Html(template.render()?))
}

/// Delete a quote.
///
/// POST /quotes/{id}/delete
#[instrument(skip(state, session, auth))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(auth): RequireAdminAuth,
    Path(id): Path<QuoteId>,
) -> Result<Response, AppError> {
    let flash = match state.dashboard(&auth.access_token).delete_quote(id).await {
        Ok(()) => Flash::success(messages::QUOTE_DELETED),
        Err(e) => {
            tracing::error!(error = %e, quote_id = %id, "Failed to delete quote");
            Flash::error(e.user_message(messages::QUOTE_DELETE_FAILED))
        }
    };
    back_to_dashboard(&session, flash).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use fresh_shine_core::{AdminRole, AdminUserId, Email, Quote, QuoteStatus, ServiceType};

    use super::*;
    use crate::models::CurrentAdmin;

    fn viewer() -> AdminUserView {
        AdminUserView::from(&CurrentAdmin {
            id: AdminUserId::random(),
            email: Email::parse("ops@freshshine.co.uk").unwrap(),
            full_name: None,
            role: AdminRole::Admin,
        })
    }

    fn quote() -> Quote {
        Quote {
            id: QuoteId::random(),
            created_at: Utc::now(),
            service_type: ServiceType::Commercial,
            address: "4 Canal Street".to_string(),
            postcode: Some("M1 3HE".to_string()),
            bedrooms: None,
            bathrooms: None,
            preferred_date: None,
            preferred_time: None,
            email: Email::parse("c@d.com").unwrap(),
            phone: "0161 555 0199".to_string(),
            status: QuoteStatus::Quoted,
            quote_amount: None,
            admin_notes: Some("Call after 5".to_string()),
        }
    }

    #[test]
    fn test_editor_prefills_working_copy() {
        let html = QuoteEditTemplate::new(viewer(), QuoteEditor::open(quote()))
            .render()
            .unwrap();
        assert!(html.contains("4 Canal Street"));
        assert!(html.contains("Call after 5"));
        assert!(html.contains(r#"value="quoted" selected"#));
    }

    #[test]
    fn test_failed_save_keeps_edits() {
        let fields = QuoteEditorFields {
            status: "approved".to_string(),
            quote_amount: "abc".to_string(),
            admin_notes: "Booked for Friday".to_string(),
        };
        let editor = QuoteEditor::with_fields(quote(), fields).failed("Failed to update quote");
        let html = QuoteEditTemplate::new(viewer(), editor).render().unwrap();
        assert!(html.contains("Booked for Friday"));
        assert!(html.contains("abc"));
        assert!(html.contains("Failed to update quote"));
        assert!(html.contains(r#"value="approved" selected"#));
    }

    #[test]
    fn test_detached_editor_still_posts_edits() {
        let id = QuoteId::random();
        let fields = QuoteEditorFields {
            status: "rejected".to_string(),
            quote_amount: "60".to_string(),
            admin_notes: "Out of area".to_string(),
        };
        let editor = QuoteEditor::detached(id, fields).failed("Failed to update quote");
        let html = QuoteEditTemplate::new(viewer(), editor).render().unwrap();
        assert!(html.contains(&format!(r#"action="/quotes/{id}""#)));
        assert!(html.contains("Out of area"));
        assert!(html.contains(r#"value="60""#));
        assert!(html.contains("Failed to update quote"));
        assert!(html.contains("Quote details are unavailable"));
    }
}
