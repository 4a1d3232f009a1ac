//! Admin user management handlers (`super_admin` only).

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use fresh_shine_core::{AdminUserId, SessionEvent};
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    error::AppError,
    middleware::{RequireSuperAdmin, set_flash},
    models::Flash,
    services::{DashboardError, dashboard::messages},
    state::AppState,
    views::{NewAdminUserForm, Tab},
};

use super::dashboard::{self, AdminUserView};
use super::quotes::ConfirmTemplate;

/// Shown before an admin user is deleted.
pub const CONFIRM_DELETE_USER: &str = "Are you sure you want to delete this admin user?";

const USERS_TAB: &str = "/dashboard?tab=users";

/// Create an auth identity and its admin user row.
///
/// POST /admin-users
///
/// On failure the dashboard is shown again with the form filled in, minus
/// the password, under the status filter the form was submitted from.
#[instrument(skip_all, fields(admin = %auth.admin.id))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireSuperAdmin(auth): RequireSuperAdmin,
    Form(form): Form<NewAdminUserForm>,
) -> Result<Response, AppError> {
    let dashboard_service = state.dashboard(&auth.access_token);
    let err = match dashboard_service.create_admin_user(&auth.admin, &form).await {
        Ok(created) => {
            set_flash(&session, Flash::success(messages::user_created(&created.email))).await?;
            return Ok(Redirect::to(USERS_TAB).into_response());
        }
        Err(err) => err,
    };

    let status = match &err {
        DashboardError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DashboardError::Forbidden => StatusCode::FORBIDDEN,
        _ => StatusCode::BAD_GATEWAY,
    };
    if status == StatusCode::BAD_GATEWAY {
        tracing::error!(error = %err, "Failed to create admin user");
    }
    let flash = Flash::error(err.user_message(messages::USER_CREATE_FAILED));

    dashboard::render(
        &state,
        &auth,
        form.filter(),
        Tab::Users,
        Some(flash),
        form.without_password(),
        status,
    )
    .await
}

/// Ask before deleting an admin user.
///
/// GET /admin-users/{id}/delete
pub async fn confirm_delete(
    RequireSuperAdmin(auth): RequireSuperAdmin,
    Path(id): Path<AdminUserId>,
) -> Result<Html<String>, AppError> {
    let template = ConfirmTemplate {
        admin_user: AdminUserView::from(&auth.admin),
        current_path: "/dashboard".to_string(),
        flash: None,
        title: "Delete admin user".to_string(),
        message: CONFIRM_DELETE_USER,
        action: format!("/admin-users/{id}/delete"),
        cancel_href: USERS_TAB.to_string(),
    };
    Ok(Html(template.render()?))
}

/// Delete an admin user row.
///
/// POST /admin-users/{id}/delete
///
/// The deleted user's open dashboards are told to sign out; their next
/// request fails the role lookup.
#[instrument(skip(state, session, auth))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireSuperAdmin(auth): RequireSuperAdmin,
    Path(id): Path<AdminUserId>,
) -> Result<Response, AppError> {
    let flash = match state
        .dashboard(&auth.access_token)
        .delete_admin_user(&auth.admin, id)
        .await
    {
        Ok(()) => {
            state
                .session_events()
                .publish(SessionEvent::SignedOut { user_id: id });
            Flash::success(messages::USER_DELETED)
        }
        Err(e) => {
            tracing::error!(error = %e, admin_user_id = %id, "Failed to delete admin user");
            Flash::error(e.user_message(messages::USER_DELETE_FAILED))
        }
    };
    set_flash(&session, flash).await?;
    Ok(Redirect::to(USERS_TAB).into_response())
}
