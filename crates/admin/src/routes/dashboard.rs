//! Dashboard route handler.

use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use fresh_shine_core::{AdminRole, AdminUser, Quote, StatusFilter};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    error::AppError,
    filters,
    middleware::{RequireAdminAuth, take_flash},
    models::{AdminSession, CurrentAdmin, Flash},
    services::dashboard::messages,
    state::AppState,
    views::{DashboardView, NewAdminUserForm, Tab},
};

/// Signed-in admin as shown in the page chrome.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_super_admin: bool,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.display_name().to_string(),
            email: admin.email.to_string(),
            role: admin.role.to_string(),
            is_super_admin: admin.role == AdminRole::SuperAdmin,
        }
    }
}

/// One row of the quote table.
#[derive(Debug, Clone)]
pub struct QuoteRow {
    pub id: String,
    pub created: String,
    pub service: &'static str,
    pub address: String,
    pub postcode: String,
    pub email: String,
    pub phone: String,
    pub preferred: String,
    pub status: &'static str,
    pub badge: &'static str,
    pub amount: String,
}

impl From<&Quote> for QuoteRow {
    fn from(quote: &Quote) -> Self {
        let preferred = match (&quote.preferred_date, &quote.preferred_time) {
            (Some(date), Some(time)) => format!("{} {time}", date.format("%d/%m/%Y")),
            (Some(date), None) => date.format("%d/%m/%Y").to_string(),
            (None, Some(time)) => time.clone(),
            (None, None) => "-".to_string(),
        };
        Self {
            id: quote.id.to_string(),
            created: quote.created_at.format("%d/%m/%Y").to_string(),
            service: quote.service_type.label(),
            address: quote.address.clone(),
            postcode: quote.postcode.clone().unwrap_or_default(),
            email: quote.email.to_string(),
            phone: quote.phone.clone(),
            preferred,
            status: quote.status.label(),
            badge: quote.status.badge_color(),
            amount: quote
                .quote_amount
                .map_or_else(|| "-".to_string(), |amount| amount.to_string()),
        }
    }
}

/// One row of the admin user table.
#[derive(Debug, Clone)]
pub struct AdminUserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created: String,
    pub is_self: bool,
}

impl AdminUserRow {
    fn new(user: &AdminUser, viewer: &CurrentAdmin) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.display_name().to_string(),
            email: user.email.to_string(),
            role: user.role.to_string(),
            created: user.created_at.format("%d/%m/%Y").to_string(),
            is_self: user.id == viewer.id,
        }
    }
}

/// A tab link in the dashboard header.
#[derive(Debug, Clone)]
pub struct TabLink {
    pub href: String,
    pub label: &'static str,
    pub active: bool,
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub view: DashboardView,
    pub tabs: Vec<TabLink>,
    pub users_tab: bool,
    pub quotes: Vec<QuoteRow>,
    pub users: Vec<AdminUserRow>,
    pub new_user: NewAdminUserForm,
    pub realtime: bool,
}

impl DashboardTemplate {
    #[must_use]
    pub fn new(
        admin: &CurrentAdmin,
        view: DashboardView,
        flash: Option<Flash>,
        new_user: NewAdminUserForm,
        realtime: bool,
    ) -> Self {
        let quotes = view.visible_quotes().into_iter().map(QuoteRow::from).collect();
        let users = view
            .admin_users
            .iter()
            .map(|user| AdminUserRow::new(user, admin))
            .collect();
        let users_tab = view.tab == Tab::Users;
        let tabs = [Tab::Quotes, Tab::Users]
            .into_iter()
            .map(|tab| TabLink {
                href: format!(
                    "/dashboard?tab={}&status={}",
                    tab.as_str(),
                    view.filter.as_query_value()
                ),
                label: tab.label(),
                active: tab == view.tab,
            })
            .collect();
        Self {
            admin_user: AdminUserView::from(admin),
            current_path: "/dashboard".to_string(),
            flash,
            view,
            tabs,
            users_tab,
            quotes,
            users,
            new_user,
            realtime,
        }
    }
}

/// Dashboard query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub status: Option<String>,
    pub tab: Option<String>,
}

impl DashboardQuery {
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] for an unknown status.
    pub fn filter(&self) -> Result<StatusFilter, AppError> {
        StatusFilter::parse(self.status.as_deref()).map_err(AppError::BadRequest)
    }

    #[must_use]
    pub fn tab(&self) -> Tab {
        Tab::parse(self.tab.as_deref())
    }
}

/// GET /
pub async fn index() -> Redirect {
    Redirect::to("/dashboard")
}

/// Dashboard page handler.
///
/// GET /dashboard?status=&tab=
#[instrument(skip_all, fields(admin = %auth.admin.id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(auth): RequireAdminAuth,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, AppError> {
    let filter = query.filter()?;
    let flash = take_flash(&session).await;
    render(
        &state,
        &auth,
        filter,
        query.tab(),
        flash,
        NewAdminUserForm::default(),
        StatusCode::OK,
    )
    .await
}

/// Load both tables and render the dashboard.
///
/// A failed load still renders the page, with empty tables and an error.
pub(crate) async fn render(
    state: &AppState,
    auth: &AdminSession,
    filter: StatusFilter,
    tab: Tab,
    flash: Option<Flash>,
    new_user: NewAdminUserForm,
    status: StatusCode,
) -> Result<Response, AppError> {
    let dashboard = state.dashboard(&auth.access_token);
    let (view, flash) = match dashboard.load(&auth.admin, filter, tab).await {
        Ok(view) => (view, flash),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load dashboard");
            let view = DashboardView::new(Vec::new(), Vec::new(), auth.admin.role)
                .with_filter(filter)
                .with_tab(tab);
            (view, Some(Flash::error(messages::FETCH_FAILED)))
        }
    };

    let template = DashboardTemplate::new(
        &auth.admin,
        view,
        flash,
        new_user,
        state.config().realtime_enabled,
    );
    Ok((status, Html(template.render()?)).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use fresh_shine_core::{AdminUserId, Email, QuoteId, QuoteStatus, ServiceType};

    use super::*;

    fn admin(role: AdminRole) -> CurrentAdmin {
        CurrentAdmin {
            id: AdminUserId::random(),
            email: Email::parse("ops@freshshine.co.uk").unwrap(),
            full_name: Some("Ops".to_string()),
            role,
        }
    }

    fn quote(status: QuoteStatus) -> Quote {
        Quote {
            id: QuoteId::random(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            service_type: ServiceType::EndOfLease,
            address: "12 Mill Lane".to_string(),
            postcode: None,
            bedrooms: Some("2".to_string()),
            bathrooms: None,
            preferred_date: None,
            preferred_time: Some("morning".to_string()),
            email: Email::parse("a@b.com").unwrap(),
            phone: "0161 555 0100".to_string(),
            status,
            quote_amount: None,
            admin_notes: None,
        }
    }

    fn other_user() -> AdminUser {
        AdminUser {
            id: AdminUserId::random(),
            email: Email::parse("colleague@freshshine.co.uk").unwrap(),
            full_name: None,
            role: AdminRole::Admin,
            created_at: Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_quote_row_formats_fields() {
        let row = QuoteRow::from(&quote(QuoteStatus::Approved));
        assert_eq!(row.created, "01/05/2024");
        assert_eq!(row.service, "End of Lease Cleaning");
        assert_eq!(row.preferred, "morning");
        assert_eq!(row.badge, "green");
        assert_eq!(row.amount, "-");
    }

    #[test]
    fn test_regular_admin_sees_read_only_user_list() {
        let viewer = admin(AdminRole::Admin);
        let view = DashboardView::new(vec![quote(QuoteStatus::Pending)], vec![other_user()], viewer.role)
            .with_tab(Tab::Users);
        let html = DashboardTemplate::new(&viewer, view, None, NewAdminUserForm::default(), false)
            .render()
            .unwrap();
        assert!(html.contains("colleague@freshshine.co.uk"));
        assert!(!html.contains("Add User"));
        assert!(!html.contains("/delete\""));
    }

    #[test]
    fn test_super_admin_sees_user_controls() {
        let viewer = admin(AdminRole::SuperAdmin);
        let view = DashboardView::new(Vec::new(), vec![other_user()], viewer.role)
            .with_tab(Tab::Users);
        let html = DashboardTemplate::new(&viewer, view, None, NewAdminUserForm::default(), false)
            .render()
            .unwrap();
        assert!(html.contains("Add User"));
        assert!(html.contains("/delete\""));
    }

    #[test]
    fn test_add_user_form_keeps_active_filter() {
        let viewer = admin(AdminRole::SuperAdmin);
        let view = DashboardView::new(Vec::new(), vec![other_user()], viewer.role)
            .with_filter(StatusFilter::Only(QuoteStatus::Approved))
            .with_tab(Tab::Users);
        let html = DashboardTemplate::new(&viewer, view, None, NewAdminUserForm::default(), false)
            .render()
            .unwrap();
        assert!(html.contains(r#"<input type="hidden" name="status" value="approved">"#));
    }

    #[test]
    fn test_filter_limits_rendered_rows() {
        let viewer = admin(AdminRole::Admin);
        let quotes = vec![
            quote(QuoteStatus::Approved),
            quote(QuoteStatus::Pending),
            quote(QuoteStatus::Approved),
        ];
        let view = DashboardView::new(quotes, Vec::new(), viewer.role)
            .with_filter(StatusFilter::Only(QuoteStatus::Approved));
        let template =
            DashboardTemplate::new(&viewer, view, None, NewAdminUserForm::default(), false);
        assert_eq!(template.quotes.len(), 2);
        assert_eq!(template.view.stats.total, 3);
    }

    #[test]
    fn test_bad_status_is_rejected() {
        let query = DashboardQuery {
            status: Some("archived".to_string()),
            tab: None,
        };
        assert!(matches!(query.filter(), Err(AppError::BadRequest(_))));
        assert_eq!(query.tab(), Tab::Quotes);
    }
}
