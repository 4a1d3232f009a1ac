//! Booking page and quote submission handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use fresh_shine_core::ServiceType;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::booking::{
    BookingDraft, BookingError, BookingView, Notice, SUCCESS_MESSAGE, SubmitBooking,
};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// One `<option>` in a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

const BEDROOMS: &[(&str, &str)] = &[("1", "1"), ("2", "2"), ("3", "3"), ("4", "4"), ("5", "5+")];
const BATHROOMS: &[(&str, &str)] = &[("1", "1"), ("2", "2"), ("3", "3"), ("4", "4+")];

fn options(choices: &[(&'static str, &'static str)], current: &str) -> Vec<SelectOption> {
    choices
        .iter()
        .map(|&(value, label)| SelectOption {
            value,
            label,
            selected: value == current,
        })
        .collect()
}

/// Booking page template.
#[derive(Template, WebTemplate)]
#[template(path = "booking.html")]
pub struct BookingTemplate {
    pub view: BookingView,
    pub services: Vec<SelectOption>,
    pub bedrooms: Vec<SelectOption>,
    pub bathrooms: Vec<SelectOption>,
}

impl BookingTemplate {
    #[must_use]
    pub fn new(view: BookingView) -> Self {
        let draft = &view.draft;
        let services = ServiceType::ALL
            .into_iter()
            .map(|service| SelectOption {
                value: service.as_str(),
                label: service.label(),
                selected: service.as_str() == draft.service_type,
            })
            .collect();
        let bedrooms = options(BEDROOMS, &draft.bedrooms);
        let bathrooms = options(BATHROOMS, &draft.bathrooms);
        Self {
            view,
            services,
            bedrooms,
            bathrooms,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Query parameters for the booking page.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Set after a successful HTML submission (post/redirect/get).
    pub submitted: Option<String>,
}

/// Display the booking page.
///
/// GET /
pub async fn page(Query(query): Query<PageQuery>) -> impl IntoResponse {
    let notice = query
        .submitted
        .is_some()
        .then(|| Notice::success(SUCCESS_MESSAGE));
    BookingTemplate::new(BookingView {
        draft: BookingDraft::default(),
        notice,
    })
}

fn failure_status(err: &BookingError) -> StatusCode {
    if err.is_validation() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::BAD_GATEWAY
    }
}

fn log_failure(err: &BookingError) {
    if err.is_validation() {
        tracing::info!(error = %err, "Booking rejected by validation");
    } else {
        tracing::error!(error = %err, "Booking submission failed");
    }
}

/// Handle the booking form.
///
/// POST /quote
///
/// Redirects back to the page on success; re-renders the form with the
/// entered values on failure.
#[instrument(skip(state, draft), fields(service_type = %draft.service_type))]
pub async fn submit(
    State(state): State<AppState>,
    Form(draft): Form<BookingDraft>,
) -> Result<Response, AppError> {
    let usecase = SubmitBooking {
        inbox: state.quote_inbox(),
    };
    let result = usecase.execute(&draft).await;

    let status = match &result {
        Ok(()) => {
            add_breadcrumb("booking", "Quote submitted", &[("service_type", draft.service_type.as_str())]);
            return Ok(Redirect::to("/?submitted=1#booking").into_response());
        }
        Err(err) => {
            log_failure(err);
            failure_status(err)
        }
    };

    let template = BookingTemplate::new(BookingView::after_submit(draft, &result));
    Ok((status, Html(template.render()?)).into_response())
}

/// Response for JSON submissions.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    pub success: bool,
    pub message: String,
}

/// Submit a booking as JSON.
///
/// POST /api/quotes
#[instrument(skip_all)]
pub async fn submit_json(
    State(state): State<AppState>,
    payload: Result<Json<BookingDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let Json(draft) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let usecase = SubmitBooking {
        inbox: state.quote_inbox(),
    };

    match usecase.execute(&draft).await {
        Ok(()) => Ok((
            StatusCode::CREATED,
            Json(BookingResponse {
                success: true,
                message: SUCCESS_MESSAGE.to_string(),
            }),
        )),
        Err(err) => {
            log_failure(&err);
            Ok((
                failure_status(&err),
                Json(BookingResponse {
                    success: false,
                    message: err.user_message(),
                }),
            ))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_template_marks_selected_options() {
        let template = BookingTemplate::new(BookingView {
            draft: BookingDraft {
                service_type: "endoflease".to_string(),
                bedrooms: "5".to_string(),
                ..BookingDraft::default()
            },
            notice: None,
        });
        let selected: Vec<_> = template.services.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].label, "End of Lease Cleaning");
        assert!(template.bedrooms.iter().any(|o| o.selected && o.label == "5+"));
        assert!(template.bathrooms.iter().all(|o| !o.selected));
    }

    #[test]
    fn test_rendered_page_keeps_draft_and_notice() {
        let draft = BookingDraft {
            service_type: "domestic".to_string(),
            address: "12 Mill Lane".to_string(),
            ..BookingDraft::default()
        };
        let view = BookingView::after_submit(draft, &Err(BookingError::MissingRequired));
        let html = BookingTemplate::new(view).render().unwrap();
        assert!(html.contains("12 Mill Lane"));
        assert!(html.contains("Please fill in all required fields"));
        assert!(html.contains("Regular Domestic Cleaning"));
    }

    #[test]
    fn test_failure_status() {
        assert_eq!(
            failure_status(&BookingError::ServiceNotSelected),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            failure_status(&BookingError::Backend(
                fresh_shine_core::BackendError::Transport("down".to_string())
            )),
            StatusCode::BAD_GATEWAY
        );
    }
}
