//! Booking form state and submission.
//!
//! [`BookingDraft`] holds exactly what the visitor typed, as strings, so it
//! can be re-rendered unchanged after a failure. [`BookingDraft::validate`]
//! turns it into a [`NewQuote`] without touching the network, and
//! [`SubmitBooking`] sends that to a [`QuoteInbox`].

use chrono::NaiveDate;
use fresh_shine_core::{BackendError, Email, EmailError, NewQuote, QuoteInbox, ServiceType};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Shown after a successful submission.
pub const SUCCESS_MESSAGE: &str = "Quote request submitted! We'll contact you soon.";

/// Shown when the backend rejects or never receives the submission.
pub const FAILURE_MESSAGE: &str = "Failed to submit quote. Please try again.";

/// Errors from validating or submitting a booking.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Please select a service type")]
    ServiceNotSelected,

    #[error("Please fill in all required fields")]
    MissingRequired,

    #[error("Please enter a valid email address")]
    InvalidEmail(#[source] EmailError),

    #[error("Please choose a valid preferred date")]
    InvalidDate,

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

impl BookingError {
    /// Whether this was caught before any network call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        !matches!(self, Self::Backend(_))
    }

    /// Message safe to show the visitor.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(_) => FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// The booking form as typed.
///
/// Field names match the HTML form and the JSON endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingDraft {
    pub service_type: String,
    pub address: String,
    pub postcode: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub preferred_date: String,
    pub preferred_time: String,
    pub email: String,
    pub phone: String,
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl BookingDraft {
    /// Check the draft and build the insert payload.
    ///
    /// Blank optional fields become `None`; the status is always `pending`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if no known service is selected, a required
    /// field is blank, the email is malformed or the date is not `YYYY-MM-DD`.
    pub fn validate(&self) -> Result<NewQuote, BookingError> {
        let service_type: ServiceType = self
            .service_type
            .trim()
            .parse()
            .map_err(|_| BookingError::ServiceNotSelected)?;

        let address = optional(&self.address).ok_or(BookingError::MissingRequired)?;
        let email = optional(&self.email).ok_or(BookingError::MissingRequired)?;
        let phone = optional(&self.phone).ok_or(BookingError::MissingRequired)?;

        let email = Email::parse_as_typed(&email).map_err(BookingError::InvalidEmail)?;
        let preferred_date = optional(&self.preferred_date)
            .map(|date| NaiveDate::parse_from_str(&date, "%Y-%m-%d"))
            .transpose()
            .map_err(|_| BookingError::InvalidDate)?;

        Ok(NewQuote::new(
            service_type,
            address,
            optional(&self.postcode),
            optional(&self.bedrooms),
            optional(&self.bathrooms),
            preferred_date,
            optional(&self.preferred_time),
            email,
            phone,
        ))
    }
}

/// Kind of notice shown above the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A one-off message shown above the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.kind, NoticeKind::Success)
    }
}

/// View state of the booking section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingView {
    pub draft: BookingDraft,
    pub notice: Option<Notice>,
}

impl BookingView {
    /// Fold a submission result into the view.
    ///
    /// Success clears the draft; any error keeps it for a retry.
    #[must_use]
    pub fn after_submit(draft: BookingDraft, result: &Result<(), BookingError>) -> Self {
        match result {
            Ok(()) => Self {
                draft: BookingDraft::default(),
                notice: Some(Notice::success(SUCCESS_MESSAGE)),
            },
            Err(err) => Self {
                draft,
                notice: Some(Notice::error(err.user_message())),
            },
        }
    }
}

/// Validate a draft and insert it as a new quote.
pub struct SubmitBooking<I: QuoteInbox> {
    pub inbox: I,
}

impl<I: QuoteInbox> SubmitBooking<I> {
    /// # Errors
    ///
    /// Returns a validation error without calling the inbox, or
    /// [`BookingError::Backend`] if the insert fails.
    #[instrument(skip_all, fields(service_type = %draft.service_type))]
    pub async fn execute(&self, draft: &BookingDraft) -> Result<(), BookingError> {
        let quote = draft.validate()?;
        self.inbox.submit_quote(&quote).await?;
        tracing::info!(email = %quote.email, "Quote request submitted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use fresh_shine_core::{BackendResult, QuoteStatus};

    use super::*;

    struct MockInbox {
        submitted: Mutex<Vec<NewQuote>>,
        fail: bool,
    }

    impl MockInbox {
        fn new(fail: bool) -> Self {
            Self {
                submitted: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    impl QuoteInbox for MockInbox {
        async fn submit_quote(&self, quote: &NewQuote) -> BackendResult<()> {
            if self.fail {
                return Err(BackendError::Rejected {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            self.submitted.lock().unwrap().push(quote.clone());
            Ok(())
        }
    }

    fn valid_draft() -> BookingDraft {
        BookingDraft {
            service_type: "domestic".to_string(),
            address: "12 Mill Lane".to_string(),
            email: "a@b.com".to_string(),
            phone: "0161 555 0100".to_string(),
            ..BookingDraft::default()
        }
    }

    #[tokio::test]
    async fn test_valid_submission_is_pending_with_null_postcode() {
        let usecase = SubmitBooking {
            inbox: MockInbox::new(false),
        };
        usecase.execute(&valid_draft()).await.unwrap();

        let submitted = usecase.inbox.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].status(), QuoteStatus::Pending);
        assert_eq!(submitted[0].service_type, ServiceType::Domestic);
        assert_eq!(submitted[0].postcode, None);
        assert_eq!(submitted[0].address, "12 Mill Lane");
    }

    #[tokio::test]
    async fn test_missing_required_fields_make_no_call() {
        for blank in ["address", "email", "phone"] {
            let mut draft = valid_draft();
            match blank {
                "address" => draft.address = "  ".to_string(),
                "email" => draft.email = String::new(),
                _ => draft.phone = String::new(),
            }
            let usecase = SubmitBooking {
                inbox: MockInbox::new(false),
            };
            let err = usecase.execute(&draft).await.unwrap_err();
            assert!(matches!(err, BookingError::MissingRequired), "{blank}");
            assert!(err.is_validation());
            assert!(usecase.inbox.submitted.lock().unwrap().is_empty());
        }
    }

    #[test]
    fn test_service_must_be_selected() {
        let draft = BookingDraft {
            service_type: String::new(),
            ..valid_draft()
        };
        let err = draft.validate().unwrap_err();
        assert_eq!(err.user_message(), "Please select a service type");

        let draft = BookingDraft {
            service_type: "window".to_string(),
            ..valid_draft()
        };
        assert!(matches!(
            draft.validate(),
            Err(BookingError::ServiceNotSelected)
        ));
    }

    #[test]
    fn test_optional_fields_are_trimmed_or_absent() {
        let draft = BookingDraft {
            postcode: " M1 1AA ".to_string(),
            bedrooms: "3".to_string(),
            bathrooms: String::new(),
            preferred_date: "2024-06-01".to_string(),
            preferred_time: "10:30".to_string(),
            ..valid_draft()
        };
        let quote = draft.validate().unwrap();
        assert_eq!(quote.postcode.as_deref(), Some("M1 1AA"));
        assert_eq!(quote.bedrooms.as_deref(), Some("3"));
        assert_eq!(quote.bathrooms, None);
        assert_eq!(quote.preferred_date, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(quote.preferred_time.as_deref(), Some("10:30"));
    }

    #[test]
    fn test_email_is_stored_as_typed() {
        let draft = BookingDraft {
            email: " Jo.Bloggs@Example.co.UK ".to_string(),
            ..valid_draft()
        };
        let quote = draft.validate().unwrap();
        assert_eq!(quote.email.as_str(), "Jo.Bloggs@Example.co.UK");
    }

    #[test]
    fn test_bad_date_and_email_are_validation_errors() {
        let draft = BookingDraft {
            preferred_date: "01/06/2024".to_string(),
            ..valid_draft()
        };
        assert!(matches!(draft.validate(), Err(BookingError::InvalidDate)));

        let draft = BookingDraft {
            email: "not-an-email".to_string(),
            ..valid_draft()
        };
        assert!(matches!(
            draft.validate(),
            Err(BookingError::InvalidEmail(_))
        ));
    }

    #[tokio::test]
    async fn test_backend_failure_preserves_draft() {
        let usecase = SubmitBooking {
            inbox: MockInbox::new(true),
        };
        let draft = valid_draft();
        let result = usecase.execute(&draft).await;
        assert!(matches!(result, Err(BookingError::Backend(_))));

        let view = BookingView::after_submit(draft.clone(), &result);
        assert_eq!(view.draft, draft);
        let notice = view.notice.unwrap();
        assert!(!notice.is_success());
        assert_eq!(notice.message, FAILURE_MESSAGE);
    }

    #[test]
    fn test_success_resets_draft() {
        let view = BookingView::after_submit(valid_draft(), &Ok(()));
        assert_eq!(view.draft, BookingDraft::default());
        assert_eq!(view.notice, Some(Notice::success(SUCCESS_MESSAGE)));
    }
}
