//! Edit surfaces: the quote editor and the new admin user form.

use fresh_shine_core::{
    AdminRole, Email, Quote, QuoteAmount, QuoteId, QuotePatch, QuoteStatus, StatusFilter,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::services::DashboardError;

/// The three editable quote fields, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteEditorFields {
    pub status: String,
    pub quote_amount: String,
    pub admin_notes: String,
}

impl QuoteEditorFields {
    /// Working copy of a stored quote.
    #[must_use]
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            status: quote.status.as_str().to_string(),
            quote_amount: quote
                .quote_amount
                .map(|amount| amount.to_input_value())
                .unwrap_or_default(),
            admin_notes: quote.admin_notes.clone().unwrap_or_default(),
        }
    }

    /// Build the update payload.
    ///
    /// A blank amount or blank notes clear the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Validation`] for an unknown status or an
    /// amount that is not a non-negative number.
    pub fn to_patch(&self) -> Result<QuotePatch, DashboardError> {
        let status: QuoteStatus = self
            .status
            .trim()
            .parse()
            .map_err(|_| DashboardError::Validation("Please choose a valid status".to_string()))?;
        let quote_amount = QuoteAmount::parse_optional(&self.quote_amount)
            .map_err(|e| DashboardError::Validation(capitalize(&e.to_string())))?;
        let notes = self.admin_notes.trim();
        let admin_notes = (!notes.is_empty()).then(|| notes.to_string());

        Ok(QuotePatch {
            status,
            quote_amount,
            admin_notes,
        })
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// One `<option>` in the status select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Edit surface for one quote.
///
/// Request fields are shown read-only from `quote` when it could be read;
/// `fields` is the working copy of the editable ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteEditor {
    pub id: QuoteId,
    pub quote: Option<Quote>,
    pub fields: QuoteEditorFields,
    pub error: Option<String>,
}

impl QuoteEditor {
    /// Open the editor pre-populated from the stored row.
    #[must_use]
    pub fn open(quote: Quote) -> Self {
        let fields = QuoteEditorFields::from_quote(&quote);
        Self::with_fields(quote, fields)
    }

    /// Editor showing edits that have not been saved.
    #[must_use]
    pub const fn with_fields(quote: Quote, fields: QuoteEditorFields) -> Self {
        Self {
            id: quote.id,
            quote: Some(quote),
            fields,
            error: None,
        }
    }

    /// Editor for unsaved edits when the stored row is unavailable.
    #[must_use]
    pub const fn detached(id: QuoteId, fields: QuoteEditorFields) -> Self {
        Self {
            id,
            quote: None,
            fields,
            error: None,
        }
    }

    /// Keep the surface open with the edits and an error.
    #[must_use]
    pub fn failed(self, message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..self
        }
    }

    #[must_use]
    pub fn status_options(&self) -> Vec<StatusOption> {
        QuoteStatus::ALL
            .into_iter()
            .map(|status| StatusOption {
                value: status.as_str(),
                label: status.label(),
                selected: status.as_str() == self.fields.status,
            })
            .collect()
    }
}

/// A validated request to create an admin user.
#[derive(Debug)]
pub struct ValidatedAdminUser {
    pub email: Email,
    pub password: SecretString,
    pub full_name: Option<String>,
    pub role: AdminRole,
}

/// "Add user" form.
///
/// The password is never serialized, so a re-rendered form asks for it again.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewAdminUserForm {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub full_name: String,
    pub role: String,
    /// Quote filter that was active on the dashboard, carried in a hidden field.
    pub status: String,
}

impl NewAdminUserForm {
    /// # Errors
    ///
    /// Returns [`DashboardError::Validation`] if email or password is blank,
    /// the email is malformed or the role is unknown.
    pub fn validate(&self) -> Result<ValidatedAdminUser, DashboardError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(DashboardError::Validation(
                "Email and password are required".to_string(),
            ));
        }
        let email = Email::parse(email)
            .map_err(|e| DashboardError::Validation(capitalize(&e.to_string())))?;
        let role = match self.role.trim() {
            "" => AdminRole::default(),
            other => other
                .parse()
                .map_err(|_| DashboardError::Validation("Please choose a valid role".to_string()))?,
        };
        let full_name = Some(self.full_name.trim().to_string()).filter(|name| !name.is_empty());

        Ok(ValidatedAdminUser {
            email,
            password: SecretString::from(self.password.as_str()),
            full_name,
            role,
        })
    }

    /// The form as it should be re-shown after a failure: everything but the password.
    #[must_use]
    pub fn without_password(&self) -> Self {
        Self {
            password: String::new(),
            ..self.clone()
        }
    }

    /// The dashboard filter to re-render with. An unknown value shows all quotes.
    #[must_use]
    pub fn filter(&self) -> StatusFilter {
        StatusFilter::parse(Some(self.status.trim())).unwrap_or_default()
    }

    /// Whether `role` is the selected option.
    #[must_use]
    pub fn is_role(&self, role: &str) -> bool {
        let current = self.role.trim();
        current == role || (current.is_empty() && role == AdminRole::default().to_string())
    }
}

impl std::fmt::Debug for NewAdminUserForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAdminUserForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("full_name", &self.full_name)
            .field("role", &self.role)
            .field("status", &self.status)
            .finish()
    }
}
