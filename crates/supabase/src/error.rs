//! Errors from the Supabase client.

use fresh_shine_core::BackendError;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to Supabase.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Credentials missing, invalid or expired, or access denied by policy.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found (or filtered out by row-level security).
    #[error("Not found")]
    NotFound,

    /// Unique constraint or duplicate identity.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Failed to build a request URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// A key or token could not be used as a header value.
    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    /// Realtime websocket failure.
    #[error("Realtime error: {0}")]
    Realtime(String),
}

/// Error body shapes returned by `PostgREST` and `GoTrue`.
///
/// `PostgREST` uses `{code, message, details, hint}`; `GoTrue` uses either
/// `{error, error_description}` or `{code, error_code, msg}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    code: Option<String>,
    error_code: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Codes that mean "this already exists".
const CONFLICT_CODES: &[&str] = &["23505", "user_already_exists", "email_exists"];

impl SupabaseError {
    /// Build an error from a non-success status and its body text.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let code = parsed.error_code.or(parsed.code);
        let message = parsed
            .message
            .or(parsed.msg)
            .or(parsed.error_description)
            .or(parsed.error)
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    "Unknown error".to_string()
                } else {
                    body.trim().to_string()
                }
            });

        if code
            .as_deref()
            .is_some_and(|code| CONFLICT_CODES.contains(&code))
            || status == 409
        {
            return Self::Conflict(message);
        }

        match status {
            401 | 403 => Self::Unauthorized(message),
            404 | 406 => Self::NotFound,
            _ => Self::Api {
                status,
                code,
                message,
            },
        }
    }

    /// Read a failed response into an error.
    pub(crate) async fn from_reqwest(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::from_response(status, &body)
    }
}

impl From<SupabaseError> for BackendError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::Http(e) => Self::Transport(e.to_string()),
            SupabaseError::Realtime(message) => Self::Transport(message),
            SupabaseError::Api {
                status, message, ..
            } => Self::Rejected { status, message },
            SupabaseError::Unauthorized(_) => Self::Unauthorized,
            SupabaseError::NotFound => Self::NotFound,
            SupabaseError::Conflict(message) => Self::Conflict(message),
            SupabaseError::Parse(message) => Self::Decode(message),
            SupabaseError::Url(e) => Self::Transport(e.to_string()),
            SupabaseError::InvalidHeader(name) => {
                Self::Transport(format!("invalid header value for {name}"))
            }
        }
    }
}
