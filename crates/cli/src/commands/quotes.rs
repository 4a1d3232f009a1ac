//! Quote reporting commands.
//!
//! # Usage
//!
//! ```bash
//! fs-cli quotes list
//! fs-cli quotes list --status approved
//! ```

use fresh_shine_core::{Quote, QuoteRepository, QuoteStats, StatusFilter};
use thiserror::Error;

use super::{ClientError, service_client};

/// Errors that can occur while listing quotes.
#[derive(Debug, Error)]
pub enum QuotesError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Invalid status filter: {0}")]
    InvalidStatus(String),

    #[error("Backend error: {0}")]
    Backend(#[from] fresh_shine_core::BackendError),
}

/// One line of the quote listing.
fn describe(quote: &Quote) -> String {
    format!(
        "{}  {}  {:<10} {:<30} {:<32} {}",
        quote.id,
        quote.created_at.format("%Y-%m-%d"),
        quote.status,
        quote.service_type.label(),
        quote.email,
        quote
            .quote_amount
            .map_or_else(|| "-".to_string(), |amount| amount.to_string()),
    )
}

/// Summary line over the unfiltered set.
fn summarize(stats: &QuoteStats) -> String {
    format!(
        "Total: {}  Pending: {}  Contacted: {}  Quoted: {}  Approved: {}",
        stats.total, stats.pending, stats.contacted, stats.quoted, stats.approved
    )
}

/// List quotes, newest first, with counts over every quote.
///
/// # Errors
///
/// Returns error for an unknown status, missing configuration or a failed read.
pub async fn list(status: Option<&str>) -> Result<(), QuotesError> {
    let filter = StatusFilter::parse(status).map_err(QuotesError::InvalidStatus)?;

    let client = service_client()?;
    let quotes = client.anonymous().list_quotes().await?;
    let shown = filter.apply(&quotes);

    tracing::info!(
        "{} of {} quote(s) (filter: {})",
        shown.len(),
        quotes.len(),
        filter.as_query_value()
    );
    for quote in shown {
        tracing::info!("  {}", describe(quote));
    }
    tracing::info!("{}", summarize(&QuoteStats::from_quotes(&quotes)));
    Ok(())
}
