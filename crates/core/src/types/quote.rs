//! Quote rows and the pure operations the dashboard runs over them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Email, QuoteAmount, QuoteId, QuoteStatus, ServiceType};

/// A customer's cleaning-service request, as stored in the `quotes` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub created_at: DateTime<Utc>,
    pub service_type: ServiceType,
    pub address: String,
    pub postcode: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub preferred_date: Option<NaiveDate>,
    pub preferred_time: Option<String>,
    pub email: Email,
    pub phone: String,
    pub status: QuoteStatus,
    pub quote_amount: Option<QuoteAmount>,
    pub admin_notes: Option<String>,
}

impl Quote {
    /// Return a copy with the admin-mutable fields replaced by `patch`.
    ///
    /// Every request field and the identity are left untouched.
    #[must_use]
    pub fn with_patch(&self, patch: &QuotePatch) -> Self {
        Self {
            status: patch.status,
            quote_amount: patch.quote_amount,
            admin_notes: patch.admin_notes.clone(),
            ..self.clone()
        }
    }
}

/// The insert payload for a new quote request.
///
/// There is no way to construct one with a status other than
/// [`QuoteStatus::Pending`]: the status field is private and set by
/// [`NewQuote::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewQuote {
    pub service_type: ServiceType,
    pub address: String,
    pub postcode: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub preferred_date: Option<NaiveDate>,
    pub preferred_time: Option<String>,
    pub email: Email,
    pub phone: String,
    status: QuoteStatus,
}

impl NewQuote {
    /// Build an insert payload with status `pending`.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        service_type: ServiceType,
        address: String,
        postcode: Option<String>,
        bedrooms: Option<String>,
        bathrooms: Option<String>,
        preferred_date: Option<NaiveDate>,
        preferred_time: Option<String>,
        email: Email,
        phone: String,
    ) -> Self {
        Self {
            service_type,
            address,
            postcode,
            bedrooms,
            bathrooms,
            preferred_date,
            preferred_time,
            email,
            phone,
            status: QuoteStatus::Pending,
        }
    }

    /// The status this request will be stored with.
    #[must_use]
    pub const fn status(&self) -> QuoteStatus {
        self.status
    }
}

/// An update to the three admin-mutable fields of a quote.
///
/// Serializes to exactly `status`, `quote_amount` and `admin_notes`, with
/// `null` for cleared values, so an update can never touch request fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotePatch {
    pub status: QuoteStatus,
    pub quote_amount: Option<QuoteAmount>,
    pub admin_notes: Option<String>,
}

impl From<&Quote> for QuotePatch {
    fn from(quote: &Quote) -> Self {
        Self {
            status: quote.status,
            quote_amount: quote.quote_amount,
            admin_notes: quote.admin_notes.clone(),
        }
    }
}

/// Status filter applied over an already-fetched set of quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "status")]
pub enum StatusFilter {
    #[default]
    All,
    Only(QuoteStatus),
}

impl StatusFilter {
    /// Parse a filter from a query value; `"all"`, blank or absent mean [`StatusFilter::All`].
    ///
    /// # Errors
    ///
    /// Returns an error for values that are neither `all` nor a known status.
    pub fn parse(value: Option<&str>) -> Result<Self, String> {
        match value.map(str::trim) {
            None | Some("" | "all") => Ok(Self::All),
            Some(other) => other.parse().map(Self::Only),
        }
    }

    /// Whether a quote passes this filter.
    #[must_use]
    pub fn matches(self, quote: &Quote) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => quote.status == status,
        }
    }

    /// The quotes that pass this filter, in their original order.
    #[must_use]
    pub fn apply<'a>(self, quotes: &'a [Quote]) -> Vec<&'a Quote> {
        quotes.iter().filter(|quote| self.matches(quote)).collect()
    }

    /// Query-string value for this filter.
    #[must_use]
    pub const fn as_query_value(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(status) => status.as_str(),
        }
    }
}

/// Aggregate counts shown above the quote table.
///
/// Always computed over the full, unfiltered set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuoteStats {
    pub total: usize,
    pub pending: usize,
    pub contacted: usize,
    pub quoted: usize,
    pub approved: usize,
}

impl QuoteStats {
    /// Count quotes per bucket.
    #[must_use]
    pub fn from_quotes(quotes: &[Quote]) -> Self {
        let count = |status: QuoteStatus| quotes.iter().filter(|q| q.status == status).count();
        Self {
            total: quotes.len(),
            pending: count(QuoteStatus::Pending),
            contacted: count(QuoteStatus::Contacted),
            quoted: count(QuoteStatus::Quoted),
            approved: count(QuoteStatus::Approved),
        }
    }
}
