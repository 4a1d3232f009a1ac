//! Dashboard view state.

use fresh_shine_core::{AdminRole, AdminUser, Quote, QuoteStats, QuoteStatus, StatusFilter};
use serde::{Deserialize, Serialize};

/// Dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Quotes,
    Users,
}

impl Tab {
    /// Parse a `?tab=` value. Unknown values fall back to the quotes tab.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("users") => Self::Users,
            _ => Self::Quotes,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quotes => "quotes",
            Self::Users => "users",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Quotes => "Quote Management",
            Self::Users => "User Management",
        }
    }
}

/// Everything the dashboard shows, derived from one fetch of each table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    /// Every fetched quote, newest first, unfiltered.
    pub quotes: Vec<Quote>,
    /// Every fetched admin user, newest first.
    pub admin_users: Vec<AdminUser>,
    pub filter: StatusFilter,
    /// Counts over the unfiltered quote set.
    pub stats: QuoteStats,
    pub tab: Tab,
    /// Whether add/delete user controls are shown.
    pub can_manage_users: bool,
}

impl DashboardView {
    #[must_use]
    pub fn new(quotes: Vec<Quote>, admin_users: Vec<AdminUser>, viewer_role: AdminRole) -> Self {
        let stats = QuoteStats::from_quotes(&quotes);
        Self {
            quotes,
            admin_users,
            filter: StatusFilter::All,
            stats,
            tab: Tab::default(),
            can_manage_users: viewer_role.can_manage_users(),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: StatusFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.tab = tab;
        self
    }

    /// Quotes passing the current filter.
    #[must_use]
    pub fn visible_quotes(&self) -> Vec<&Quote> {
        self.filter.apply(&self.quotes)
    }

    /// Serializable snapshot for the JSON API.
    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            filter: self.filter.as_query_value().to_string(),
            stats: self.stats,
            quotes: self.visible_quotes().into_iter().cloned().collect(),
            admin_users: self.admin_users.clone(),
            can_manage_users: self.can_manage_users,
        }
    }

    /// Filter choices for the status select, with `all` first.
    #[must_use]
    pub fn filter_options(&self) -> Vec<FilterOption> {
        std::iter::once(StatusFilter::All)
            .chain(QuoteStatus::ALL.into_iter().map(StatusFilter::Only))
            .map(|filter| FilterOption {
                value: filter.as_query_value(),
                label: match filter {
                    StatusFilter::All => "All",
                    StatusFilter::Only(status) => status.label(),
                },
                selected: filter == self.filter,
            })
            .collect()
    }
}

/// One `<option>` in the status filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// JSON form of the dashboard (`GET /api/dashboard`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub filter: String,
    pub stats: QuoteStats,
    /// Quotes passing the filter.
    pub quotes: Vec<Quote>,
    pub admin_users: Vec<AdminUser>,
    pub can_manage_users: bool,
}
