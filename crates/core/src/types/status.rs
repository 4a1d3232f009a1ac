//! Enumerations stored as text columns in the hosted backend.
//!
//! Every enum serializes to the exact snake_case string the backend stores,
//! and round-trips through `Display`/`FromStr` for form and query values.

use serde::{Deserialize, Serialize};

/// Where a quote request is in the business's follow-up process.
///
/// Transitions are unconstrained: an admin may move a quote from any status
/// to any other. `Pending` is the only valid status for a new request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// Newly submitted, nobody has responded yet.
    #[default]
    Pending,
    Contacted,
    Quoted,
    Approved,
    Rejected,
    Completed,
}

impl QuoteStatus {
    /// All statuses in display order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Contacted,
        Self::Quoted,
        Self::Approved,
        Self::Rejected,
        Self::Completed,
    ];

    /// The value stored in the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Contacted => "contacted",
            Self::Quoted => "quoted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Contacted => "Contacted",
            Self::Quoted => "Quoted",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Completed => "Completed",
        }
    }

    /// Badge colour used by the dashboard.
    #[must_use]
    pub const fn badge_color(self) -> &'static str {
        match self {
            Self::Pending => "yellow",
            Self::Contacted => "blue",
            Self::Quoted => "purple",
            Self::Approved => "green",
            Self::Rejected => "red",
            Self::Completed => "gray",
        }
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid quote status: {s}"))
    }
}

/// The cleaning service a customer is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Domestic,
    Commercial,
    EndOfLease,
    Student,
    Airbnb,
    Special,
}

impl ServiceType {
    /// All services in the order the booking form offers them.
    pub const ALL: [Self; 6] = [
        Self::Domestic,
        Self::Commercial,
        Self::EndOfLease,
        Self::Student,
        Self::Airbnb,
        Self::Special,
    ];

    /// The value stored in the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Domestic => "domestic",
            Self::Commercial => "commercial",
            Self::EndOfLease => "endoflease",
            Self::Student => "student",
            Self::Airbnb => "airbnb",
            Self::Special => "special",
        }
    }

    /// Label shown on the booking form and dashboard.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Domestic => "Regular Domestic Cleaning",
            Self::Commercial => "Commercial Property Cleaning",
            Self::EndOfLease => "End of Lease Cleaning",
            Self::Student => "Student Accommodations",
            Self::Airbnb => "AirBnB Short Term Let",
            Self::Special => "Special Add-On Services",
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| format!("invalid service type: {s}"))
    }
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Can view and manage quotes.
    #[default]
    Admin,
    /// Everything an admin can do, plus creating and deleting admin users.
    SuperAdmin,
}

impl AdminRole {
    /// Whether this role may create or delete admin users.
    ///
    /// This only gates the dashboard; the backend's row-level security policy
    /// on `admin_users` is the actual enforcement point.
    #[must_use]
    pub const fn can_manage_users(self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}
