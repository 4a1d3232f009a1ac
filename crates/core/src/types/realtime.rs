//! Realtime change notifications.
//!
//! Every notification is treated as "re-fetch this table"; row payloads are
//! never applied directly.

use serde::{Deserialize, Serialize};

/// A watched table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Quotes,
    AdminUsers,
}

impl Table {
    /// Every table the dashboard watches.
    pub const ALL: [Self; 2] = [Self::Quotes, Self::AdminUsers];

    /// Table name in the `public` schema.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Quotes => "quotes",
            Self::AdminUsers => "admin_users",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|table| table.name() == s)
            .ok_or_else(|| format!("unknown table: {s}"))
    }
}

/// What happened to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    /// Emitted after the realtime connection is re-established; changes may
    /// have been missed while it was down.
    Resync,
}

impl ChangeKind {
    /// Map a Postgres change type (`INSERT`, `UPDATE`, `DELETE`).
    #[must_use]
    pub fn from_postgres(event_type: &str) -> Option<Self> {
        match event_type.to_ascii_uppercase().as_str() {
            "INSERT" => Some(Self::Insert),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// A change notification for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableChange {
    pub table: Table,
    pub kind: ChangeKind,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        assert_eq!(Table::Quotes.name(), "quotes");
        assert_eq!("admin_users".parse::<Table>().unwrap(), Table::AdminUsers);
        assert!("orders".parse::<Table>().is_err());
    }

    #[test]
    fn test_change_kind_from_postgres() {
        assert_eq!(ChangeKind::from_postgres("INSERT"), Some(ChangeKind::Insert));
        assert_eq!(ChangeKind::from_postgres("delete"), Some(ChangeKind::Delete));
        assert_eq!(ChangeKind::from_postgres("TRUNCATE"), None);
    }
}
