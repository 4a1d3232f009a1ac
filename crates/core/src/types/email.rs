//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input is empty (after trimming).
    #[error("email cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain exactly one @ symbol.
    #[error("email must contain a single @ symbol")]
    MissingAtSymbol,
    /// The mailbox part (before @) is empty.
    #[error("email mailbox cannot be empty")]
    EmptyMailbox,
    /// The domain part (after @) is empty or has no dot.
    #[error("email domain must look like example.com")]
    InvalidDomain,
}

/// A contact or login email address.
///
/// [`Email::parse`] trims and lowercases, so `" Jo@Example.COM "` and
/// `"jo@example.com"` compare equal; [`Email::parse_as_typed`] only trims. Validation is deliberately loose: the
/// backend's auth service is the final judge of deliverability.
///
/// ## Examples
///
/// ```
/// use fresh_shine_core::Email;
///
/// assert_eq!(Email::parse(" Jo@Example.com ").unwrap().as_str(), "jo@example.com");
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("jo@localhost").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse and normalize an `Email`.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than 254
    /// characters, lacks exactly one `@`, or has an empty mailbox or a domain
    /// without a dot.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let normalized = s.trim().to_lowercase();
        check(&normalized)?;
        Ok(Self(normalized))
    }

    /// Parse an address that must be kept exactly as typed, apart from
    /// surrounding whitespace.
    ///
    /// Customer contact addresses are stored this way.
    ///
    /// # Errors
    ///
    /// Same rules as [`Email::parse`].
    pub fn parse_as_typed(s: &str) -> Result<Self, EmailError> {
        let trimmed = s.trim();
        check(trimmed)?;
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the domain part of the email (after the @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

fn check(address: &str) -> Result<(), EmailError> {
    if address.is_empty() {
        return Err(EmailError::Empty);
    }
    if address.len() > Email::MAX_LENGTH {
        return Err(EmailError::TooLong {
            max: Email::MAX_LENGTH,
        });
    }

    let (mailbox, domain) = address
        .split_once('@')
        .ok_or(EmailError::MissingAtSymbol)?;
    if domain.contains('@') {
        return Err(EmailError::MissingAtSymbol);
    }
    if mailbox.is_empty() {
        return Err(EmailError::EmptyMailbox);
    }
    if domain.is_empty() || !domain.contains('.') || domain.ends_with('.') {
        return Err(EmailError::InvalidDomain);
    }
    Ok(())
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("a@b.com").is_ok());
        assert!(Email::parse("bookings+web@freshshine.co.uk").is_ok());
        assert!(Email::parse("first.last@mail.example.org").is_ok());
    }

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let email = Email::parse("  Sam.Jones@Example.COM\n").unwrap();
        assert_eq!(email.as_str(), "sam.jones@example.com");
    }

    #[test]
    fn test_parse_as_typed_keeps_case() {
        let email = Email::parse_as_typed("  Sam.Jones@Example.COM\n").unwrap();
        assert_eq!(email.as_str(), "Sam.Jones@Example.COM");
        assert_eq!(Email::parse_as_typed("Sam@localhost"), Err(EmailError::InvalidDomain));
        assert_eq!(Email::parse_as_typed(" "), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_empty_and_blank() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_at_symbol_rules() {
        assert_eq!(Email::parse("nobody"), Err(EmailError::MissingAtSymbol));
        assert_eq!(Email::parse("a@b@c.com"), Err(EmailError::MissingAtSymbol));
        assert_eq!(Email::parse("@c.com"), Err(EmailError::EmptyMailbox));
    }

    #[test]
    fn test_parse_domain_rules() {
        assert_eq!(Email::parse("jo@"), Err(EmailError::InvalidDomain));
        assert_eq!(Email::parse("jo@localhost"), Err(EmailError::InvalidDomain));
        assert_eq!(Email::parse("jo@example."), Err(EmailError::InvalidDomain));
    }

    #[test]
    fn test_domain() {
        let email = Email::parse("jo@freshshine.co.uk").unwrap();
        assert_eq!(email.domain(), "freshshine.co.uk");
    }

    #[test]
    fn test_serializes_transparently() {
        let email = Email::parse("jo@example.com").unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"jo@example.com\"");
    }
}
