//! Quote amounts in pounds sterling.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing a [`QuoteAmount`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The input is not a decimal number.
    #[error("quote amount must be a number")]
    NotANumber,
    /// The input is below zero.
    #[error("quote amount cannot be negative")]
    Negative,
}

/// A quoted price in GBP, stored to two decimal places.
///
/// The backend column is a nullable `numeric`; absence is modelled as
/// `Option<QuoteAmount>` at the row level rather than a zero amount.
///
/// Deserialization goes through [`QuoteAmount::new`], so rows read back from
/// the backend hold the same invariants as typed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct QuoteAmount(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl QuoteAmount {
    /// Create an amount, rounding half-up to pence.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Negative`] for amounts below zero.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative);
        }
        Ok(Self(
            value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        ))
    }

    /// Parse an amount typed into a form field.
    ///
    /// Accepts an optional leading `£` and surrounding whitespace. Blank
    /// input means "no amount" and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a non-negative decimal.
    pub fn parse_optional(input: &str) -> Result<Option<Self>, AmountError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let digits = trimmed.strip_prefix('£').unwrap_or(trimmed).trim();
        let value = Decimal::from_str(digits).map_err(|_| AmountError::NotANumber)?;
        Self::new(value).map(Some)
    }

    /// The amount formatted for an input field (`"120.50"`, no symbol).
    #[must_use]
    pub fn to_input_value(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl<'de> Deserialize<'de> for QuoteAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for QuoteAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "£{:.2}", self.0)
    }
}
