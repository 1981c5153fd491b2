//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are held as [`Decimal`] so that listing prices like `19.99` never
//! pick up binary floating point noise. On the wire they serialize as strings
//! (`"19.99"`) but numeric JSON values are accepted when reading snapshots.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A listing price in the store currency's standard unit (e.g. dollars).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Whether the price is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Whole-number discount of `self` relative to `original`.
    ///
    /// Returns `None` unless `original` is positive and strictly above `self`.
    #[must_use]
    pub fn discount_from(&self, original: Self) -> Option<u8> {
        if !original.is_positive() || original.0 <= self.0 {
            return None;
        }
        let pct = (original.0 - self.0) / original.0 * Decimal::ONE_HUNDRED;
        pct.round().to_u8()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Self)
            .map_err(|_| PriceError::Invalid(s.to_owned()))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<i64> for Price {
    fn from(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_positive() {
        assert!(Price::from(100).is_positive());
        assert!(Price::from_cents(1).is_positive());
        assert!(!Price::ZERO.is_positive());
        assert!(!Price::from(-5).is_positive());
    }

    #[test]
    fn test_discount_from() {
        let price = Price::from(75);
        assert_eq!(price.discount_from(Price::from(100)), Some(25));
        assert_eq!(price.discount_from(Price::from(75)), None);
        assert_eq!(price.discount_from(Price::from(50)), None);
        assert_eq!(price.discount_from(Price::ZERO), None);
    }

    #[test]
    fn test_parse() {
        let price: Price = "19.99".parse().unwrap();
        assert_eq!(price, Price::from_cents(1999));
        assert!("nineteen".parse::<Price>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_cents(1999).to_string(), "$19.99");
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let from_str: Price = serde_json::from_str("\"12.50\"").unwrap();
        let from_num: Price = serde_json::from_str("12.5").unwrap();
        assert_eq!(from_str, from_num);
    }
}
