//! Type-safe price representation using decimal arithmetic.
//!
//! The storefront API sends prices as JSON numbers (`19.99`). They are parsed
//! into a [`Decimal`] through their textual form, so `19.99` stays `19.99`
//! instead of picking up binary floating point noise, and are always
//! displayed with two decimal places.

use core::fmt;
use core::ops::Mul;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`Price`] from user input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price must be a decimal number: {0}")]
    Invalid(String),
    /// The input is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// A price in the store's currency.
///
/// ## Examples
///
/// ```
/// use marketplace_core::Price;
///
/// let price: Price = "19.5".parse().unwrap();
/// assert_eq!(price.to_string(), "$19.50");
/// assert_eq!((price * 2).to_string(), "$39.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
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
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_owned()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }
}

impl Mul<i64> for Price {
    type Output = Self;

    fn mul(self, quantity: i64) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_places() {
        assert_eq!(Price::from_cents(1999).to_string(), "$19.99");
        assert_eq!(Price::from_cents(500).to_string(), "$5.00");
        assert_eq!(Price::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_deserialize_from_json_number() {
        let price: Price = serde_json::from_str("19.99").unwrap();
        assert_eq!(price, Price::from_cents(1999));

        let whole: Price = serde_json::from_str("20").unwrap();
        assert_eq!(whole, Price::from_cents(2000));
    }

    #[test]
    fn test_serialize_as_json_number() {
        let json = serde_json::to_value(Price::from_cents(1250)).unwrap();
        assert!(json.is_number());
        assert!((json.as_f64().unwrap() - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_multiply_by_quantity() {
        assert_eq!(Price::from_cents(1999) * 3, Price::from_cents(5997));
    }

    #[test]
    fn test_parse_rejects_garbage_and_negatives() {
        assert!(matches!("abc".parse::<Price>(), Err(PriceError::Invalid(_))));
        assert_eq!("-1".parse::<Price>(), Err(PriceError::Negative));
        assert_eq!(" 7.25 ".parse::<Price>().unwrap(), Price::from_cents(725));
    }
}
