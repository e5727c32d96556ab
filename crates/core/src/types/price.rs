//! Non-negative prices using decimal arithmetic.
//!
//! All money in the storefront is a single currency (Indian rupees) and is
//! displayed as `₹1234.50`. Tax is a fixed 18% rate applied to subtotals.

use core::fmt;
use std::iter::Sum;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// Fixed tax rate (18%) applied to cart subtotals.
#[must_use]
pub fn tax_rate() -> Decimal {
    Decimal::new(18, 2)
}

/// A non-negative amount of money.
///
/// Deserializes from either a JSON number or a string and rejects negative
/// amounts, so malformed stored carts fail at the boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Multiply by a quantity (line totals).
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Tax owed on this amount.
    #[must_use]
    pub fn tax(self) -> Self {
        Self(self.0.saturating_mul(tax_rate()))
    }

    /// This amount with tax included.
    #[must_use]
    pub fn with_tax(self) -> Self {
        Self(self.0.saturating_mul(Decimal::ONE + tax_rate()))
    }

    /// Struck-through "was" price shown next to the selling price: 130%,
    /// rounded down to whole rupees.
    #[must_use]
    pub fn list_price(self) -> Self {
        Self(self.0.saturating_mul(Decimal::new(13, 1)).floor())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, price| Self(acc.0.saturating_add(price.0)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(value: i64) -> Price {
        Price::new(Decimal::from(value)).unwrap()
    }

    #[test]
    fn test_negative_rejected() {
        let err = Price::new(Decimal::new(-1, 2)).unwrap_err();
        assert_eq!(err, PriceError::Negative(Decimal::new(-1, 2)));
    }

    #[test]
    fn test_zero_allowed() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_tax_and_grand_total() {
        let subtotal = price(200);
        assert_eq!(subtotal.tax().amount(), Decimal::from(36));
        assert_eq!(subtotal.with_tax().amount(), Decimal::from(236));
    }

    #[test]
    fn test_list_price_rounds_down() {
        assert_eq!(price(100).list_price(), price(130));
        assert_eq!(
            Price::new(Decimal::new(4950, 2)).unwrap().list_price(),
            price(64)
        );
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(price(200).to_string(), "₹200.00");
        assert_eq!(Price::new(Decimal::new(4950, 2)).unwrap().to_string(), "₹49.50");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let from_number: Price = serde_json::from_str("99.99").unwrap();
        let from_string: Price = serde_json::from_str("\"99.99\"").unwrap();
        assert_eq!(from_number, from_string);
        assert!(serde_json::from_str::<Price>("-5").is_err());
    }

    #[test]
    fn test_sum() {
        let total: Price = [price(10), price(20), price(5)].into_iter().sum();
        assert_eq!(total, price(35));
    }
}
