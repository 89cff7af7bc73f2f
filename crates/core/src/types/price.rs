//! Type-safe price representation using decimal arithmetic.
//!
//! The backend sends prices as decimal strings (`"1299.00"`). They are parsed
//! into [`Decimal`] so that cart totals never pick up binary floating-point
//! error.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when parsing a [`Price`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty or only whitespace.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// The amount is below zero.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupees, not paise).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Parse a decimal price string such as `"10.50"`.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, is not a decimal number, or
    /// is negative.
    pub fn parse(s: &str, currency_code: CurrencyCode) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        let amount =
            Decimal::from_str(trimmed).map_err(|_| PriceError::Invalid(trimmed.to_owned()))?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }

        Ok(Self::new(amount, currency_code))
    }

    /// Multiply by a line quantity.
    ///
    /// Returns `None` if the result overflows the decimal range.
    #[must_use]
    pub fn checked_times(&self, quantity: u32) -> Option<Self> {
        self.amount
            .checked_mul(Decimal::from(quantity))
            .map(|amount| Self::new(amount, self.currency_code))
    }

    /// Format for display (e.g., "₹26.00").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_prices() {
        let price = Price::parse("10.50", CurrencyCode::INR).unwrap();
        assert_eq!(price.amount, Decimal::new(1050, 2));

        let price = Price::parse("  5 ", CurrencyCode::INR).unwrap();
        assert_eq!(price.amount, Decimal::from(5));

        assert!(Price::parse("0.00", CurrencyCode::INR).is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(Price::parse("", CurrencyCode::INR), Err(PriceError::Empty));
        assert_eq!(Price::parse("   ", CurrencyCode::INR), Err(PriceError::Empty));
        assert!(matches!(
            Price::parse("ten", CurrencyCode::INR),
            Err(PriceError::Invalid(_))
        ));
        assert!(matches!(
            Price::parse("-1.00", CurrencyCode::INR),
            Err(PriceError::Negative(_))
        ));
    }

    #[test]
    fn test_checked_times() {
        let price = Price::parse("10.50", CurrencyCode::INR).unwrap();
        let line = price.checked_times(2).unwrap();
        assert_eq!(line.amount, Decimal::new(2100, 2));
        assert_eq!(line.currency_code, CurrencyCode::INR);
    }

    #[test]
    fn test_display_pads_two_decimals() {
        assert_eq!(Price::new(Decimal::from(26), CurrencyCode::INR).display(), "₹26.00");
        assert_eq!(
            Price::new(Decimal::new(105, 1), CurrencyCode::USD).to_string(),
            "$10.50"
        );
    }

    #[test]
    fn test_currency_default_is_inr() {
        assert_eq!(CurrencyCode::default(), CurrencyCode::INR);
        assert_eq!(CurrencyCode::default().code(), "INR");
    }
}
