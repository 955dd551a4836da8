//! Type-safe price representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    #[serde(default)]
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

    /// A price in the default currency (USD).
    #[must_use]
    pub fn usd(amount: impl Into<Decimal>) -> Self {
        Self::new(amount.into(), CurrencyCode::USD)
    }

    /// The price multiplied by a seat count.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Whether the amount is zero (a free formation).
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.amount.is_zero()
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    HTG,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::EUR => "€",
            Self::HTG => "G",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::usd(50).display(), "$50.00");
        assert_eq!(Price::new(Decimal::new(4050, 2), CurrencyCode::EUR).display(), "€40.50");
    }

    #[test]
    fn test_times() {
        assert_eq!(Price::usd(75).times(11), Price::usd(825));
        assert!(Price::usd(0).times(3).is_free());
    }

    #[test]
    fn test_currency_defaults_when_missing() {
        let price: Price = serde_json::from_str(r#"{"amount":"40"}"#).unwrap();
        assert_eq!(price.currency_code, CurrencyCode::USD);
    }
}
