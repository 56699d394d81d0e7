//! Type-safe price representation using decimal arithmetic.
//!
//! iiko reports menu prices as JSON numbers in the organization's currency.
//! The storefront stores them as decimals, so conversion happens once at the
//! nomenclature boundary and never goes through `f64` arithmetic afterwards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A menu price in the organization's currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero price, used for items iiko does not price (e.g. free modifiers).
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Returns the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Storefront display string with two decimal places (e.g. `"450.00"`).
    #[must_use]
    pub fn to_storefront_string(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}
