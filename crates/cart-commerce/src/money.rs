//! Money type for representing monetary values.
//!
//! Amounts are stored in the smallest unit of the currency (e.g., cents for
//! USD) and every operation is checked integer arithmetic. No binary
//! floating point anywhere: totals compared or summed at 2-decimal scale
//! stay exact.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    CNY,
}

impl Currency {
    /// Get the currency code (e.g., "USD").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CNY => "CNY",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            "CNY" => Some(Currency::CNY),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// The amount is in the smallest currency unit (cents for USD). Arithmetic
/// is checked: mixed currencies and overflow both yield `None` rather than
/// a wrong amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit (e.g., cents).
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from the smallest currency unit.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Create a Money value from major units (e.g., whole dollars).
    ///
    /// ```
    /// use cart_commerce::money::{Currency, Money};
    /// assert_eq!(Money::from_major(49, Currency::USD).amount_cents, 4900);
    /// ```
    pub fn from_major(amount: i64, currency: Currency) -> Self {
        let multiplier = 10_i64.pow(currency.decimal_places());
        Self::new(amount.saturating_mul(multiplier), currency)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_cents > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Clamp a negative amount to zero.
    pub fn clamp_non_negative(&self) -> Self {
        Self::new(self.amount_cents.max(0), self.currency)
    }

    /// Try to add another Money value.
    ///
    /// Returns `None` if currencies don't match or the addition overflows.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        let amount = self.amount_cents.checked_add(other.amount_cents)?;
        Some(Money::new(amount, self.currency))
    }

    /// Try to subtract another Money value.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        let amount = self.amount_cents.checked_sub(other.amount_cents)?;
        Some(Money::new(amount, self.currency))
    }

    /// Try to multiply by a scalar (e.g., a quantity).
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        let amount = self.amount_cents.checked_mul(factor)?;
        Some(Money::new(amount, self.currency))
    }

    /// Sum an iterator of Money values, checked.
    ///
    /// Returns `None` on currency mismatch or overflow.
    pub fn try_sum<'a>(
        iter: impl Iterator<Item = &'a Money>,
        currency: Currency,
    ) -> Option<Money> {
        let mut total = Money::zero(currency);
        for m in iter {
            total = total.try_add(m)?;
        }
        Some(total)
    }

    /// Format the amount without a currency code (e.g., "49.99").
    ///
    /// This is the only place amounts are rendered at 2-decimal scale;
    /// arithmetic never rounds.
    pub fn display_amount(&self) -> String {
        let places = self.currency.decimal_places();
        if places == 0 {
            return self.amount_cents.to_string();
        }
        let divisor = 10_u64.pow(places);
        let sign = if self.amount_cents < 0 { "-" } else { "" };
        let abs = self.amount_cents.unsigned_abs();
        format!(
            "{}{}.{:0width$}",
            sign,
            abs / divisor,
            abs % divisor,
            width = places as usize
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.display_amount(), self.currency.code())
    }
}
