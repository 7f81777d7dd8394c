//! Priced cart totals.

use crate::current_timestamp;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Kind of discount detail attached to a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscountKind {
    /// Tiered threshold promotion reducing the product amount.
    Promotion,
    /// Shipping waiver signal; carries a zero amount and does not reduce
    /// the product amount.
    FreeFreight,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Promotion => "promotion",
            DiscountKind::FreeFreight => "free-freight",
        }
    }
}

/// One applied discount in a quote, in application order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscountDetail {
    /// Detail kind.
    pub kind: DiscountKind,
    /// Display name (e.g., "Spend 500 save 50").
    pub name: String,
    /// Amount taken off the product amount; zero for free-freight.
    pub amount: Money,
    /// Optional description.
    pub description: Option<String>,
}

/// Output of the pricing engine for a given line set. Derived, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceQuote {
    /// Whether computation completed.
    pub success: bool,
    /// Sum of current unit price x quantity over selected lines.
    pub original_amount: Money,
    /// max(0, original - discount).
    pub product_amount: Money,
    /// Total promotional reduction.
    pub discount_amount: Money,
    /// Shipping fee; zero when a free-freight detail is present.
    pub shipping_fee: Money,
    /// product_amount + shipping_fee, by construction.
    pub total_amount: Money,
    /// Applied discounts in order.
    pub discounts: Vec<DiscountDetail>,
    /// Human-readable notes (price drift, failure reason).
    pub message: Option<String>,
    /// Quote currency.
    pub currency: Currency,
    /// Unix timestamp of computation.
    pub computed_at: i64,
}

impl PriceQuote {
    /// Zero-amount success quote for an empty cart.
    pub fn zero(currency: Currency) -> Self {
        let zero = Money::zero(currency);
        Self {
            success: true,
            original_amount: zero,
            product_amount: zero,
            discount_amount: zero,
            shipping_fee: zero,
            total_amount: zero,
            discounts: Vec::new(),
            message: None,
            currency,
            computed_at: current_timestamp(),
        }
    }

    /// Failure quote: all amounts zeroed, message carrying the reason.
    pub fn failure(currency: Currency, message: impl Into<String>) -> Self {
        let mut quote = Self::zero(currency);
        quote.success = false;
        quote.message = Some(message.into());
        quote
    }

    /// Whether the quote carries a free-freight discount detail.
    pub fn has_free_freight(&self) -> bool {
        self.discounts
            .iter()
            .any(|d| d.kind == DiscountKind::FreeFreight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_quote() {
        let quote = PriceQuote::zero(Currency::USD);
        assert!(quote.success);
        assert_eq!(quote.total_amount.display_amount(), "0.00");
        assert!(quote.message.is_none());
        assert!(!quote.has_free_freight());
    }

    #[test]
    fn test_failure_quote() {
        let quote = PriceQuote::failure(Currency::USD, "catalog unavailable");
        assert!(!quote.success);
        assert_eq!(quote.original_amount.amount_cents, 0);
        assert_eq!(quote.message.as_deref(), Some("catalog unavailable"));
    }

    #[test]
    fn test_has_free_freight() {
        let mut quote = PriceQuote::zero(Currency::USD);
        quote.discounts.push(DiscountDetail {
            kind: DiscountKind::FreeFreight,
            name: "Free shipping".into(),
            amount: Money::zero(Currency::USD),
            description: None,
        });
        assert!(quote.has_free_freight());
    }
}
