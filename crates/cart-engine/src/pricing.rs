//! Pricing engine.
//!
//! Pure computation over a snapshot of cart lines: product subtotal, tiered
//! promotional discounts, shipping fee, and total, all in checked
//! fixed-point money. Never mutates cart state and never fails hard; any
//! mid-computation failure becomes a failure quote.

use crate::catalog::CatalogGateway;
use crate::freight::FreightOracle;
use cart_commerce::ids::ShippingProfileId;
use cart_commerce::line::CartLine;
use cart_commerce::money::{Currency, Money};
use cart_commerce::quote::{DiscountDetail, DiscountKind, PriceQuote};
use cart_commerce::CartError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One promotion tier: spend at least the threshold, get a flat reduction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromotionTier {
    /// Qualifying original-amount threshold, in cents.
    pub threshold_cents: i64,
    /// Flat reduction, in cents.
    pub reduction_cents: i64,
    /// Display name for the discount detail.
    pub name: String,
}

/// Promotion configuration: non-overlapping tiers, highest qualifying tier
/// wins, plus the free-shipping threshold and the default shipping fee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromotionTiers {
    /// Threshold tiers; evaluated high to low regardless of order here.
    pub tiers: Vec<PromotionTier>,
    /// Original amount at or above which shipping is waived, in cents.
    pub free_shipping_threshold_cents: i64,
    /// Fee used when no profile is given or the freight oracle can't quote,
    /// in cents.
    pub default_shipping_fee_cents: i64,
}

impl Default for PromotionTiers {
    fn default() -> Self {
        Self {
            tiers: vec![
                PromotionTier {
                    threshold_cents: 50000,
                    reduction_cents: 5000,
                    name: "Spend 500 save 50".into(),
                },
                PromotionTier {
                    threshold_cents: 30000,
                    reduction_cents: 3000,
                    name: "Spend 300 save 30".into(),
                },
            ],
            free_shipping_threshold_cents: 50000,
            default_shipping_fee_cents: 1000,
        }
    }
}

/// Computes priced quotes for cart line snapshots.
pub struct PricingEngine {
    catalog: Arc<dyn CatalogGateway>,
    freight: Option<Arc<dyn FreightOracle>>,
    tiers: PromotionTiers,
    currency: Currency,
}

impl PricingEngine {
    /// Create an engine pricing in the given currency.
    pub fn new(catalog: Arc<dyn CatalogGateway>, tiers: PromotionTiers, currency: Currency) -> Self {
        Self {
            catalog,
            freight: None,
            tiers,
            currency,
        }
    }

    /// Attach a freight oracle for profile-based shipping quotes.
    pub fn with_freight(mut self, freight: Arc<dyn FreightOracle>) -> Self {
        self.freight = Some(freight);
        self
    }

    /// Compute a priced quote for the given line snapshot.
    ///
    /// The sole entry point. Always returns a quote: a zero success quote
    /// for an empty snapshot, a failure quote (success=false, zero amounts,
    /// message) when computation cannot complete.
    pub fn compute_cart_total(
        &self,
        lines: &[CartLine],
        shipping_profile: Option<&ShippingProfileId>,
    ) -> PriceQuote {
        if lines.is_empty() {
            return PriceQuote::zero(self.currency);
        }
        match self.compute(lines, shipping_profile) {
            Ok(quote) => quote,
            Err(e) => PriceQuote::failure(self.currency, e.to_string()),
        }
    }

    fn compute(
        &self,
        lines: &[CartLine],
        shipping_profile: Option<&ShippingProfileId>,
    ) -> Result<PriceQuote, CartError> {
        let drift_notes = self.detect_price_drift(lines)?;
        let original = self.original_amount(lines)?;
        let (discount, mut discounts) = self.apply_tiers(original);
        let product = original
            .try_subtract(&discount)
            .ok_or_else(|| CartError::PricingFailure("discount arithmetic failed".into()))?
            .clamp_non_negative();

        if original.amount_cents >= self.tiers.free_shipping_threshold_cents {
            discounts.push(DiscountDetail {
                kind: DiscountKind::FreeFreight,
                name: "Free shipping".into(),
                amount: Money::zero(self.currency),
                description: None,
            });
        }

        let free_freight = discounts
            .iter()
            .any(|d| d.kind == DiscountKind::FreeFreight);
        let shipping = if free_freight {
            Money::zero(self.currency)
        } else {
            self.shipping_fee(lines, shipping_profile)
        };
        let total = product
            .try_add(&shipping)
            .ok_or_else(|| CartError::PricingFailure("total arithmetic overflow".into()))?;

        let mut quote = PriceQuote::zero(self.currency);
        quote.original_amount = original;
        quote.product_amount = product;
        quote.discount_amount = discount;
        quote.shipping_fee = shipping;
        quote.total_amount = total;
        quote.discounts = discounts;
        quote.message = if drift_notes.is_empty() {
            None
        } else {
            Some(drift_notes.join("; "))
        };
        Ok(quote)
    }

    /// Compare each line's add-time unit price against the catalog's
    /// current price; mismatches are reported in the quote message.
    fn detect_price_drift(&self, lines: &[CartLine]) -> Result<Vec<String>, CartError> {
        let mut notes = Vec::new();
        for line in lines {
            let Some(recorded) = line.unit_price_at_add else {
                continue;
            };
            if let Some(current) = self.catalog.current_unit_price(&line.product_id)? {
                if current != recorded {
                    notes.push(format!(
                        "price changed for {}: {} -> {}",
                        line.product_id,
                        recorded.display_amount(),
                        current.display_amount()
                    ));
                }
            }
        }
        Ok(notes)
    }

    /// Sum of current unit price x quantity over selected lines.
    fn original_amount(&self, lines: &[CartLine]) -> Result<Money, CartError> {
        let mut total = Money::zero(self.currency);
        for line in lines.iter().filter(|l| l.selected) {
            let unit_price = match self.catalog.current_unit_price(&line.product_id)? {
                Some(price) => price,
                // A product the catalog no longer prices keeps its add-time
                // price for quoting.
                None => line.unit_price_at_add.ok_or_else(|| {
                    CartError::PricingFailure(format!("no price for product {}", line.product_id))
                })?,
            };
            let line_total = unit_price.try_multiply(line.quantity).ok_or_else(|| {
                CartError::PricingFailure("line amount arithmetic overflow".into())
            })?;
            total = total.try_add(&line_total).ok_or_else(|| {
                CartError::PricingFailure("original amount arithmetic overflow".into())
            })?;
        }
        Ok(total)
    }

    /// Highest qualifying tier wins, evaluated high to low.
    fn apply_tiers(&self, original: Money) -> (Money, Vec<DiscountDetail>) {
        let mut tiers: Vec<&PromotionTier> = self.tiers.tiers.iter().collect();
        tiers.sort_by(|a, b| b.threshold_cents.cmp(&a.threshold_cents));

        for tier in tiers {
            if original.amount_cents >= tier.threshold_cents {
                let amount = Money::new(tier.reduction_cents, self.currency);
                let detail = DiscountDetail {
                    kind: DiscountKind::Promotion,
                    name: tier.name.clone(),
                    amount,
                    description: None,
                };
                return (amount, vec![detail]);
            }
        }
        (Money::zero(self.currency), Vec::new())
    }

    /// Default fee when no profile is given; otherwise the freight oracle,
    /// falling back to the default fee when it can't quote. Fail-soft.
    fn shipping_fee(&self, lines: &[CartLine], profile: Option<&ShippingProfileId>) -> Money {
        let default_fee = Money::new(self.tiers.default_shipping_fee_cents, self.currency);
        let Some(profile) = profile else {
            return default_fee;
        };
        self.freight
            .as_ref()
            .and_then(|oracle| oracle.quote_freight(profile, lines))
            .unwrap_or(default_fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::freight::FlatRateFreight;
    use cart_commerce::ids::{ProductId, UserId};

    fn line(product: &str, quantity: i64, price_at_add: Option<i64>) -> CartLine {
        CartLine::new(
            UserId::new("u1"),
            ProductId::new(product),
            quantity,
            serde_json::Value::Null,
            price_at_add.map(|cents| Money::new(cents, Currency::USD)),
        )
    }

    fn catalog_with(prices: &[(&str, i64)]) -> Arc<InMemoryCatalog> {
        let catalog = Arc::new(InMemoryCatalog::new());
        for (product, cents) in prices {
            catalog.put_product(
                &ProductId::new(*product),
                *product,
                true,
                1000,
                Some(Money::new(*cents, Currency::USD)),
            );
        }
        catalog
    }

    fn engine(catalog: Arc<InMemoryCatalog>) -> PricingEngine {
        PricingEngine::new(catalog, PromotionTiers::default(), Currency::USD)
    }

    #[test]
    fn test_empty_cart_zero_quote() {
        let quote = engine(catalog_with(&[])).compute_cart_total(&[], None);
        assert!(quote.success);
        assert_eq!(quote.original_amount.display_amount(), "0.00");
        assert_eq!(quote.product_amount.display_amount(), "0.00");
        assert_eq!(quote.discount_amount.display_amount(), "0.00");
        assert_eq!(quote.shipping_fee.display_amount(), "0.00");
        assert_eq!(quote.total_amount.display_amount(), "0.00");
    }

    #[test]
    fn test_below_tiers_default_shipping() {
        // One selected line, 99.99 x 2, no shipping profile.
        let catalog = catalog_with(&[("p1", 9999)]);
        let lines = [line("p1", 2, Some(9999))];
        let quote = engine(catalog).compute_cart_total(&lines, None);

        assert!(quote.success);
        assert_eq!(quote.original_amount.display_amount(), "199.98");
        assert_eq!(quote.discount_amount.display_amount(), "0.00");
        assert_eq!(quote.shipping_fee.display_amount(), "10.00");
        assert_eq!(quote.total_amount.display_amount(), "209.98");
        assert!(quote.discounts.is_empty());
    }

    #[test]
    fn test_top_tier_with_free_freight() {
        // Original 520.00 hits the 500 tier and the free-shipping threshold.
        let catalog = catalog_with(&[("p1", 26000)]);
        let lines = [line("p1", 2, Some(26000))];
        let quote = engine(catalog).compute_cart_total(&lines, None);

        assert!(quote.success);
        assert_eq!(quote.original_amount.display_amount(), "520.00");
        assert_eq!(quote.discount_amount.display_amount(), "50.00");
        assert_eq!(quote.product_amount.display_amount(), "470.00");
        assert_eq!(quote.shipping_fee.display_amount(), "0.00");
        assert_eq!(quote.total_amount.display_amount(), "470.00");
        assert!(quote.has_free_freight());
        assert_eq!(quote.discounts.len(), 2);
        assert_eq!(quote.discounts[0].kind, DiscountKind::Promotion);
    }

    #[test]
    fn test_middle_tier() {
        // 350.00: 300 tier applies, below free shipping.
        let catalog = catalog_with(&[("p1", 35000)]);
        let lines = [line("p1", 1, Some(35000))];
        let quote = engine(catalog).compute_cart_total(&lines, None);

        assert_eq!(quote.discount_amount.display_amount(), "30.00");
        assert_eq!(quote.shipping_fee.display_amount(), "10.00");
        assert_eq!(quote.total_amount.display_amount(), "330.00");
        assert!(!quote.has_free_freight());
    }

    #[test]
    fn test_unselected_lines_excluded() {
        let catalog = catalog_with(&[("p1", 9999), ("p2", 5000)]);
        let mut deselected = line("p2", 1, Some(5000));
        deselected.set_selected(false);
        let lines = [line("p1", 1, Some(9999)), deselected];
        let quote = engine(catalog).compute_cart_total(&lines, None);
        assert_eq!(quote.original_amount.display_amount(), "99.99");
    }

    #[test]
    fn test_product_amount_clamps_at_zero() {
        let tiers = PromotionTiers {
            tiers: vec![PromotionTier {
                threshold_cents: 100,
                reduction_cents: 100000,
                name: "Oversized".into(),
            }],
            free_shipping_threshold_cents: i64::MAX,
            default_shipping_fee_cents: 1000,
        };
        let catalog = catalog_with(&[("p1", 500)]);
        let engine = PricingEngine::new(catalog, tiers, Currency::USD);
        let quote = engine.compute_cart_total(&[line("p1", 1, Some(500))], None);

        assert!(quote.success);
        assert_eq!(quote.product_amount.display_amount(), "0.00");
        assert_eq!(quote.total_amount.display_amount(), "10.00");
    }

    #[test]
    fn test_freight_oracle_and_fallback() {
        let catalog = catalog_with(&[("p1", 9999)]);
        let express = ShippingProfileId::new("express");
        let oracle =
            FlatRateFreight::new().with_rate(express.clone(), Money::new(2500, Currency::USD));
        let engine = engine(catalog).with_freight(Arc::new(oracle));
        let lines = [line("p1", 1, Some(9999))];

        let quote = engine.compute_cart_total(&lines, Some(&express));
        assert_eq!(quote.shipping_fee.display_amount(), "25.00");

        // Unknown profile falls back to the default fee, never fails.
        let quote =
            engine.compute_cart_total(&lines, Some(&ShippingProfileId::new("unknown")));
        assert!(quote.success);
        assert_eq!(quote.shipping_fee.display_amount(), "10.00");
    }

    #[test]
    fn test_price_drift_reported() {
        let catalog = catalog_with(&[("p1", 10999)]);
        let lines = [line("p1", 1, Some(9999))];
        let quote = engine(catalog).compute_cart_total(&lines, None);

        assert!(quote.success);
        let message = quote.message.unwrap();
        assert!(message.contains("p1"));
        assert!(message.contains("99.99"));
        assert!(message.contains("109.99"));
        // Current price drives the amount.
        assert_eq!(quote.original_amount.display_amount(), "109.99");
    }

    #[test]
    fn test_unpriced_product_fails_soft() {
        let catalog = Arc::new(InMemoryCatalog::new());
        catalog.put_product(&ProductId::new("p1"), "p1", true, 10, None);
        let quote = engine(catalog).compute_cart_total(&[line("p1", 1, None)], None);

        assert!(!quote.success);
        assert_eq!(quote.total_amount.display_amount(), "0.00");
        assert!(quote.message.unwrap().contains("no price"));
    }

    #[test]
    fn test_idempotent_quotes() {
        let catalog = catalog_with(&[("p1", 9999)]);
        let engine = engine(catalog);
        let lines = [line("p1", 2, Some(9999))];

        let first = engine.compute_cart_total(&lines, None);
        let second = engine.compute_cart_total(&lines, None);
        assert_eq!(first.original_amount, second.original_amount);
        assert_eq!(first.total_amount, second.total_amount);
        assert_eq!(first.discounts, second.discounts);
    }
}
