//! Freight pricing oracle boundary.

use cart_commerce::ids::ShippingProfileId;
use cart_commerce::line::CartLine;
use cart_commerce::money::Money;

/// External freight-pricing oracle.
///
/// `None` means the oracle could not quote (unknown profile, upstream
/// failure); the pricing engine falls back to its default fee and never
/// fails the quote on shipping.
pub trait FreightOracle: Send + Sync {
    /// Quote a shipping fee for the given profile and line set.
    fn quote_freight(&self, profile: &ShippingProfileId, lines: &[CartLine]) -> Option<Money>;
}

/// Flat-rate oracle: one fee per known profile.
#[derive(Debug, Default)]
pub struct FlatRateFreight {
    rates: std::collections::HashMap<ShippingProfileId, Money>,
}

impl FlatRateFreight {
    /// Create an oracle with no known profiles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flat rate for a profile.
    pub fn with_rate(mut self, profile: ShippingProfileId, fee: Money) -> Self {
        self.rates.insert(profile, fee);
        self
    }
}

impl FreightOracle for FlatRateFreight {
    fn quote_freight(&self, profile: &ShippingProfileId, _lines: &[CartLine]) -> Option<Money> {
        self.rates.get(profile).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_commerce::money::Currency;

    #[test]
    fn test_flat_rate() {
        let profile = ShippingProfileId::new("express");
        let oracle =
            FlatRateFreight::new().with_rate(profile.clone(), Money::new(2500, Currency::USD));

        assert_eq!(
            oracle.quote_freight(&profile, &[]).unwrap().amount_cents,
            2500
        );
        assert!(oracle
            .quote_freight(&ShippingProfileId::new("unknown"), &[])
            .is_none());
    }
}
