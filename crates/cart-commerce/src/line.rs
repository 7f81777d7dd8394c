//! Cart line type and capacity limits.

use crate::current_timestamp;
use crate::ids::{CartLineId, ProductId, UserId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per cart line.
pub const MAX_QUANTITY_PER_LINE: i64 = 200;

/// Maximum number of distinct lines per user.
pub const MAX_LINES_PER_CART: u64 = 100;

/// Maximum summed quantity across a user's cart.
pub const MAX_TOTAL_QUANTITY: i64 = 999;

/// Capacity limits for a user's cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLimits {
    /// Maximum quantity per cart line.
    pub max_quantity_per_line: i64,
    /// Maximum number of distinct lines per user.
    pub max_lines_per_cart: u64,
    /// Maximum summed quantity across a user's cart.
    pub max_total_quantity: i64,
}

impl Default for CartLimits {
    fn default() -> Self {
        Self {
            max_quantity_per_line: MAX_QUANTITY_PER_LINE,
            max_lines_per_cart: MAX_LINES_PER_CART,
            max_total_quantity: MAX_TOTAL_QUANTITY,
        }
    }
}

impl CartLimits {
    /// Check a single-line quantity against the per-line range.
    pub fn quantity_in_range(&self, quantity: i64) -> bool {
        quantity >= 1 && quantity <= self.max_quantity_per_line
    }
}

/// One row per (user, product) pairing currently in a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Unique line identifier, stable once created.
    pub id: CartLineId,
    /// Owning user.
    pub user_id: UserId,
    /// Product in the cart.
    pub product_id: ProductId,
    /// Quantity, always within [1, MAX_QUANTITY_PER_LINE].
    pub quantity: i64,
    /// Whether this line participates in the checkout total.
    pub selected: bool,
    /// Unit price captured when the line was first added.
    ///
    /// Used by the pricing engine to detect price drift against the
    /// catalog's current price at quote time.
    pub unit_price_at_add: Option<Money>,
    /// Free-form metadata.
    pub metadata: serde_json::Value,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl CartLine {
    /// Create a new selected cart line.
    pub fn new(
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
        metadata: serde_json::Value,
        unit_price_at_add: Option<Money>,
    ) -> Self {
        let now = current_timestamp();
        Self {
            id: CartLineId::generate(),
            user_id,
            product_id,
            quantity,
            selected: true,
            unit_price_at_add,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the quantity, bumping the update timestamp.
    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
        self.updated_at = current_timestamp();
    }

    /// Set the selection flag, bumping the update timestamp.
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
        self.updated_at = current_timestamp();
    }

    /// Merge metadata from a later add into this line.
    ///
    /// New keys overwrite existing ones on conflict. Non-object values on
    /// either side make the incoming value win wholesale.
    pub fn merge_metadata(&mut self, incoming: serde_json::Value) {
        if incoming.is_null() {
            return;
        }
        match (self.metadata.as_object_mut(), incoming) {
            (Some(existing), serde_json::Value::Object(new)) => {
                for (key, value) in new {
                    existing.insert(key, value);
                }
            }
            (_, incoming) => self.metadata = incoming,
        }
        self.updated_at = current_timestamp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;
    use serde_json::json;

    fn line() -> CartLine {
        CartLine::new(
            UserId::new("user-1"),
            ProductId::new("prod-1"),
            2,
            json!({"gift": true}),
            Some(Money::new(4999, Currency::USD)),
        )
    }

    #[test]
    fn test_new_line_is_selected() {
        let line = line();
        assert!(line.selected);
        assert_eq!(line.quantity, 2);
        assert_eq!(line.created_at, line.updated_at);
    }

    #[test]
    fn test_set_quantity() {
        let mut line = line();
        line.set_quantity(5);
        assert_eq!(line.quantity, 5);
    }

    #[test]
    fn test_merge_metadata_new_keys_win() {
        let mut line = line();
        line.merge_metadata(json!({"gift": false, "note": "fragile"}));
        assert_eq!(line.metadata, json!({"gift": false, "note": "fragile"}));
    }

    #[test]
    fn test_merge_metadata_null_is_noop() {
        let mut line = line();
        line.merge_metadata(serde_json::Value::Null);
        assert_eq!(line.metadata, json!({"gift": true}));
    }

    #[test]
    fn test_limits_quantity_range() {
        let limits = CartLimits::default();
        assert!(limits.quantity_in_range(1));
        assert!(limits.quantity_in_range(MAX_QUANTITY_PER_LINE));
        assert!(!limits.quantity_in_range(0));
        assert!(!limits.quantity_in_range(MAX_QUANTITY_PER_LINE + 1));
    }
}
