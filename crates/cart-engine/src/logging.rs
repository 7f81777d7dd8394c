//! Logging decorator over the mutation engine.
//!
//! Wraps every public mutation with tracing events and converts the
//! engine's `Result` into the uniform [`MutationOutcome`] envelope, so
//! business logic stays free of both logging and result shaping. Raw
//! errors never escape this layer.

use crate::engine::CartMutationEngine;
use cart_commerce::customer::{Customer, DisplayName};
use cart_commerce::ids::{CartLineId, ProductId};
use cart_commerce::outcome::MutationOutcome;
use cart_commerce::CartError;
use tracing::{debug, info, warn};

/// A mutation engine wrapped with logging and uniform outcomes.
pub struct LoggedCartEngine {
    engine: CartMutationEngine,
    actor: Customer,
}

impl LoggedCartEngine {
    /// Wrap an engine, attributing operations to the given customer.
    pub fn new(engine: CartMutationEngine, actor: Customer) -> Self {
        Self { engine, actor }
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &CartMutationEngine {
        &self.engine
    }

    /// Add a product to the cart.
    pub fn add_item(
        &self,
        product: &ProductId,
        quantity: i64,
        metadata: serde_json::Value,
    ) -> MutationOutcome {
        debug!(op = "add_item", product = %product, quantity, "cart mutation requested");
        let result = self
            .engine
            .add_item(&self.actor.id, product, quantity, metadata)
            .map(|_| 1);
        self.outcome("add_item", result)
    }

    /// Re-add a previously removed product.
    pub fn restore_item(
        &self,
        product: &ProductId,
        quantity: i64,
        metadata: serde_json::Value,
    ) -> MutationOutcome {
        debug!(op = "restore_item", product = %product, quantity, "cart mutation requested");
        let result = self
            .engine
            .restore_item(&self.actor.id, product, quantity, metadata)
            .map(|_| 1);
        self.outcome("restore_item", result)
    }

    /// Overwrite a line's quantity.
    pub fn update_quantity(&self, line_id: &CartLineId, quantity: i64) -> MutationOutcome {
        debug!(op = "update_quantity", line = %line_id, quantity, "cart mutation requested");
        let result = self
            .engine
            .update_quantity(&self.actor.id, line_id, quantity)
            .map(|_| 1);
        self.outcome("update_quantity", result)
    }

    /// Remove one line.
    pub fn remove_item(&self, line_id: &CartLineId) -> MutationOutcome {
        debug!(op = "remove_item", line = %line_id, "cart mutation requested");
        let result = self
            .engine
            .remove_item(&self.actor.id, line_id)
            .map(|_| 1);
        self.outcome("remove_item", result)
    }

    /// Remove every line in the cart.
    pub fn clear_cart(&self) -> MutationOutcome {
        debug!(op = "clear_cart", "cart mutation requested");
        let result = self.engine.clear_cart(&self.actor.id);
        self.outcome("clear_cart", result)
    }

    /// Set one line's selection flag.
    pub fn update_selection(&self, line_id: &CartLineId, selected: bool) -> MutationOutcome {
        debug!(op = "update_selection", line = %line_id, selected, "cart mutation requested");
        let result = self
            .engine
            .update_selection(&self.actor.id, line_id, selected)
            .map(|_| 1);
        self.outcome("update_selection", result)
    }

    /// Set the selection flag on many lines; unknown ids are skipped.
    pub fn batch_update_selection(
        &self,
        line_ids: &[CartLineId],
        selected: bool,
    ) -> MutationOutcome {
        debug!(
            op = "batch_update_selection",
            count = line_ids.len(),
            selected,
            "cart mutation requested"
        );
        let result = self
            .engine
            .batch_update_selection(&self.actor.id, line_ids, selected)
            .map(|updated| updated.len() as u64);
        self.outcome("batch_update_selection", result)
    }

    fn totals(&self) -> (u64, i64) {
        let items = self.engine.cart_item_count(&self.actor.id).unwrap_or_default();
        let quantity = self
            .engine
            .cart_total_quantity(&self.actor.id)
            .unwrap_or_default();
        (items, quantity)
    }

    fn outcome(&self, op: &'static str, result: Result<u64, CartError>) -> MutationOutcome {
        let (total_cart_items, total_quantity) = self.totals();
        match result {
            Ok(affected) => {
                info!(
                    op,
                    user = %self.actor.display_name(),
                    affected,
                    total_cart_items,
                    total_quantity,
                    "cart mutation committed"
                );
                MutationOutcome::succeeded(affected, total_cart_items, total_quantity)
            }
            Err(e) => {
                warn!(
                    op,
                    user = %self.actor.display_name(),
                    kind = e.kind(),
                    error = %e,
                    "cart mutation failed"
                );
                MutationOutcome::failed(&e, total_cart_items, total_quantity)
            }
        }
    }
}
