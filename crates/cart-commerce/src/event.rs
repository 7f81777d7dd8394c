//! Domain events emitted after committed cart mutations.

use crate::ids::{CartLineId, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// A cart mutation that durably committed.
///
/// Emitted after the line write and the audit write both succeed, so
/// subscribers never observe an event for a mutation that rolled back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CartEvent {
    /// A new line was created.
    ItemAdded {
        user_id: UserId,
        line_id: CartLineId,
        product_id: ProductId,
        quantity: i64,
    },
    /// An existing line's quantity changed (merge or explicit update).
    ItemUpdated {
        user_id: UserId,
        line_id: CartLineId,
        product_id: ProductId,
        quantity: i64,
    },
    /// A line was removed.
    ItemRemoved {
        user_id: UserId,
        line_id: CartLineId,
    },
    /// All of a user's lines were removed.
    CartCleared { user_id: UserId, count: u64 },
    /// Selection flags changed.
    SelectionChanged {
        user_id: UserId,
        line_ids: Vec<CartLineId>,
        selected: bool,
    },
}

impl CartEvent {
    /// Event name for logging and routing.
    pub fn name(&self) -> &'static str {
        match self {
            CartEvent::ItemAdded { .. } => "item_added",
            CartEvent::ItemUpdated { .. } => "item_updated",
            CartEvent::ItemRemoved { .. } => "item_removed",
            CartEvent::CartCleared { .. } => "cart_cleared",
            CartEvent::SelectionChanged { .. } => "selection_changed",
        }
    }
}
