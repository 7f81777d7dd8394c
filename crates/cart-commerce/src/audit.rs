//! Mutation audit records.
//!
//! One immutable record per mutation that reached persistence, carrying
//! point-in-time snapshots of product and price data. Records transition
//! Active -> SoftDeleted when their line is removed; hard deletion happens
//! only through the retention sweep.

use crate::current_timestamp;
use crate::ids::{AuditRecordId, CartLineId, ProductId, UserId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Kind of mutation an audit record documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    /// First add of a product; quantity is the amount added.
    Add,
    /// Quantity change; quantity is the signed delta.
    Update,
    /// Re-add of a previously removed product; quantity is the amount added.
    Restore,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Add => "add",
            AuditAction::Update => "update",
            AuditAction::Restore => "restore",
        }
    }
}

/// Product attributes captured at audit-write time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSnapshot {
    /// Product being recorded.
    pub product_id: ProductId,
    /// Product name, if the catalog still resolved it.
    pub name: Option<String>,
    /// Whether the product was active at write time.
    pub active: bool,
    /// Stock available at write time.
    pub stock: i64,
}

/// One applicable price entry at audit-write time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceEntry {
    /// Entry kind (e.g., "list", "promo").
    pub kind: String,
    /// Display name.
    pub name: String,
    /// Entry amount.
    pub amount: Money,
    /// Optional description.
    pub description: Option<String>,
}

/// Price data captured at audit-write time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceSnapshot {
    /// Unit price at write time, if the catalog had one.
    pub unit_price: Option<Money>,
    /// Currency of the entries.
    pub currency: Currency,
    /// Applicable price entries at write time.
    pub entries: Vec<PriceEntry>,
}

/// One immutable entry per mutation attempt that reached persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditRecord {
    /// Unique record identifier.
    pub id: AuditRecordId,
    /// Owning user.
    pub user_id: UserId,
    /// Product the mutation touched.
    pub product_id: ProductId,
    /// Cart line the mutation touched.
    pub line_id: CartLineId,
    /// Signed quantity: absolute for add/restore, delta for update.
    pub quantity: i64,
    /// What kind of mutation this documents.
    pub action: AuditAction,
    /// Product attributes at write time.
    pub product_snapshot: ProductSnapshot,
    /// Price data at write time.
    pub price_snapshot: PriceSnapshot,
    /// Free-form metadata carried by the mutation.
    pub metadata: serde_json::Value,
    /// Soft-delete flag.
    pub deleted: bool,
    /// Set if and only if `deleted` is true.
    pub deleted_at: Option<i64>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl AuditRecord {
    /// Create a new active record.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: UserId,
        product_id: ProductId,
        line_id: CartLineId,
        quantity: i64,
        action: AuditAction,
        product_snapshot: ProductSnapshot,
        price_snapshot: PriceSnapshot,
        metadata: serde_json::Value,
    ) -> Self {
        let now = current_timestamp();
        Self {
            id: AuditRecordId::generate(),
            user_id,
            product_id,
            line_id,
            quantity,
            action,
            product_snapshot,
            price_snapshot,
            metadata,
            deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the record has not been soft-deleted.
    pub fn is_active(&self) -> bool {
        !self.deleted
    }

    /// Transition to SoftDeleted, stamping the given time.
    ///
    /// Idempotent: returns false and leaves an already-deleted record
    /// untouched.
    pub fn soft_delete(&mut self, deleted_at: i64) -> bool {
        if self.deleted {
            return false;
        }
        self.deleted = true;
        self.deleted_at = Some(deleted_at);
        self.updated_at = deleted_at;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(action: AuditAction, quantity: i64) -> AuditRecord {
        AuditRecord::new(
            UserId::new("user-1"),
            ProductId::new("prod-1"),
            CartLineId::new("line-1"),
            quantity,
            action,
            ProductSnapshot {
                product_id: ProductId::new("prod-1"),
                name: Some("Widget".into()),
                active: true,
                stock: 10,
            },
            PriceSnapshot {
                unit_price: Some(Money::new(9999, Currency::USD)),
                currency: Currency::USD,
                entries: vec![],
            },
            serde_json::Value::Null,
        )
    }

    #[test]
    fn test_new_record_is_active() {
        let rec = record(AuditAction::Add, 2);
        assert!(rec.is_active());
        assert_eq!(rec.deleted_at, None);
    }

    #[test]
    fn test_soft_delete_stamps_time() {
        let mut rec = record(AuditAction::Update, -1);
        assert!(rec.soft_delete(1000));
        assert!(!rec.is_active());
        assert_eq!(rec.deleted_at, Some(1000));
    }

    #[test]
    fn test_soft_delete_idempotent() {
        let mut rec = record(AuditAction::Add, 1);
        assert!(rec.soft_delete(1000));
        assert!(!rec.soft_delete(2000));
        // First stamp wins
        assert_eq!(rec.deleted_at, Some(1000));
    }

    #[test]
    fn test_action_as_str() {
        assert_eq!(AuditAction::Add.as_str(), "add");
        assert_eq!(AuditAction::Update.as_str(), "update");
        assert_eq!(AuditAction::Restore.as_str(), "restore");
    }
}
