//! Mutation audit log.
//!
//! Writes one immutable record per mutation with point-in-time product and
//! price snapshots. A failed audit write aborts the enclosing mutation;
//! audit data is not best-effort.

use crate::catalog::CatalogGateway;
use crate::current_timestamp;
use crate::store::AuditLogStore;
use cart_commerce::audit::{AuditAction, AuditRecord, PriceSnapshot, ProductSnapshot};
use cart_commerce::ids::{CartLineId, ProductId, UserId};
use cart_commerce::money::Currency;
use cart_commerce::CartError;
use std::sync::Arc;

/// Append-mostly log of cart mutations.
pub struct MutationAuditLog {
    catalog: Arc<dyn CatalogGateway>,
    store: Arc<dyn AuditLogStore>,
    currency: Currency,
}

impl MutationAuditLog {
    /// Create a log writing through the given store, snapshotting through
    /// the given catalog.
    pub fn new(
        catalog: Arc<dyn CatalogGateway>,
        store: Arc<dyn AuditLogStore>,
        currency: Currency,
    ) -> Self {
        Self {
            catalog,
            store,
            currency,
        }
    }

    /// Record one mutation.
    ///
    /// `quantity` is the absolute amount for `Add`/`Restore` (strictly
    /// positive) and the signed delta for `Update`. Captures product and
    /// price snapshots at write time.
    pub fn record(
        &self,
        action: AuditAction,
        user: &UserId,
        product: &ProductId,
        line_id: &CartLineId,
        quantity: i64,
        metadata: serde_json::Value,
    ) -> Result<AuditRecord, CartError> {
        if matches!(action, AuditAction::Add | AuditAction::Restore) && quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let resolved = self.catalog.resolve_product(product)?;
        let product_snapshot = ProductSnapshot {
            product_id: product.clone(),
            name: resolved.as_ref().map(|p| p.name.clone()),
            active: resolved.as_ref().map(|p| p.active).unwrap_or(false),
            stock: self.catalog.current_stock(product)?,
        };
        let price_snapshot = PriceSnapshot {
            unit_price: self.catalog.current_unit_price(product)?,
            currency: self.currency,
            entries: self.catalog.price_entries(product)?,
        };

        let record = AuditRecord::new(
            user.clone(),
            product.clone(),
            line_id.clone(),
            quantity,
            action,
            product_snapshot,
            price_snapshot,
            metadata,
        );
        self.store.append(&record)?;
        Ok(record)
    }

    /// Soft-delete all not-yet-deleted records for one line.
    ///
    /// Idempotent; returns the number of records transitioned.
    pub fn soft_delete_by_line(&self, line_id: &CartLineId) -> Result<u64, CartError> {
        let count = self
            .store
            .soft_delete_by_lines(std::slice::from_ref(line_id), current_timestamp())?;
        Ok(count)
    }

    /// Soft-delete across many lines in one bulk store call.
    pub fn batch_soft_delete_by_lines(&self, line_ids: &[CartLineId]) -> Result<u64, CartError> {
        if line_ids.is_empty() {
            return Ok(0);
        }
        let count = self
            .store
            .soft_delete_by_lines(line_ids, current_timestamp())?;
        Ok(count)
    }

    /// Hard-delete records created before the cutoff.
    ///
    /// The only hard-delete path for audit data; run from retention
    /// enforcement, never inline with a user-facing mutation.
    pub fn cleanup_older_than(&self, cutoff: i64) -> Result<u64, CartError> {
        let count = self.store.delete_older_than(cutoff)?;
        Ok(count)
    }

    /// All records for a line, soft-deleted included.
    pub fn records_for_line(&self, line_id: &CartLineId) -> Result<Vec<AuditRecord>, CartError> {
        Ok(self.store.find_by_line(line_id)?)
    }

    /// All records across a set of lines, soft-deleted included.
    pub fn records_for_lines(
        &self,
        line_ids: &[CartLineId],
    ) -> Result<Vec<AuditRecord>, CartError> {
        Ok(self.store.find_by_lines(line_ids)?)
    }

    /// All records for a user, soft-deleted included.
    pub fn records_for_user(&self, user: &UserId) -> Result<Vec<AuditRecord>, CartError> {
        Ok(self.store.find_by_user(user)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::memory::InMemoryAuditLogStore;
    use cart_commerce::money::Money;

    fn log_with_product() -> (MutationAuditLog, ProductId) {
        let catalog = Arc::new(InMemoryCatalog::new());
        let product = ProductId::new("prod-1");
        catalog.put_product(
            &product,
            "Widget",
            true,
            10,
            Some(Money::new(9999, Currency::USD)),
        );
        let log = MutationAuditLog::new(
            catalog,
            Arc::new(InMemoryAuditLogStore::new()),
            Currency::USD,
        );
        (log, product)
    }

    #[test]
    fn test_record_captures_snapshots() {
        let (log, product) = log_with_product();
        let record = log
            .record(
                AuditAction::Add,
                &UserId::new("u1"),
                &product,
                &CartLineId::new("l1"),
                2,
                serde_json::Value::Null,
            )
            .unwrap();

        assert_eq!(record.quantity, 2);
        assert_eq!(record.product_snapshot.name.as_deref(), Some("Widget"));
        assert_eq!(record.product_snapshot.stock, 10);
        assert_eq!(
            record.price_snapshot.unit_price.unwrap().amount_cents,
            9999
        );
        assert!(record.is_active());
    }

    #[test]
    fn test_add_requires_positive_quantity() {
        let (log, product) = log_with_product();
        let err = log
            .record(
                AuditAction::Add,
                &UserId::new("u1"),
                &product,
                &CartLineId::new("l1"),
                0,
                serde_json::Value::Null,
            )
            .unwrap_err();
        assert_eq!(err.kind(), "invalid-quantity");
    }

    #[test]
    fn test_update_delta_may_be_negative() {
        let (log, product) = log_with_product();
        let record = log
            .record(
                AuditAction::Update,
                &UserId::new("u1"),
                &product,
                &CartLineId::new("l1"),
                -3,
                serde_json::Value::Null,
            )
            .unwrap();
        assert_eq!(record.quantity, -3);
    }

    #[test]
    fn test_soft_delete_idempotent() {
        let (log, product) = log_with_product();
        let line = CartLineId::new("l1");
        log.record(
            AuditAction::Add,
            &UserId::new("u1"),
            &product,
            &line,
            1,
            serde_json::Value::Null,
        )
        .unwrap();

        assert_eq!(log.soft_delete_by_line(&line).unwrap(), 1);
        assert_eq!(log.soft_delete_by_line(&line).unwrap(), 0);
        let records = log.records_for_line(&line).unwrap();
        assert!(records.iter().all(|r| !r.is_active()));
    }

    #[test]
    fn test_records_for_lines_spans_the_set() {
        let (log, product) = log_with_product();
        let l1 = CartLineId::new("l1");
        let l2 = CartLineId::new("l2");
        for line in [&l1, &l2] {
            log.record(
                AuditAction::Add,
                &UserId::new("u1"),
                &product,
                line,
                1,
                serde_json::Value::Null,
            )
            .unwrap();
        }

        let records = log.records_for_lines(&[l1.clone(), l2.clone()]).unwrap();
        assert_eq!(records.len(), 2);
        // Soft-deleted records stay visible through the batch read.
        log.soft_delete_by_line(&l1).unwrap();
        let records = log.records_for_lines(&[l1, l2]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records.iter().filter(|r| r.is_active()).count(), 1);
    }

    #[test]
    fn test_cleanup_only_removes_older() {
        let (log, product) = log_with_product();
        log.record(
            AuditAction::Add,
            &UserId::new("u1"),
            &product,
            &CartLineId::new("l1"),
            1,
            serde_json::Value::Null,
        )
        .unwrap();

        // Cutoff before every record's creation time removes nothing.
        assert_eq!(log.cleanup_older_than(0).unwrap(), 0);
        // Cutoff far in the future removes everything.
        assert_eq!(log.cleanup_older_than(i64::MAX).unwrap(), 1);
    }

    #[test]
    fn test_snapshot_of_unknown_product() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let log = MutationAuditLog::new(
            catalog,
            Arc::new(InMemoryAuditLogStore::new()),
            Currency::USD,
        );
        let record = log
            .record(
                AuditAction::Update,
                &UserId::new("u1"),
                &ProductId::new("gone"),
                &CartLineId::new("l1"),
                -1,
                serde_json::Value::Null,
            )
            .unwrap();
        assert_eq!(record.product_snapshot.name, None);
        assert!(!record.product_snapshot.active);
        assert!(record.price_snapshot.unit_price.is_none());
    }
}
