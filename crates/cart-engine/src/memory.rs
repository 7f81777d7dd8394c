//! In-memory reference adapters for the storage traits.
//!
//! Used by the test suites and as executable documentation of the adapter
//! contract, the uniqueness constraint included.

use crate::store::{AuditLogStore, CartLineStore, StoreError};
use cart_commerce::audit::AuditRecord;
use cart_commerce::ids::{CartLineId, ProductId, UserId};
use cart_commerce::line::CartLine;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory cart line store enforcing the (user, product) constraint.
#[derive(Debug, Default)]
pub struct InMemoryCartLineStore {
    lines: RwLock<HashMap<(UserId, CartLineId), CartLine>>,
}

impl InMemoryCartLineStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<(UserId, CartLineId), CartLine>> {
        self.lines.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<(UserId, CartLineId), CartLine>> {
        self.lines.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CartLineStore for InMemoryCartLineStore {
    fn insert(&self, line: &CartLine) -> Result<(), StoreError> {
        let mut lines = self.write();
        let duplicate = lines
            .values()
            .any(|l| l.user_id == line.user_id && l.product_id == line.product_id);
        if duplicate {
            return Err(StoreError::UniqueViolation {
                user_id: line.user_id.to_string(),
                product_id: line.product_id.to_string(),
            });
        }
        lines.insert((line.user_id.clone(), line.id.clone()), line.clone());
        Ok(())
    }

    fn update(&self, line: &CartLine) -> Result<(), StoreError> {
        let mut lines = self.write();
        let key = (line.user_id.clone(), line.id.clone());
        if !lines.contains_key(&key) {
            return Err(StoreError::Backend(format!(
                "update of unknown line {}",
                line.id
            )));
        }
        lines.insert(key, line.clone());
        Ok(())
    }

    fn find_by_user_and_id(
        &self,
        user: &UserId,
        id: &CartLineId,
    ) -> Result<Option<CartLine>, StoreError> {
        Ok(self.read().get(&(user.clone(), id.clone())).cloned())
    }

    fn find_by_user_and_ids(
        &self,
        user: &UserId,
        ids: &[CartLineId],
    ) -> Result<Vec<CartLine>, StoreError> {
        let lines = self.read();
        Ok(ids
            .iter()
            .filter_map(|id| lines.get(&(user.clone(), id.clone())).cloned())
            .collect())
    }

    fn find_by_user(&self, user: &UserId) -> Result<Vec<CartLine>, StoreError> {
        let mut found: Vec<CartLine> = self
            .read()
            .values()
            .filter(|l| &l.user_id == user)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    fn find_by_user_and_product(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<Option<CartLine>, StoreError> {
        Ok(self
            .read()
            .values()
            .find(|l| &l.user_id == user && &l.product_id == product)
            .cloned())
    }

    fn count_by_user(&self, user: &UserId) -> Result<u64, StoreError> {
        Ok(self.read().values().filter(|l| &l.user_id == user).count() as u64)
    }

    fn sum_quantity_by_user(&self, user: &UserId) -> Result<i64, StoreError> {
        Ok(self
            .read()
            .values()
            .filter(|l| &l.user_id == user)
            .map(|l| l.quantity)
            .sum())
    }

    fn set_selected(
        &self,
        user: &UserId,
        ids: &[CartLineId],
        selected: bool,
    ) -> Result<Vec<CartLine>, StoreError> {
        let mut lines = self.write();
        let mut updated = Vec::new();
        for id in ids {
            if let Some(line) = lines.get_mut(&(user.clone(), id.clone())) {
                line.set_selected(selected);
                updated.push(line.clone());
            }
        }
        Ok(updated)
    }

    fn delete(&self, user: &UserId, id: &CartLineId) -> Result<bool, StoreError> {
        Ok(self.write().remove(&(user.clone(), id.clone())).is_some())
    }

    fn delete_by_user_and_ids(
        &self,
        user: &UserId,
        ids: &[CartLineId],
    ) -> Result<u64, StoreError> {
        let mut lines = self.write();
        let mut removed = 0;
        for id in ids {
            if lines.remove(&(user.clone(), id.clone())).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// In-memory append log for audit records.
#[derive(Debug, Default)]
pub struct InMemoryAuditLogStore {
    records: RwLock<Vec<AuditRecord>>,
}

impl InMemoryAuditLogStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<AuditRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<AuditRecord>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuditLogStore for InMemoryAuditLogStore {
    fn append(&self, record: &AuditRecord) -> Result<(), StoreError> {
        self.write().push(record.clone());
        Ok(())
    }

    fn find_by_line(&self, line: &CartLineId) -> Result<Vec<AuditRecord>, StoreError> {
        Ok(self
            .read()
            .iter()
            .filter(|r| &r.line_id == line)
            .cloned()
            .collect())
    }

    fn find_by_lines(&self, lines: &[CartLineId]) -> Result<Vec<AuditRecord>, StoreError> {
        Ok(self
            .read()
            .iter()
            .filter(|r| lines.contains(&r.line_id))
            .cloned()
            .collect())
    }

    fn find_by_user(&self, user: &UserId) -> Result<Vec<AuditRecord>, StoreError> {
        Ok(self
            .read()
            .iter()
            .filter(|r| &r.user_id == user)
            .cloned()
            .collect())
    }

    fn soft_delete_by_lines(
        &self,
        lines: &[CartLineId],
        deleted_at: i64,
    ) -> Result<u64, StoreError> {
        let mut records = self.write();
        let mut count = 0;
        for record in records.iter_mut() {
            if lines.contains(&record.line_id) && record.soft_delete(deleted_at) {
                count += 1;
            }
        }
        Ok(count)
    }

    fn delete_older_than(&self, cutoff: i64) -> Result<u64, StoreError> {
        let mut records = self.write();
        let before = records.len();
        records.retain(|r| r.created_at >= cutoff);
        Ok((before - records.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_commerce::audit::{AuditAction, PriceSnapshot, ProductSnapshot};
    use cart_commerce::money::Currency;

    fn line(user: &str, product: &str, quantity: i64) -> CartLine {
        CartLine::new(
            UserId::new(user),
            ProductId::new(product),
            quantity,
            serde_json::Value::Null,
            None,
        )
    }

    fn record(user: &str, line_id: &str, created_at: i64) -> AuditRecord {
        let mut rec = AuditRecord::new(
            UserId::new(user),
            ProductId::new("prod-1"),
            CartLineId::new(line_id),
            1,
            AuditAction::Add,
            ProductSnapshot {
                product_id: ProductId::new("prod-1"),
                name: None,
                active: true,
                stock: 0,
            },
            PriceSnapshot {
                unit_price: None,
                currency: Currency::USD,
                entries: vec![],
            },
            serde_json::Value::Null,
        );
        rec.created_at = created_at;
        rec
    }

    #[test]
    fn test_unique_constraint() {
        let store = InMemoryCartLineStore::new();
        store.insert(&line("u1", "p1", 1)).unwrap();
        let err = store.insert(&line("u1", "p1", 2)).unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));
        // Different user is fine
        store.insert(&line("u2", "p1", 1)).unwrap();
    }

    #[test]
    fn test_aggregates() {
        let store = InMemoryCartLineStore::new();
        store.insert(&line("u1", "p1", 2)).unwrap();
        store.insert(&line("u1", "p2", 3)).unwrap();
        store.insert(&line("u2", "p1", 9)).unwrap();

        assert_eq!(store.count_by_user(&UserId::new("u1")).unwrap(), 2);
        assert_eq!(store.sum_quantity_by_user(&UserId::new("u1")).unwrap(), 5);
    }

    #[test]
    fn test_set_selected_skips_unknown_ids() {
        let store = InMemoryCartLineStore::new();
        let l = line("u1", "p1", 1);
        store.insert(&l).unwrap();

        let updated = store
            .set_selected(
                &UserId::new("u1"),
                &[l.id.clone(), CartLineId::new("missing")],
                false,
            )
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert!(!updated[0].selected);
    }

    #[test]
    fn test_soft_delete_idempotent_count() {
        let store = InMemoryAuditLogStore::new();
        store.append(&record("u1", "l1", 10)).unwrap();
        store.append(&record("u1", "l1", 20)).unwrap();

        let lines = [CartLineId::new("l1")];
        assert_eq!(store.soft_delete_by_lines(&lines, 100).unwrap(), 2);
        // Second pass counts nothing
        assert_eq!(store.soft_delete_by_lines(&lines, 200).unwrap(), 0);
    }

    #[test]
    fn test_delete_older_than() {
        let store = InMemoryAuditLogStore::new();
        store.append(&record("u1", "l1", 10)).unwrap();
        store.append(&record("u1", "l2", 50)).unwrap();

        assert_eq!(store.delete_older_than(20).unwrap(), 1);
        assert_eq!(store.find_by_user(&UserId::new("u1")).unwrap().len(), 1);
    }
}
