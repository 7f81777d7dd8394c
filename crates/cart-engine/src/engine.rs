//! Cart mutation engine.
//!
//! The only component with write access to cart lines. Each operation
//! validates, talks to the catalog and the line store, writes the audit
//! record, and emits a domain event, in that order. The enclosing unit of
//! work (begin/commit/rollback) belongs to the caller layer; any error
//! returned from here is its signal to roll back.

use crate::audit_log::MutationAuditLog;
use crate::catalog::CatalogGateway;
use crate::events::EventSink;
use crate::lock::KeyedLocks;
use crate::store::CartLineStore;
use cart_commerce::audit::AuditAction;
use cart_commerce::event::CartEvent;
use cart_commerce::ids::{CartLineId, ProductId, UserId};
use cart_commerce::line::{CartLimits, CartLine};
use cart_commerce::CartError;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Orchestrates cart mutations for all users.
pub struct CartMutationEngine {
    lines: Arc<dyn CartLineStore>,
    catalog: Arc<dyn CatalogGateway>,
    audit: MutationAuditLog,
    locks: Arc<KeyedLocks>,
    events: Arc<dyn EventSink>,
    limits: CartLimits,
}

impl CartMutationEngine {
    /// Create an engine with default capacity limits.
    pub fn new(
        lines: Arc<dyn CartLineStore>,
        catalog: Arc<dyn CatalogGateway>,
        audit: MutationAuditLog,
        locks: Arc<KeyedLocks>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            lines,
            catalog,
            audit,
            locks,
            events,
            limits: CartLimits::default(),
        }
    }

    /// Override the capacity limits.
    pub fn with_limits(mut self, limits: CartLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The audit log this engine writes through.
    pub fn audit_log(&self) -> &MutationAuditLog {
        &self.audit
    }

    /// Add a product to the user's cart.
    ///
    /// Merges into an existing (user, product) line if one exists; the
    /// merge records an `Update` audit entry whose quantity is the delta.
    /// A fresh line is created selected and records an `Add` entry.
    pub fn add_item(
        &self,
        user: &UserId,
        product: &ProductId,
        quantity: i64,
        metadata: serde_json::Value,
    ) -> Result<CartLine, CartError> {
        self.add_or_merge(user, product, quantity, metadata, AuditAction::Add)
    }

    /// Re-add a previously removed product.
    ///
    /// Identical to [`add_item`](Self::add_item) except the create path
    /// records a `Restore` audit entry.
    pub fn restore_item(
        &self,
        user: &UserId,
        product: &ProductId,
        quantity: i64,
        metadata: serde_json::Value,
    ) -> Result<CartLine, CartError> {
        self.add_or_merge(user, product, quantity, metadata, AuditAction::Restore)
    }

    fn add_or_merge(
        &self,
        user: &UserId,
        product: &ProductId,
        quantity: i64,
        metadata: serde_json::Value,
        create_action: AuditAction,
    ) -> Result<CartLine, CartError> {
        if !self.limits.quantity_in_range(quantity) {
            return Err(CartError::InvalidQuantity(quantity));
        }
        let resolved = self
            .catalog
            .resolve_product(product)?
            .ok_or_else(|| CartError::InvalidProduct(product.to_string()))?;
        if !resolved.active {
            return Err(CartError::InvalidProduct(product.to_string()));
        }
        let available = self.catalog.current_stock(product)?;
        if available < quantity {
            return Err(CartError::InsufficientStock {
                product_id: product.to_string(),
                requested: quantity,
                available,
            });
        }
        let total_quantity = self.lines.sum_quantity_by_user(user)?;
        let projected = total_quantity.checked_add(quantity).unwrap_or(i64::MAX);
        if projected > self.limits.max_total_quantity {
            return Err(CartError::QuantityLimitExceeded {
                current: total_quantity,
                max: self.limits.max_total_quantity,
            });
        }

        if let Some(mut line) = self.lines.find_by_user_and_product(user, product)? {
            let merged = line
                .quantity
                .checked_add(quantity)
                .unwrap_or(self.limits.max_quantity_per_line + 1);
            if merged > self.limits.max_quantity_per_line {
                return Err(CartError::QuantityExceedsLimit(
                    merged,
                    self.limits.max_quantity_per_line,
                ));
            }
            line.set_quantity(merged);
            line.merge_metadata(metadata.clone());
            self.lines.update(&line)?;
            // Merge deltas are the requested amount, not the merged total.
            self.audit
                .record(AuditAction::Update, user, product, &line.id, quantity, metadata)?;
            self.events.emit(CartEvent::ItemUpdated {
                user_id: user.clone(),
                line_id: line.id.clone(),
                product_id: product.clone(),
                quantity: line.quantity,
            });
            return Ok(line);
        }

        let count = self.lines.count_by_user(user)?;
        if count >= self.limits.max_lines_per_cart {
            return Err(CartError::LineLimitExceeded {
                current: count,
                max: self.limits.max_lines_per_cart,
            });
        }
        let unit_price = self.catalog.current_unit_price(product)?;
        let line = CartLine::new(
            user.clone(),
            product.clone(),
            quantity,
            metadata.clone(),
            unit_price,
        );
        self.lines.insert(&line)?;
        self.audit
            .record(create_action, user, product, &line.id, quantity, metadata)?;
        self.events.emit(CartEvent::ItemAdded {
            user_id: user.clone(),
            line_id: line.id.clone(),
            product_id: product.clone(),
            quantity,
        });
        Ok(line)
    }

    /// Overwrite a line's quantity.
    ///
    /// The read-modify-write runs under the per-(user, line) lock so the
    /// delta recorded in the audit log reflects a serialized before/after
    /// pair even under racing callers.
    pub fn update_quantity(
        &self,
        user: &UserId,
        line_id: &CartLineId,
        quantity: i64,
    ) -> Result<CartLine, CartError> {
        if !self.limits.quantity_in_range(quantity) {
            return Err(CartError::InvalidQuantity(quantity));
        }
        let key = format!("cart-line:{}:{}", user, line_id);
        self.locks.acquire_and_run(&key, || {
            let mut line = self
                .lines
                .find_by_user_and_id(user, line_id)?
                .ok_or_else(|| CartError::LineNotFound(line_id.to_string()))?;
            let delta = quantity - line.quantity;
            line.set_quantity(quantity);
            self.lines.update(&line)?;
            self.audit.record(
                AuditAction::Update,
                user,
                &line.product_id,
                line_id,
                delta,
                serde_json::Value::Null,
            )?;
            self.events.emit(CartEvent::ItemUpdated {
                user_id: user.clone(),
                line_id: line_id.clone(),
                product_id: line.product_id.clone(),
                quantity,
            });
            Ok(line)
        })
    }

    /// Remove one line.
    ///
    /// Soft-deletes the line's audit records before hard-deleting the line.
    /// No lock: the line ceases to exist afterwards.
    pub fn remove_item(&self, user: &UserId, line_id: &CartLineId) -> Result<(), CartError> {
        let line = self
            .lines
            .find_by_user_and_id(user, line_id)?
            .ok_or_else(|| CartError::LineNotFound(line_id.to_string()))?;
        self.audit.soft_delete_by_line(&line.id)?;
        self.lines.delete(user, &line.id)?;
        self.events.emit(CartEvent::ItemRemoved {
            user_id: user.clone(),
            line_id: line.id,
        });
        Ok(())
    }

    /// Remove every line the user owns.
    ///
    /// Returns the number of lines removed; an empty cart returns 0 with no
    /// side effects. Audit soft-deletion runs as one bulk call.
    pub fn clear_cart(&self, user: &UserId) -> Result<u64, CartError> {
        let lines = self.lines.find_by_user(user)?;
        if lines.is_empty() {
            return Ok(0);
        }
        let ids: Vec<CartLineId> = lines.into_iter().map(|l| l.id).collect();
        self.audit.batch_soft_delete_by_lines(&ids)?;
        let count = self.lines.delete_by_user_and_ids(user, &ids)?;
        self.events.emit(CartEvent::CartCleared {
            user_id: user.clone(),
            count,
        });
        Ok(count)
    }

    /// Set one line's selection flag.
    ///
    /// Pure flag mutation: no audit record.
    pub fn update_selection(
        &self,
        user: &UserId,
        line_id: &CartLineId,
        selected: bool,
    ) -> Result<CartLine, CartError> {
        let updated = self
            .lines
            .set_selected(user, std::slice::from_ref(line_id), selected)?;
        let line = updated
            .into_iter()
            .next()
            .ok_or_else(|| CartError::LineNotFound(line_id.to_string()))?;
        self.events.emit(CartEvent::SelectionChanged {
            user_id: user.clone(),
            line_ids: vec![line.id.clone()],
            selected,
        });
        Ok(line)
    }

    /// Set the selection flag on many lines at once.
    ///
    /// Ids the user doesn't own are silently skipped, not an error; callers
    /// needing all-or-nothing existence checks pre-validate with
    /// [`require_lines`](Self::require_lines).
    pub fn batch_update_selection(
        &self,
        user: &UserId,
        line_ids: &[CartLineId],
        selected: bool,
    ) -> Result<BTreeMap<CartLineId, CartLine>, CartError> {
        let updated = self.lines.set_selected(user, line_ids, selected)?;
        if updated.is_empty() {
            return Ok(BTreeMap::new());
        }
        self.events.emit(CartEvent::SelectionChanged {
            user_id: user.clone(),
            line_ids: updated.iter().map(|l| l.id.clone()).collect(),
            selected,
        });
        Ok(updated.into_iter().map(|l| (l.id.clone(), l)).collect())
    }

    /// Resolve a set of line ids the user must all own.
    ///
    /// All-or-nothing counterpart to the skip-on-missing batch selection:
    /// fails listing every id the user does not own, so callers can
    /// pre-validate a bulk mutation before issuing it.
    pub fn require_lines(
        &self,
        user: &UserId,
        line_ids: &[CartLineId],
    ) -> Result<Vec<CartLine>, CartError> {
        let found = self.lines.find_by_user_and_ids(user, line_ids)?;
        let owned: HashSet<&CartLineId> = found.iter().map(|l| &l.id).collect();
        let missing: Vec<String> = line_ids
            .iter()
            .filter(|id| !owned.contains(id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CartError::PartialNotFound(missing));
        }
        Ok(found)
    }

    /// Number of distinct lines in the user's cart.
    pub fn cart_item_count(&self, user: &UserId) -> Result<u64, CartError> {
        Ok(self.lines.count_by_user(user)?)
    }

    /// Summed quantity across the user's cart.
    pub fn cart_total_quantity(&self, user: &UserId) -> Result<i64, CartError> {
        Ok(self.lines.sum_quantity_by_user(user)?)
    }

    /// All lines in the user's cart.
    pub fn cart_lines(&self, user: &UserId) -> Result<Vec<CartLine>, CartError> {
        Ok(self.lines.find_by_user(user)?)
    }
}
