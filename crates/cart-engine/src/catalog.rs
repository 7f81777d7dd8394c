//! Catalog gateway boundary.
//!
//! The cart core never owns product data; it resolves validity, stock, and
//! price through this gateway and keeps at most a point-in-time snapshot.

use crate::store::StoreError;
use cart_commerce::audit::PriceEntry;
use cart_commerce::ids::ProductId;
use cart_commerce::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// A product as the catalog currently sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogProduct {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Whether the product can currently be sold.
    pub active: bool,
}

/// Read-only gateway to the external SKU catalog.
pub trait CatalogGateway: Send + Sync {
    /// Resolve a product id; `None` if the catalog doesn't know it.
    fn resolve_product(&self, id: &ProductId) -> Result<Option<CatalogProduct>, StoreError>;

    /// Currently available stock for a product.
    fn current_stock(&self, id: &ProductId) -> Result<i64, StoreError>;

    /// Current unit price; `None` when the catalog carries no price.
    fn current_unit_price(&self, id: &ProductId) -> Result<Option<Money>, StoreError>;

    /// Applicable price entries for snapshotting into audit records.
    fn price_entries(&self, id: &ProductId) -> Result<Vec<PriceEntry>, StoreError>;
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    product: CatalogProduct,
    stock: i64,
    unit_price: Option<Money>,
    price_entries: Vec<PriceEntry>,
}

/// In-memory catalog gateway for tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    entries: RwLock<HashMap<ProductId, CatalogEntry>>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a product.
    pub fn put_product(
        &self,
        id: &ProductId,
        name: impl Into<String>,
        active: bool,
        stock: i64,
        unit_price: Option<Money>,
    ) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            id.clone(),
            CatalogEntry {
                product: CatalogProduct {
                    id: id.clone(),
                    name: name.into(),
                    active,
                },
                stock,
                unit_price,
                price_entries: Vec::new(),
            },
        );
    }

    /// Replace a product's current unit price.
    pub fn set_unit_price(&self, id: &ProductId, unit_price: Option<Money>) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get_mut(id) {
            entry.unit_price = unit_price;
        }
    }

    /// Replace a product's stock level.
    pub fn set_stock(&self, id: &ProductId, stock: i64) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get_mut(id) {
            entry.stock = stock;
        }
    }

    /// Replace a product's price entries.
    pub fn set_price_entries(&self, id: &ProductId, price_entries: Vec<PriceEntry>) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get_mut(id) {
            entry.price_entries = price_entries;
        }
    }

    fn with_entry<T>(&self, id: &ProductId, f: impl FnOnce(&CatalogEntry) -> T) -> Option<T> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(id).map(f)
    }
}

impl CatalogGateway for InMemoryCatalog {
    fn resolve_product(&self, id: &ProductId) -> Result<Option<CatalogProduct>, StoreError> {
        Ok(self.with_entry(id, |e| e.product.clone()))
    }

    fn current_stock(&self, id: &ProductId) -> Result<i64, StoreError> {
        Ok(self.with_entry(id, |e| e.stock).unwrap_or(0))
    }

    fn current_unit_price(&self, id: &ProductId) -> Result<Option<Money>, StoreError> {
        Ok(self.with_entry(id, |e| e.unit_price).flatten())
    }

    fn price_entries(&self, id: &ProductId) -> Result<Vec<PriceEntry>, StoreError> {
        Ok(self
            .with_entry(id, |e| e.price_entries.clone())
            .unwrap_or_default())
    }
}
