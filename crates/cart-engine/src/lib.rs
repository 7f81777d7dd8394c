//! Cart mutation engine, pricing engine, and mutation audit log.
//!
//! This crate orchestrates the cart domain types from `cart-commerce`
//! against externally-owned collaborators:
//!
//! - **Stores**: [`store::CartLineStore`] and [`store::AuditLogStore`]
//!   traits, with in-memory reference adapters in [`memory`]
//! - **Catalog**: the [`catalog::CatalogGateway`] product/price/stock
//!   boundary
//! - **Engine**: [`engine::CartMutationEngine`], the only writer of cart
//!   lines
//! - **Pricing**: [`pricing::PricingEngine`], pure and fail-soft
//! - **Audit**: [`audit_log::MutationAuditLog`], append-mostly with a
//!   soft-delete lifecycle
//! - **Logging**: [`logging::LoggedCartEngine`], the tracing decorator
//!   producing uniform mutation outcomes
//!
//! # Example
//!
//! ```rust
//! use cart_engine::prelude::*;
//! use cart_commerce::prelude::*;
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(InMemoryCatalog::new());
//! let product = ProductId::new("prod-1");
//! catalog.put_product(&product, "Widget", true, 10,
//!     Some(Money::new(4999, Currency::USD)));
//!
//! let audit = MutationAuditLog::new(
//!     catalog.clone(),
//!     Arc::new(InMemoryAuditLogStore::new()),
//!     Currency::USD,
//! );
//! let engine = CartMutationEngine::new(
//!     Arc::new(InMemoryCartLineStore::new()),
//!     catalog,
//!     audit,
//!     Arc::new(KeyedLocks::new()),
//!     Arc::new(NullEventSink),
//! );
//!
//! let user = UserId::new("user-1");
//! let line = engine.add_item(&user, &product, 2, serde_json::json!({})).unwrap();
//! assert_eq!(line.quantity, 2);
//! ```

pub mod audit_log;
pub mod catalog;
pub mod engine;
pub mod events;
pub mod freight;
pub mod lock;
pub mod logging;
pub mod memory;
pub mod pricing;
pub mod store;

pub use engine::CartMutationEngine;
pub use pricing::PricingEngine;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::audit_log::MutationAuditLog;
    pub use crate::catalog::{CatalogGateway, CatalogProduct, InMemoryCatalog};
    pub use crate::engine::CartMutationEngine;
    pub use crate::events::{EventSink, NullEventSink, RecordingEventSink};
    pub use crate::freight::{FlatRateFreight, FreightOracle};
    pub use crate::lock::KeyedLocks;
    pub use crate::logging::LoggedCartEngine;
    pub use crate::memory::{InMemoryAuditLogStore, InMemoryCartLineStore};
    pub use crate::pricing::{PricingEngine, PromotionTier, PromotionTiers};
    pub use crate::store::{AuditLogStore, CartLineStore, StoreError};
}

/// Get current Unix timestamp in seconds.
pub(crate) fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
