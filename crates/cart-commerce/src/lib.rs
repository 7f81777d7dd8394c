//! Domain types for the per-user shopping cart core.
//!
//! This crate provides the data model shared by the cart mutation engine,
//! the pricing engine, and the mutation audit log:
//!
//! - **Lines**: cart lines with quantity/selection state and capacity limits
//! - **Money**: cents-based fixed-point amounts with currency
//! - **Audit**: immutable mutation records with product/price snapshots
//! - **Quotes**: priced cart totals with discount details
//! - **Events**: domain events emitted after committed mutations
//!
//! # Example
//!
//! ```rust
//! use cart_commerce::prelude::*;
//!
//! let line = CartLine::new(
//!     UserId::new("user-1"),
//!     ProductId::new("prod-1"),
//!     2,
//!     serde_json::json!({}),
//!     Some(Money::new(4999, Currency::USD)),
//! );
//! assert!(line.selected);
//! assert_eq!(line.quantity, 2);
//! ```

pub mod audit;
pub mod customer;
pub mod error;
pub mod event;
pub mod ids;
pub mod line;
pub mod money;
pub mod outcome;
pub mod quote;

pub use error::CartError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::audit::{
        AuditAction, AuditRecord, PriceEntry, PriceSnapshot, ProductSnapshot,
    };
    pub use crate::customer::{Customer, DisplayName};
    pub use crate::error::CartError;
    pub use crate::event::CartEvent;
    pub use crate::ids::*;
    pub use crate::line::{CartLimits, CartLine};
    pub use crate::money::{Currency, Money};
    pub use crate::outcome::MutationOutcome;
    pub use crate::quote::{DiscountDetail, DiscountKind, PriceQuote};
}

/// Get current Unix timestamp in seconds.
pub(crate) fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
