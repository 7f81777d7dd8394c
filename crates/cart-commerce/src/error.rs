//! Cart error types.
//!
//! Each variant maps to a stable machine-inspectable kind slug via
//! [`CartError::kind`]; callers branch on the slug, the display string is
//! for humans.

use thiserror::Error;

/// Errors that can occur in cart operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CartError {
    /// Requested quantity outside the allowed range.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Merged quantity would exceed the per-line ceiling.
    #[error("Quantity {0} exceeds maximum allowed per line ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Product unresolvable or inactive at mutation time.
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    /// Requested quantity exceeds available stock.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: i64,
        available: i64,
    },

    /// Per-user line-count ceiling would be breached.
    #[error("Cart line limit reached: {current} of {max}")]
    LineLimitExceeded { current: u64, max: u64 },

    /// Per-user aggregate quantity ceiling would be breached.
    #[error("Cart quantity limit reached: {current} of {max}")]
    QuantityLimitExceeded { current: i64, max: i64 },

    /// Referenced cart line does not exist for the requesting user.
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// A bulk operation referenced ids that don't belong to the user.
    #[error("Cart lines not found: {}", .0.join(", "))]
    PartialNotFound(Vec<String>),

    /// Pricing computation could not complete.
    #[error("Pricing failure: {0}")]
    PricingFailure(String),

    /// Underlying persistence error.
    #[error("Store failure: {0}")]
    StoreFailure(String),
}

impl CartError {
    /// Stable error kind slug for machine inspection.
    ///
    /// Note that a merged quantity over the per-line ceiling is an
    /// `invalid-quantity`, not a `limit-exceeded`: the limit slugs are
    /// reserved for the per-user line-count and aggregate ceilings.
    pub fn kind(&self) -> &'static str {
        match self {
            CartError::InvalidQuantity(_) | CartError::QuantityExceedsLimit(_, _) => {
                "invalid-quantity"
            }
            CartError::InvalidProduct(_) => "invalid-product",
            CartError::InsufficientStock { .. } => "insufficient-stock",
            CartError::LineLimitExceeded { .. } | CartError::QuantityLimitExceeded { .. } => {
                "limit-exceeded"
            }
            CartError::LineNotFound(_) => "line-not-found",
            CartError::PartialNotFound(_) => "partial-not-found",
            CartError::PricingFailure(_) => "pricing-failure",
            CartError::StoreFailure(_) => "store-failure",
        }
    }
}
