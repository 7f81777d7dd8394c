//! Storage boundary traits.
//!
//! The engine owns no persistence; it talks to these traits. Adapters are
//! expected to enforce the (user, product) uniqueness constraint on cart
//! lines and to run each engine operation inside the caller's unit of work.

use cart_commerce::audit::AuditRecord;
use cart_commerce::ids::{CartLineId, ProductId, UserId};
use cart_commerce::line::CartLine;
use cart_commerce::CartError;
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Insert violated the (user, product) uniqueness constraint.
    ///
    /// The losing side of a concurrent create race sees this; the caller
    /// retries the operation as an update.
    #[error("Unique constraint violated for user {user_id}, product {product_id}")]
    UniqueViolation {
        user_id: String,
        product_id: String,
    },

    /// Any other backend failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for CartError {
    fn from(e: StoreError) -> Self {
        CartError::StoreFailure(e.to_string())
    }
}

/// Durable keyed storage for cart lines.
///
/// Keyed by (user, line id) with a secondary (user, product) uniqueness
/// constraint.
pub trait CartLineStore: Send + Sync {
    /// Insert a new line. Fails with [`StoreError::UniqueViolation`] if the
    /// user already has a line for the product.
    fn insert(&self, line: &CartLine) -> Result<(), StoreError>;

    /// Overwrite an existing line.
    fn update(&self, line: &CartLine) -> Result<(), StoreError>;

    /// Find one line by (user, id).
    fn find_by_user_and_id(
        &self,
        user: &UserId,
        id: &CartLineId,
    ) -> Result<Option<CartLine>, StoreError>;

    /// Find the lines a user owns among the given ids; unknown ids are
    /// simply absent from the result.
    fn find_by_user_and_ids(
        &self,
        user: &UserId,
        ids: &[CartLineId],
    ) -> Result<Vec<CartLine>, StoreError>;

    /// All lines for a user.
    fn find_by_user(&self, user: &UserId) -> Result<Vec<CartLine>, StoreError>;

    /// Find a line by (user, product).
    fn find_by_user_and_product(
        &self,
        user: &UserId,
        product: &ProductId,
    ) -> Result<Option<CartLine>, StoreError>;

    /// Count of distinct lines for a user.
    fn count_by_user(&self, user: &UserId) -> Result<u64, StoreError>;

    /// Summed quantity across a user's lines.
    fn sum_quantity_by_user(&self, user: &UserId) -> Result<i64, StoreError>;

    /// Bulk selection-flag update; returns the lines actually updated.
    fn set_selected(
        &self,
        user: &UserId,
        ids: &[CartLineId],
        selected: bool,
    ) -> Result<Vec<CartLine>, StoreError>;

    /// Delete one line; returns whether it existed.
    fn delete(&self, user: &UserId, id: &CartLineId) -> Result<bool, StoreError>;

    /// Bulk delete; returns the number of lines removed.
    fn delete_by_user_and_ids(
        &self,
        user: &UserId,
        ids: &[CartLineId],
    ) -> Result<u64, StoreError>;
}

/// Durable append log for audit records, keyed by cart-line id.
pub trait AuditLogStore: Send + Sync {
    /// Append one record.
    fn append(&self, record: &AuditRecord) -> Result<(), StoreError>;

    /// All records for one line, soft-deleted included.
    fn find_by_line(&self, line: &CartLineId) -> Result<Vec<AuditRecord>, StoreError>;

    /// All records for a set of lines, soft-deleted included.
    fn find_by_lines(&self, lines: &[CartLineId]) -> Result<Vec<AuditRecord>, StoreError>;

    /// All records for a user, soft-deleted included.
    fn find_by_user(&self, user: &UserId) -> Result<Vec<AuditRecord>, StoreError>;

    /// Mark all not-yet-deleted records for the given lines as deleted,
    /// stamping the given time. Returns the number of records transitioned;
    /// already-deleted records are untouched and uncounted.
    fn soft_delete_by_lines(
        &self,
        lines: &[CartLineId],
        deleted_at: i64,
    ) -> Result<u64, StoreError>;

    /// Hard-delete records created before the cutoff. Returns the number
    /// removed.
    fn delete_older_than(&self, cutoff: i64) -> Result<u64, StoreError>;
}
