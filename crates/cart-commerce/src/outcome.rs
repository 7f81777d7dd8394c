//! Uniform result shape for mutation operations.
//!
//! Every mutation entry point returns the same envelope regardless of
//! success or failure, so calling layers can render one generic path.

use crate::error::CartError;
use serde::{Deserialize, Serialize};

/// Outcome of a cart mutation operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MutationOutcome {
    /// Whether the operation committed.
    pub success: bool,
    /// Number of lines the operation touched.
    pub affected_count: u64,
    /// Distinct lines in the user's cart after the operation.
    pub total_cart_items: u64,
    /// Summed quantity in the user's cart after the operation.
    pub total_quantity: i64,
    /// Human-readable message; error display on failure.
    pub message: Option<String>,
    /// Machine-inspectable error kind slugs; empty on success.
    pub errors: Vec<String>,
}

impl MutationOutcome {
    /// Successful outcome with cart totals.
    pub fn succeeded(affected_count: u64, total_cart_items: u64, total_quantity: i64) -> Self {
        Self {
            success: true,
            affected_count,
            total_cart_items,
            total_quantity,
            message: None,
            errors: Vec::new(),
        }
    }

    /// Failed outcome carrying the error's kind slug and display message.
    pub fn failed(error: &CartError, total_cart_items: u64, total_quantity: i64) -> Self {
        Self {
            success: false,
            affected_count: 0,
            total_cart_items,
            total_quantity,
            message: Some(format!("{}: {}", error.kind(), error)),
            errors: vec![error.kind().to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_succeeded() {
        let outcome = MutationOutcome::succeeded(1, 3, 7);
        assert!(outcome.success);
        assert_eq!(outcome.affected_count, 1);
        assert_eq!(outcome.total_cart_items, 3);
        assert_eq!(outcome.total_quantity, 7);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_failed_carries_kind_slug() {
        let err = CartError::LineNotFound("line-9".into());
        let outcome = MutationOutcome::failed(&err, 2, 4);
        assert!(!outcome.success);
        assert_eq!(outcome.affected_count, 0);
        assert_eq!(outcome.errors, vec!["line-not-found".to_string()]);
        let message = outcome.message.unwrap();
        assert!(message.contains("line-not-found"));
        assert!(message.contains("line-9"));
    }
}
