//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Domain rule violations (stock, empty order)    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  └── DbError          - Store failures, wraps CoreError                │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── CliError         - What the operator sees (code + message)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → CliError → Operator     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every layer answers [`ErrorKind`] so callers can branch on the category
//! of failure without matching on variants.

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// Machine-checkable category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Insufficient stock, unknown sku, malformed intent.
    Validation,
    /// Duplicate sku or category name.
    Conflict,
    /// Targeted order/product/category does not exist.
    NotFound,
    /// Anything unexpected (store failure, corrupt row).
    Internal,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Raised by the order engine while validating an intent against the stock
/// ledger. All of them abort the surrounding unit of work.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The intent references a sku that is not in the catalog.
    #[error("Product with SKU '{0}' not found")]
    UnknownSku(String),

    /// Not enough stock on hand to reserve the requested quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Order intent: HELMET-M × 5
    ///      │
    ///      ▼
    /// Stock ledger: available = 3
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "HELMET-M", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Operator sees: "... available 3, requested 5 (short by 2)"
    /// ```
    #[error(
        "Insufficient stock for {sku}: available {available}, requested {requested} (short by {})",
        .requested - .available
    )]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// A new order must carry at least one line.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Every core error is a rejection of the caller's input.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }

    /// Units missing to satisfy an insufficient-stock request.
    pub fn shortfall(&self) -> Option<i64> {
        match self {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => Some(requested - available),
            _ => None,
        }
    }

    /// The sku this error is about, if any.
    pub fn sku(&self) -> Option<&str> {
        match self {
            CoreError::UnknownSku(sku) | CoreError::InsufficientStock { sku, .. } => Some(sku),
            _ => None,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Produced at the boundary while turning loose payloads into
/// [`OrderIntent`](crate::intent::OrderIntent)s and catalog records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: String, max: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid date, malformed JSON).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message_names_sku_and_shortfall() {
        let err = CoreError::InsufficientStock {
            sku: "SKU1".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for SKU1: available 3, requested 5 (short by 2)"
        );
        assert_eq!(err.shortfall(), Some(2));
        assert_eq!(err.sku(), Some("SKU1"));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("customerName").to_string(),
            "customerName is required"
        );
        assert_eq!(
            ValidationError::invalid_format("orderDate", "expected YYYY-MM-DD").to_string(),
            "orderDate has invalid format: expected YYYY-MM-DD"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("sku").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.sku(), None);
    }
}
