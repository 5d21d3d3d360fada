//! # CLI Error Type
//!
//! What the operator sees when a command fails.
//!
//! ```text
//! ConfigError     ─┐
//! io::Error       ─┤
//! ValidationError ─┤
//! CoreError       ─┼──► CliError { code, message } ──► stderr + exit code
//! DbError         ─┘
//! ```
//!
//! Store failures are logged in full and reported with a generic message.

use serde::Serialize;
use tally_core::{CoreError, ErrorKind, ValidationError};
use tally_db::DbError;

use crate::config::ConfigError;

/// Error returned by every command.
///
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for HLM-ROAD-M: available 3, requested 5 (short by 2)"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Order, product or category does not exist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Duplicate sku or category name
    Conflict,

    /// Not enough units on hand
    InsufficientStock,

    /// Store operation failed
    DatabaseError,

    /// Bad environment configuration
    ConfigError,

    /// Intent file could not be read
    IoError,

    Internal,
}

impl ErrorCode {
    pub fn kind(self) -> ErrorKind {
        match self {
            ErrorCode::NotFound => ErrorKind::NotFound,
            ErrorCode::ValidationError | ErrorCode::InsufficientStock => ErrorKind::Validation,
            ErrorCode::Conflict => ErrorKind::Conflict,
            ErrorCode::DatabaseError
            | ErrorCode::ConfigError
            | ErrorCode::IoError
            | ErrorCode::Internal => ErrorKind::Internal,
        }
    }
}

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        CliError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ValidationError, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// Process exit status for this error.
    ///
    /// `2` is left to clap for usage errors.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Validation => 3,
            ErrorKind::NotFound => 4,
            ErrorKind::Conflict => 5,
            ErrorKind::Internal => 1,
        }
    }
}

impl From<DbError> for CliError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(e) => CliError::from(e),
            DbError::NotFound { entity, id } => CliError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => CliError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                CliError::validation("Invalid reference")
            }
            DbError::CheckViolation { message } => CliError::validation(message),
            DbError::Busy(e) => {
                tracing::error!("Database busy: {}", e);
                CliError::new(
                    ErrorCode::DatabaseError,
                    "Database is busy, another writer held the lock too long",
                )
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                CliError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Corrupt { column, value } => {
                tracing::error!(%column, %value, "Corrupt stored value");
                CliError::new(ErrorCode::Internal, "Stored data is corrupt")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                CliError::new(ErrorCode::Internal, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownSku(sku) => CliError::new(
                ErrorCode::ValidationError,
                format!("Product with SKU '{}' not found", sku),
            ),
            e @ CoreError::InsufficientStock { .. } => {
                CliError::new(ErrorCode::InsufficientStock, e.to_string())
            }
            CoreError::EmptyOrder => CliError::validation("Order must contain at least one item"),
            CoreError::Validation(e) => CliError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::from(CoreError::Validation(err))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::new(ErrorCode::IoError, err.to_string())
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for CliError {}
