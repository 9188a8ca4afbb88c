//! Unified error type for the ledger.
//!
//! Validation failures carry enough context to be reported back to whoever
//! submitted the request; storage failures wrap the underlying `SeaORM` error.

use sea_orm::DbErr;
use thiserror::Error;

/// All errors produced by the crate
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Marks, periods, amounts or enum values outside their allowed domain
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Which value was rejected and why
        message: String,
    },

    /// A payment amount that is zero, negative or not finite
    #[error("Invalid payment amount: {amount}")]
    InvalidPayment {
        /// The rejected amount
        amount: f64,
    },

    /// An attendance write collided with an existing key and the fallback update found no row
    #[error("Attendance record already exists for {key}")]
    UniquenessConflict {
        /// Human-readable rendering of the uniqueness key
        key: String,
    },

    /// A record looked up by id does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record (e.g. "grade", "fee")
        entity: &'static str,
        /// The id that was requested
        id: i64,
    },

    /// The editor is not allowed to modify the record
    #[error("Access denied: {message}")]
    AccessDenied {
        /// Why access was refused
        message: String,
    },

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for building an [`Error::InvalidInput`].
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
