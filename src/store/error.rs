//! Store error types

use thiserror::Error;

/// Errors that can occur in the store
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite call failed
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Row does not exist or is not visible to the caller
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A stored column holds a value the domain does not recognise
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    /// Operation not allowed in the row's current state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Schema migration failed
    #[error("Migration v{version} failed: {reason}")]
    Migration { version: i64, reason: String },

    /// I/O error preparing the database location
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        StoreError::InvalidValue {
            field,
            value: value.into(),
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
