//! Error types for database operations

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum Error {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored row could not be turned back into a domain value
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Update targeted a row that does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for roster_core::Error {
    fn from(err: Error) -> Self {
        roster_core::Error::storage(err)
    }
}
