//! Store errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a [`JobStore`](super::JobStore)
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed row does not exist (or does not belong to the given job)
    #[error("Not found")]
    NotFound,

    /// A foreign key in the payload points at a missing row
    #[error("Invalid reference: {field} {id} does not exist")]
    InvalidReference { field: &'static str, id: i64 },

    /// The payload is not storable as given
    #[error("Invalid input: {0}")]
    Invalid(&'static str),

    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),

    /// A stored row could not be decoded
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// The connection mutex was poisoned by a panicking holder
    #[error("Store connection poisoned")]
    Poisoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = StoreError::InvalidReference { field: "template", id: 3 };
        assert_eq!(err.to_string(), "Invalid reference: template 3 does not exist");
    }
}
