/// Errors from ledger store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backing ledger rejected or failed the operation.
    #[error("backend error: {0}")]
    Backend(String),

    /// The selector query string could not be parsed.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// A conditional write found a value other than the expected one.
    #[error("conflicting write at key {key}")]
    Conflict { key: String },

    /// The backend does not provide this primitive.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Iterating or closing a cursor failed.
    #[error("cursor error: {0}")]
    Cursor(String),

    /// A snapshot could not be encoded or decoded.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// An internal lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
