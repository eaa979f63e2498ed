use tal_store::StoreError;
use tal_types::TypeError;

/// Errors produced by record operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("no record at key {key}")]
    NotFound { key: String },

    #[error("undecodable record at key {key}: {source}")]
    Decode { key: String, source: TypeError },

    #[error("encode error: {0}")]
    Encode(#[from] TypeError),

    #[error("selector {selector} matched more than one record ({first}, {second})")]
    AmbiguousMatch {
        selector: String,
        first: String,
        second: String,
    },

    #[error("key allocation failed: {0}")]
    Allocation(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result alias for record operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
