use thiserror::Error;

/// Errors produced by record encoding and decoding.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("failed to encode record: {0}")]
    Encode(String),

    #[error("failed to decode record: {0}")]
    Decode(String),

    #[error("unknown doc type: {0}")]
    UnknownDocType(String),

    #[error("expected {expected} record, found {found}")]
    KindMismatch {
        expected: &'static str,
        found: String,
    },
}
