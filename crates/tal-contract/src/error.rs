use thiserror::Error;

/// Errors returned to the caller of [`Contract::invoke`](crate::Contract::invoke).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("Invalid Smart Contract function name.")]
    InvalidFunction(String),

    #[error("Incorrect number of arguments. Expecting {expected}")]
    Arity { expected: usize, got: usize },

    #[error("ledger error: {0}")]
    Ledger(#[from] tal_ledger::LedgerError),
}

pub type ContractResult<T> = Result<T, ContractError>;
