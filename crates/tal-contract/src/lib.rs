//! Contract dispatcher for the Trust Anchor Ledger.
//!
//! Callers name an operation and pass positional string arguments, the way a
//! ledger client submits a transaction proposal. [`Contract::invoke`] checks
//! the name and argument count, then routes to the matching
//! [`RecordBook`](tal_ledger::RecordBook) operation.

pub mod contract;
pub mod error;
pub mod function;

pub use contract::Contract;
pub use error::{ContractError, ContractResult};
pub use function::Function;

// Re-export key types
pub use tal_ledger::{BookConfig, LedgerError, RecordBook};
pub use tal_store::{InMemoryStore, LedgerStore, StoreSnapshot};
pub use tal_types::VehicleRecord;
