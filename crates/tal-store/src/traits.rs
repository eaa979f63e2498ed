use crate::cursor::ScopedCursor;
use crate::error::{StoreError, StoreResult};

/// The external ordered key-value ledger.
///
/// Implementations must satisfy these invariants:
/// - Keys are exact lookup keys; `get` after `put` on the same key returns
///   the written bytes.
/// - `range_scan` yields entries in ascending key order, `start` inclusive
///   and `end` exclusive.
/// - `selector_query` match semantics (exact equality) belong to the backend.
/// - Errors are surfaced, never swallowed.
pub trait LedgerStore: Send + Sync {
    /// Read the value stored at `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored there.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write `value` at `key`, replacing any previous value.
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Open a cursor over `[start, end)` in key order.
    fn range_scan(&self, start: &str, end: &str) -> StoreResult<ScopedCursor<'_>>;

    /// Open a cursor over every value matching a `{"selector": {...}}` query.
    fn selector_query(&self, query: &str) -> StoreResult<ScopedCursor<'_>>;

    /// Write `value` only if the current value at `key` equals `expected`.
    ///
    /// `expected: None` means "only if absent". Fails with
    /// [`StoreError::Conflict`] when the precondition does not hold.
    /// Backends without a conditional write return
    /// [`StoreError::Unsupported`].
    fn compare_and_put(
        &self,
        _key: &str,
        _expected: Option<&[u8]>,
        _value: &[u8],
    ) -> StoreResult<()> {
        Err(StoreError::Unsupported("compare_and_put"))
    }
}
