use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::cursor::{CursorStats, KeyValue, ScopedCursor, VecCursor};
use crate::error::{StoreError, StoreResult};
use crate::selector::Selector;
use crate::snapshot::StoreSnapshot;
use crate::traits::LedgerStore;

/// In-memory, `BTreeMap`-based ledger store.
///
/// Intended for tests, demos, and embedding. Entries live behind a `RwLock`
/// and are kept in key order, so range scans and selector results come out
/// sorted by key. Cursors are materialized when opened and do not observe
/// later writes.
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
    cursors: Arc<CursorStats>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            cursors: Arc::new(CursorStats::new()),
        }
    }

    /// Build a store holding the entries of `snapshot`.
    pub fn from_snapshot(snapshot: &StoreSnapshot) -> StoreResult<Self> {
        let store = Self::new();
        {
            let mut map = store.entries.write().map_err(|_| StoreError::LockPoisoned)?;
            for (key, value) in snapshot.decode_entries()? {
                map.insert(key, value);
            }
        }
        Ok(store)
    }

    /// Capture every entry into a serializable snapshot.
    pub fn snapshot(&self) -> StoreResult<StoreSnapshot> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(StoreSnapshot::from_entries(map.iter()))
    }

    /// Number of stored keys.
    pub fn len(&self) -> StoreResult<usize> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.len())
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// All keys in order.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.keys().cloned().collect())
    }

    /// Cursor open/close counters for this store.
    pub fn cursor_stats(&self) -> &CursorStats {
        &self.cursors
    }

    fn open_cursor(&self, entries: Vec<KeyValue>) -> ScopedCursor<'_> {
        ScopedCursor::new(VecCursor::new(entries).tracked(self.cursors.clone()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for InMemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn range_scan(&self, start: &str, end: &str) -> StoreResult<ScopedCursor<'_>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        // An empty end key leaves the range open-ended.
        let entries: Vec<KeyValue> = if end.is_empty() {
            map.range::<str, _>((Bound::Included(start), Bound::Unbounded))
                .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
                .collect()
        } else if start >= end {
            Vec::new()
        } else {
            map.range::<str, _>((Bound::Included(start), Bound::Excluded(end)))
                .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
                .collect()
        };
        debug!(start, end, count = entries.len(), "range scan");
        Ok(self.open_cursor(entries))
    }

    fn selector_query(&self, query: &str) -> StoreResult<ScopedCursor<'_>> {
        let selector = Selector::parse(query)?;
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        let entries: Vec<KeyValue> = map
            .iter()
            .filter(|(_, v)| selector.matches_bytes(v))
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect();
        debug!(%selector, count = entries.len(), "selector query");
        Ok(self.open_cursor(entries))
    }

    fn compare_and_put(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> StoreResult<()> {
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        if map.get(key).map(Vec::as_slice) != expected {
            return Err(StoreError::Conflict {
                key: key.to_string(),
            });
        }
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("key_count", &self.len().ok())
            .field("open_cursors", &self.cursors.open())
            .finish()
    }
}
