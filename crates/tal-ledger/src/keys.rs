//! Key allocation for auto-keyed records.
//!
//! Metadata and trust anchor list records are keyed by the ledger layer, not
//! by the caller. Each record kind draws from its own [`Counter`]; keys are
//! the counter's new value rendered in decimal.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tal_store::LedgerStore;
use tracing::debug;

use crate::config::KeyStrategy;
use crate::error::{LedgerError, LedgerResult};

/// Named counters, one per auto-keyed record kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Counter {
    Metadata,
    TrustAnchor,
}

impl Counter {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::TrustAnchor => "trust-anchor",
        }
    }

    /// Store key holding the counter's high-water mark.
    pub fn sequence_key(&self) -> String {
        format!("~seq/{}", self.name())
    }

    const fn index(&self) -> usize {
        match self {
            Self::Metadata => 0,
            Self::TrustAnchor => 1,
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Produces keys for newly created records.
pub trait KeyAllocator: Send + Sync {
    fn next_key(&self, store: &dyn LedgerStore, counter: Counter) -> LedgerResult<String>;
}

/// Build the allocator selected by `strategy`.
pub fn allocator_for(strategy: KeyStrategy) -> Box<dyn KeyAllocator> {
    match strategy {
        KeyStrategy::StoreSequence => Box::new(StoreSequence::new()),
        KeyStrategy::ProcessCounter => Box::new(ProcessCounters::new()),
    }
}

/// Process-lifetime counters starting at 0.
///
/// Values never repeat within one process, but the counters restart at 0
/// with the process and are not shared between processes, so a restarted
/// or second writer will reissue keys that are already in use and
/// overwrite those records. Both counters also issue the same sequence,
/// so the first metadata record and the first trust anchor list share a
/// key.
#[derive(Debug, Default)]
pub struct ProcessCounters {
    values: [AtomicU64; 2],
}

impl ProcessCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `counter` (the last key issued, or 0).
    pub fn current(&self, counter: Counter) -> u64 {
        self.values[counter.index()].load(Ordering::SeqCst)
    }
}

impl KeyAllocator for ProcessCounters {
    fn next_key(&self, _store: &dyn LedgerStore, counter: Counter) -> LedgerResult<String> {
        let value = self.values[counter.index()].fetch_add(1, Ordering::SeqCst) + 1;
        Ok(value.to_string())
    }
}

/// Store-derived sequence.
///
/// Each counter's high-water mark lives in the store under
/// [`Counter::sequence_key`]. Candidates already occupied by any record are
/// skipped, so keys stay unique across restarts and across counters.
/// Allocation within one process is serialized; allocation across processes
/// relies on the store's own write ordering.
#[derive(Debug, Default)]
pub struct StoreSequence {
    guard: Mutex<()>,
}

impl StoreSequence {
    pub fn new() -> Self {
        Self::default()
    }

    fn high_water_mark(store: &dyn LedgerStore, counter: Counter) -> LedgerResult<u64> {
        let Some(bytes) = store.get(&counter.sequence_key())? else {
            return Ok(0);
        };
        if bytes.is_empty() {
            return Ok(0);
        }
        std::str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .ok_or_else(|| {
                LedgerError::Allocation(format!("corrupt sequence value for {counter} counter"))
            })
    }
}

impl KeyAllocator for StoreSequence {
    fn next_key(&self, store: &dyn LedgerStore, counter: Counter) -> LedgerResult<String> {
        let _guard = self
            .guard
            .lock()
            .map_err(|_| LedgerError::Allocation("sequence lock poisoned".into()))?;

        let mut value = Self::high_water_mark(store, counter)?;
        let key = loop {
            value = value
                .checked_add(1)
                .ok_or_else(|| LedgerError::Allocation(format!("{counter} counter exhausted")))?;
            let candidate = value.to_string();
            if store.get(&candidate)?.is_none() {
                break candidate;
            }
            debug!(%counter, key = %candidate, "skipping occupied key");
        };

        store.put(&counter.sequence_key(), key.as_bytes())?;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tal_store::InMemoryStore;

    // -----------------------------------------------------------------------
    // Process counters
    // -----------------------------------------------------------------------

    #[test]
    fn process_counters_start_at_one() {
        let store = InMemoryStore::new();
        let counters = ProcessCounters::new();
        assert_eq!(counters.next_key(&store, Counter::Metadata).unwrap(), "1");
        assert_eq!(counters.next_key(&store, Counter::Metadata).unwrap(), "2");
        assert_eq!(counters.current(Counter::Metadata), 2);
    }

    #[test]
    fn process_counters_are_independent() {
        let store = InMemoryStore::new();
        let counters = ProcessCounters::new();
        counters.next_key(&store, Counter::Metadata).unwrap();
        counters.next_key(&store, Counter::Metadata).unwrap();
        assert_eq!(counters.next_key(&store, Counter::TrustAnchor).unwrap(), "1");
    }

    #[test]
    fn process_counters_reset_with_a_new_instance() {
        let store = InMemoryStore::new();
        let first = ProcessCounters::new();
        first.next_key(&store, Counter::Metadata).unwrap();
        let restarted = ProcessCounters::new();
        assert_eq!(restarted.next_key(&store, Counter::Metadata).unwrap(), "1");
    }

    #[test]
    fn process_counters_never_repeat_across_threads() {
        let store = Arc::new(InMemoryStore::new());
        let counters = Arc::new(ProcessCounters::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let counters = Arc::clone(&counters);
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| counters.next_key(store.as_ref(), Counter::Metadata).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut seen = HashSet::new();
        for h in handles {
            for key in h.join().expect("thread should not panic") {
                assert!(seen.insert(key));
            }
        }
        assert_eq!(seen.len(), 400);
    }

    // -----------------------------------------------------------------------
    // Store sequence
    // -----------------------------------------------------------------------

    #[test]
    fn store_sequence_persists_high_water_mark() {
        let store = InMemoryStore::new();
        let seq = StoreSequence::new();
        assert_eq!(seq.next_key(&store, Counter::Metadata).unwrap(), "1");
        assert_eq!(seq.next_key(&store, Counter::Metadata).unwrap(), "2");
        assert_eq!(store.get("~seq/metadata").unwrap(), Some(b"2".to_vec()));

        // A fresh allocator over the same store continues the sequence.
        let restarted = StoreSequence::new();
        assert_eq!(restarted.next_key(&store, Counter::Metadata).unwrap(), "3");
    }

    #[test]
    fn store_sequence_skips_occupied_keys() {
        let store = InMemoryStore::new();
        let seq = StoreSequence::new();
        assert_eq!(seq.next_key(&store, Counter::Metadata).unwrap(), "1");
        store.put("1", b"{}").unwrap();
        store.put("2", b"{}").unwrap();
        // The other counter starts at 1 but both 1 and 2 are taken.
        assert_eq!(seq.next_key(&store, Counter::TrustAnchor).unwrap(), "3");
    }

    #[test]
    fn store_sequence_rejects_corrupt_mark() {
        let store = InMemoryStore::new();
        store.put("~seq/trust-anchor", b"seven").unwrap();
        let err = StoreSequence::new()
            .next_key(&store, Counter::TrustAnchor)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Allocation(_)));
    }

    #[test]
    fn allocator_for_strategy() {
        let store = InMemoryStore::new();
        let alloc = allocator_for(KeyStrategy::StoreSequence);
        alloc.next_key(&store, Counter::Metadata).unwrap();
        assert!(store.get("~seq/metadata").unwrap().is_some());

        let store = InMemoryStore::new();
        let alloc = allocator_for(KeyStrategy::ProcessCounter);
        alloc.next_key(&store, Counter::Metadata).unwrap();
        assert!(store.is_empty().unwrap());
    }
}
