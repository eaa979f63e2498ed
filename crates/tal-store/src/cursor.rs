//! Forward-only result cursors and their close guard.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::error::StoreResult;

/// A `{key, value}` pair emitted by a cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A lazy, forward-only sequence of entries from a range scan or selector
/// query. Must be closed after use to release backend resources.
pub trait Cursor: Iterator<Item = StoreResult<KeyValue>> {
    fn close(&mut self) -> StoreResult<()>;
}

/// Close guard around a boxed [`Cursor`].
///
/// The inner cursor is closed exactly once: by [`ScopedCursor::close`] when
/// the caller wants to observe the close result, or by `Drop` otherwise.
/// After closing, iteration yields nothing.
pub struct ScopedCursor<'a> {
    inner: Box<dyn Cursor + Send + 'a>,
    closed: bool,
}

impl<'a> ScopedCursor<'a> {
    pub fn new(inner: impl Cursor + Send + 'a) -> Self {
        Self {
            inner: Box::new(inner),
            closed: false,
        }
    }

    /// Close the cursor and report any error from the backend.
    pub fn close(mut self) -> StoreResult<()> {
        self.closed = true;
        self.inner.close()
    }
}

impl Iterator for ScopedCursor<'_> {
    type Item = StoreResult<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        self.inner.next()
    }
}

impl Drop for ScopedCursor<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.inner.close() {
            warn!(error = %e, "failed to close cursor on drop");
        }
    }
}

impl std::fmt::Debug for ScopedCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedCursor")
            .field("closed", &self.closed)
            .finish()
    }
}

/// Open/close counters shared between a store and the cursors it hands out.
#[derive(Debug, Default)]
pub struct CursorStats {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl CursorStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total cursors opened.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Total `close` calls received.
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Cursors opened but not yet closed.
    pub fn open(&self) -> usize {
        self.opened().saturating_sub(self.closed())
    }

    fn record_open(&self) {
        self.opened.fetch_add(1, Ordering::SeqCst);
    }

    fn record_close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// A cursor over a materialized list of entries.
///
/// Entries may be errors, which lets callers exercise failures that happen
/// part-way through iteration.
#[derive(Debug)]
pub struct VecCursor {
    entries: std::vec::IntoIter<StoreResult<KeyValue>>,
    stats: Option<Arc<CursorStats>>,
}

impl VecCursor {
    pub fn new(entries: Vec<KeyValue>) -> Self {
        Self::from_results(entries.into_iter().map(Ok).collect())
    }

    pub fn from_results(entries: Vec<StoreResult<KeyValue>>) -> Self {
        Self {
            entries: entries.into_iter(),
            stats: None,
        }
    }

    /// Count this cursor's open and close in `stats`.
    pub fn tracked(mut self, stats: Arc<CursorStats>) -> Self {
        stats.record_open();
        self.stats = Some(stats);
        self
    }
}

impl Iterator for VecCursor {
    type Item = StoreResult<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }
}

impl Cursor for VecCursor {
    fn close(&mut self) -> StoreResult<()> {
        if let Some(stats) = &self.stats {
            stats.record_close();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    fn entries(n: usize) -> Vec<KeyValue> {
        (0..n)
            .map(|i| KeyValue::new(format!("k{i}"), format!("v{i}")))
            .collect()
    }

    #[test]
    fn drop_closes_exactly_once() {
        let stats = Arc::new(CursorStats::new());
        {
            let mut cursor = ScopedCursor::new(VecCursor::new(entries(3)).tracked(stats.clone()));
            assert!(cursor.next().is_some());
        }
        assert_eq!(stats.opened(), 1);
        assert_eq!(stats.closed(), 1);
        assert_eq!(stats.open(), 0);
    }

    #[test]
    fn explicit_close_is_not_repeated_on_drop() {
        let stats = Arc::new(CursorStats::new());
        let cursor = ScopedCursor::new(VecCursor::new(entries(2)).tracked(stats.clone()));
        cursor.close().unwrap();
        assert_eq!(stats.closed(), 1);
    }

    #[test]
    fn early_return_on_error_still_closes() {
        let stats = Arc::new(CursorStats::new());
        let drain = || -> StoreResult<usize> {
            let cursor = ScopedCursor::new(
                VecCursor::from_results(vec![
                    Ok(KeyValue::new("a", "1")),
                    Err(StoreError::Cursor("boom".into())),
                    Ok(KeyValue::new("c", "3")),
                ])
                .tracked(stats.clone()),
            );
            let mut n = 0;
            for kv in cursor {
                kv?;
                n += 1;
            }
            Ok(n)
        };
        assert_eq!(drain(), Err(StoreError::Cursor("boom".into())));
        assert_eq!(stats.closed(), 1);
    }

    #[test]
    fn untracked_cursor_yields_in_order() {
        let keys: Vec<String> = ScopedCursor::new(VecCursor::new(entries(4)))
            .map(|kv| kv.unwrap().key)
            .collect();
        assert_eq!(keys, vec!["k0", "k1", "k2", "k3"]);
    }
}
