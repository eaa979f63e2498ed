//! Ledger store adapter for the Trust Anchor Ledger.
//!
//! The ledger itself (persistence, replication, consensus) is external. This
//! crate names the four primitives the record layer consumes and ships an
//! in-memory implementation for tests, demos, and embedding.
//!
//! # Primitives
//!
//! All backends implement the [`LedgerStore`] trait:
//!
//! - `get` -- exact-key read
//! - `put` -- exact-key write (overwrites)
//! - `range_scan` -- ordered `[start, end)` key scan returning a cursor
//! - `selector_query` -- `{"selector": {...}}` equality query returning a cursor
//!
//! # Cursors
//!
//! Every cursor is handed out wrapped in a [`ScopedCursor`], which closes the
//! underlying [`Cursor`] exactly once: explicitly through
//! [`ScopedCursor::close`], or on drop along any other exit path.
//!
//! # Design Rules
//!
//! 1. Keys are exact byte-for-byte strings. There is no secondary index.
//! 2. The adapter adds no retries, caching, or validation.
//! 3. Store errors are passed through unchanged.

pub mod cursor;
pub mod error;
pub mod memory;
pub mod selector;
pub mod snapshot;
pub mod traits;

pub use cursor::{Cursor, CursorStats, KeyValue, ScopedCursor, VecCursor};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use selector::Selector;
pub use snapshot::StoreSnapshot;
pub use traits::LedgerStore;
