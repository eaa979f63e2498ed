//! Record operations for the Trust Anchor Ledger (TAL).
//!
//! This crate sits between the contract dispatcher and the external ledger
//! store. It provides:
//! - [`RecordBook`], which creates, updates, and appends to records
//! - Key allocation for auto-keyed records ([`KeyAllocator`])
//! - Cursor draining into JSON array responses ([`aggregate_json`])
//! - Fixture records written on ledger initialization
//! - [`BookConfig`], loaded from TOML, selecting between the corrected and
//!   legacy behaviours
//!
//! # Design Rules
//!
//! 1. Every cursor opened here is closed exactly once, on every exit path.
//! 2. Store errors are propagated, never swallowed.
//! 3. Selector queries are built from JSON values, never by string
//!    interpolation.

pub mod aggregate;
pub mod book;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod keys;

pub use aggregate::{aggregate_json, single_match, wrap_values, QueryMatch};
pub use book::{doc_type_selector, metadata_selector, trust_anchor_selector, RecordBook};
pub use config::{AnchorFilter, BookConfig, DecodePolicy, KeyRange, KeyStrategy, MatchPolicy};
pub use error::{LedgerError, LedgerResult};
pub use fixtures::{fixture_documents, seed_fixtures};
pub use keys::{allocator_for, Counter, KeyAllocator, ProcessCounters, StoreSequence};
