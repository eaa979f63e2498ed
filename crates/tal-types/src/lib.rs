//! Record types for the Trust Anchor Ledger (TAL).
//!
//! This crate defines every record shape the ledger layer persists, together
//! with the byte codec used to store them. Every other TAL crate depends on
//! `tal-types`.
//!
//! # Key Types
//!
//! - [`VehicleRecord`] -- caller-keyed vehicle record (make, model, colour, owner)
//! - [`MetadataRecord`] -- opaque metadata blob registered by a user
//! - [`TrustAnchorList`] -- an entity and the ordered peer URLs it trusts
//! - [`Document`] -- closed set of doc-typed records, tagged by `Doctype`
//! - [`Record`] -- any stored record: a vehicle or a [`Document`]
//! - [`Codec`] -- JSON byte encoding shared by all record shapes
//!
//! # Wire Format
//!
//! Records are stored as JSON. Field names match the content already written
//! to existing ledgers (`make`/`model`/`colour`/`owner` for vehicles,
//! `Doctype`/`User`/`Metadata`/`Key` for metadata, `Doctype`/`EntityID`/`TList`
//! /`Key` for trust anchor lists) so that previously stored values decode.

pub mod codec;
pub mod document;
pub mod error;
pub mod vehicle;

pub use codec::{Codec, Record};
pub use document::{AnchorEntry, DocType, Document, MetadataRecord, TrustAnchorList, DOC_TYPE_FIELD};
pub use error::TypeError;
pub use vehicle::VehicleRecord;
