use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// How keys are produced for auto-keyed records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// Sequence persisted in the store; unique across restarts.
    StoreSequence,
    /// Process-lifetime counters; reset on restart.
    ProcessCounter,
}

/// What a single-record lookup does when a selector matches several records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// More than one match is an error.
    Unique,
    /// The last match in cursor order is used.
    LastWins,
}

/// Which fields the trust anchor lookup filters on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorFilter {
    /// Doc type and entity id.
    ByEntity,
    /// Doc type only; the entity id is compared after decoding.
    DocTypeOnly,
}

/// How `change_owner` treats a missing or undecodable vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Missing keys and malformed values are errors.
    Strict,
    /// Missing keys and malformed values decode to a zero-valued record.
    ZeroValue,
}

/// `[start, end)` key range scanned for vehicles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRange {
    pub start: String,
    pub end: String,
}

impl KeyRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Configuration for a [`RecordBook`](crate::RecordBook).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    pub key_strategy: KeyStrategy,
    pub match_policy: MatchPolicy,
    pub anchor_filter: AnchorFilter,
    pub decode_policy: DecodePolicy,
    /// Update an existing user's metadata in place instead of adding a record.
    pub dedup_metadata: bool,
    /// Use the store's conditional write for read-modify-write updates.
    pub conditional_updates: bool,
    /// Range scanned by `query_all_vehicles`. Kept last so it serializes
    /// as a trailing TOML table.
    pub vehicle_range: KeyRange,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            key_strategy: KeyStrategy::StoreSequence,
            match_policy: MatchPolicy::Unique,
            anchor_filter: AnchorFilter::ByEntity,
            decode_policy: DecodePolicy::Strict,
            dedup_metadata: false,
            conditional_updates: false,
            vehicle_range: KeyRange::new("CAR0", "CAR999"),
        }
    }
}

impl BookConfig {
    /// Behaviour of the first ledger deployments: in-process counters, last
    /// match wins, trust anchors looked up by doc type alone, and vehicles
    /// decoded leniently.
    pub fn legacy() -> Self {
        Self {
            key_strategy: KeyStrategy::ProcessCounter,
            match_policy: MatchPolicy::LastWins,
            anchor_filter: AnchorFilter::DocTypeOnly,
            decode_policy: DecodePolicy::ZeroValue,
            ..Default::default()
        }
    }

    /// Parse from TOML. Missing fields take their default values.
    pub fn from_toml(text: &str) -> LedgerResult<Self> {
        toml::from_str(text).map_err(|e| LedgerError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> LedgerResult<String> {
        toml::to_string(self).map_err(|e| LedgerError::Config(e.to_string()))
    }
}
