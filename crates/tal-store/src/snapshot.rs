use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Serializable copy of a store's contents.
///
/// Values are hex-encoded so that arbitrary bytes survive a JSON or TOML
/// round trip.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub entries: BTreeMap<String, String>,
}

impl StoreSnapshot {
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a Vec<u8>)>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.clone(), hex::encode(v)))
                .collect(),
        }
    }

    /// Decode every hex value back into raw bytes.
    pub fn decode_entries(&self) -> StoreResult<Vec<(String, Vec<u8>)>> {
        self.entries
            .iter()
            .map(|(k, v)| {
                hex::decode(v)
                    .map(|bytes| (k.clone(), bytes))
                    .map_err(|e| StoreError::Snapshot(format!("value at {k}: {e}")))
            })
            .collect()
    }

    pub fn to_json(&self) -> StoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| StoreError::Snapshot(e.to_string()))
    }

    pub fn from_json(json: &str) -> StoreResult<Self> {
        serde_json::from_str(json).map_err(|e| StoreError::Snapshot(e.to_string()))
    }
}
