//! Declarative equality selectors.
//!
//! A selector is the query language of the external store:
//! `{"selector": {"field": value, ...}}`. A stored value matches when it is
//! a JSON object whose top-level fields equal every selector field.

use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

const SELECTOR_FIELD: &str = "selector";

/// An equality filter over top-level record fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selector {
    fields: Map<String, Value>,
}

impl Selector {
    /// An empty selector, matching every JSON object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Render as the store's query string.
    ///
    /// Values are JSON-encoded, so field values containing quotes or braces
    /// cannot change the shape of the query.
    pub fn to_query(&self) -> String {
        let mut root = Map::new();
        root.insert(SELECTOR_FIELD.into(), Value::Object(self.fields.clone()));
        Value::Object(root).to_string()
    }

    /// Parse a `{"selector": {...}}` query string.
    pub fn parse(query: &str) -> StoreResult<Self> {
        let value: Value = serde_json::from_str(query)
            .map_err(|e| StoreError::InvalidSelector(e.to_string()))?;
        match value.get(SELECTOR_FIELD) {
            Some(Value::Object(fields)) => Ok(Self {
                fields: fields.clone(),
            }),
            Some(_) => Err(StoreError::InvalidSelector(
                "\"selector\" must be an object".into(),
            )),
            None => Err(StoreError::InvalidSelector(
                "missing \"selector\" field".into(),
            )),
        }
    }

    /// Whether a decoded JSON value satisfies every field.
    pub fn matches(&self, candidate: &Value) -> bool {
        let Some(object) = candidate.as_object() else {
            return false;
        };
        self.fields
            .iter()
            .all(|(field, expected)| object.get(field) == Some(expected))
    }

    /// Whether stored bytes satisfy the selector. Non-JSON never matches.
    pub fn matches_bytes(&self, bytes: &[u8]) -> bool {
        serde_json::from_slice::<Value>(bytes)
            .map(|value| self.matches(&value))
            .unwrap_or(false)
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_query())
    }
}
