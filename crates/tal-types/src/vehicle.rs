use serde::{Deserialize, Serialize};

/// A vehicle record, stored under a caller-chosen key.
///
/// Vehicles carry no doc-type tag. A write to an existing key silently
/// replaces whatever was stored there.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleRecord {
    pub make: String,
    pub model: String,
    pub colour: String,
    pub owner: String,
}

impl VehicleRecord {
    /// Create a vehicle record from its four fields.
    pub fn new(
        make: impl Into<String>,
        model: impl Into<String>,
        colour: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            colour: colour.into(),
            owner: owner.into(),
        }
    }

    /// Returns a copy of this record with `owner` replaced.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }
}
