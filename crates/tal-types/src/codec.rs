use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::document::{DocType, Document, DOC_TYPE_FIELD};
use crate::error::TypeError;
use crate::vehicle::VehicleRecord;

/// JSON byte encoding for stored records.
pub trait Codec: Serialize + DeserializeOwned {
    /// Encode to the bytes written to the store.
    fn encode(&self) -> Result<Vec<u8>, TypeError> {
        serde_json::to_vec(self).map_err(|e| TypeError::Encode(e.to_string()))
    }

    /// Decode from bytes read from the store.
    fn decode(bytes: &[u8]) -> Result<Self, TypeError> {
        serde_json::from_slice(bytes).map_err(|e| TypeError::Decode(e.to_string()))
    }
}

impl Codec for VehicleRecord {}
impl Codec for Document {}

/// Any record this layer stores.
///
/// Doc-typed records are recognised by the presence of the `Doctype` field;
/// everything else is a vehicle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Vehicle(VehicleRecord),
    Document(Document),
}

impl Record {
    /// The doc-type tag, or `None` for vehicles.
    pub fn doc_type(&self) -> Option<DocType> {
        match self {
            Self::Vehicle(_) => None,
            Self::Document(d) => Some(d.doc_type()),
        }
    }

    /// Decode stored bytes, dispatching on the `Doctype` field.
    ///
    /// A value with an unrecognised `Doctype` is an error rather than a
    /// vehicle.
    pub fn decode(bytes: &[u8]) -> Result<Self, TypeError> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| TypeError::Decode(e.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| TypeError::Decode("record is not a JSON object".into()))?;

        match object.get(DOC_TYPE_FIELD) {
            None => serde_json::from_value(value)
                .map(Self::Vehicle)
                .map_err(|e| TypeError::Decode(e.to_string())),
            Some(tag) => {
                let tag = tag
                    .as_str()
                    .ok_or_else(|| TypeError::Decode("Doctype is not a string".into()))?;
                DocType::parse(tag)?;
                serde_json::from_value(value)
                    .map(Self::Document)
                    .map_err(|e| TypeError::Decode(e.to_string()))
            }
        }
    }
}

impl From<VehicleRecord> for Record {
    fn from(record: VehicleRecord) -> Self {
        Self::Vehicle(record)
    }
}

impl From<Document> for Record {
    fn from(document: Document) -> Self {
        Self::Document(document)
    }
}
