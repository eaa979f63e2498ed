//! Doc-typed records.
//!
//! Metadata and trust anchor list records carry a `Doctype` tag so that the
//! store's selector engine can find them by kind. [`Document`] is the closed
//! set of these records, internally tagged on that field.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TypeError;

/// Name of the JSON field carrying the doc-type tag.
pub const DOC_TYPE_FIELD: &str = "Doctype";

/// Kind tag of a doc-typed record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocType {
    #[serde(rename = "MetaData Store")]
    Metadata,
    #[serde(rename = "TAL List")]
    TrustAnchorList,
}

impl DocType {
    /// The literal tag value written to the `Doctype` field.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Metadata => "MetaData Store",
            Self::TrustAnchorList => "TAL List",
        }
    }

    /// Parse a literal tag value.
    pub fn parse(tag: &str) -> Result<Self, TypeError> {
        match tag {
            "MetaData Store" => Ok(Self::Metadata),
            "TAL List" => Ok(Self::TrustAnchorList),
            other => Err(TypeError::UnknownDocType(other.to_string())),
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata registered by a user (typically an identity or service provider).
///
/// `metadata` is an opaque blob; this layer never interprets it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataRecord {
    #[serde(rename = "User")]
    pub user: String,
    #[serde(rename = "Metadata")]
    pub metadata: String,
    #[serde(rename = "Key")]
    pub key: String,
}

impl MetadataRecord {
    pub fn new(user: impl Into<String>, metadata: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            metadata: metadata.into(),
            key: key.into(),
        }
    }
}

/// One trusted peer URL in a [`TrustAnchorList`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorEntry {
    #[serde(rename = "Tal")]
    pub url: String,
}

impl AnchorEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// An entity and the ordered list of peer URLs it trusts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustAnchorList {
    #[serde(rename = "EntityID")]
    pub entity_id: String,
    #[serde(rename = "TList", deserialize_with = "null_as_empty")]
    pub entries: Vec<AnchorEntry>,
    #[serde(rename = "Key")]
    pub key: String,
}

impl TrustAnchorList {
    /// Create a list holding a single entry.
    pub fn new(entity_id: impl Into<String>, url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            entries: vec![AnchorEntry::new(url)],
            key: key.into(),
        }
    }

    /// Create a list from a sequence of URLs, preserving their order.
    pub fn with_urls<I, U>(entity_id: impl Into<String>, urls: I, key: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<String>,
    {
        Self {
            entity_id: entity_id.into(),
            entries: urls.into_iter().map(AnchorEntry::new).collect(),
            key: key.into(),
        }
    }

    /// Append a URL at the end of the list. Duplicates are kept.
    pub fn push(&mut self, url: impl Into<String>) {
        self.entries.push(AnchorEntry::new(url));
    }

    /// The URLs in list order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.url.as_str())
    }
}

/// Legacy writers encode an empty list as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<AnchorEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<AnchorEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A doc-typed record, tagged by the `Doctype` field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Doctype")]
pub enum Document {
    #[serde(rename = "MetaData Store")]
    Metadata(MetadataRecord),
    #[serde(rename = "TAL List")]
    TrustAnchorList(TrustAnchorList),
}

impl Document {
    pub fn doc_type(&self) -> DocType {
        match self {
            Self::Metadata(_) => DocType::Metadata,
            Self::TrustAnchorList(_) => DocType::TrustAnchorList,
        }
    }

    /// The key the record was written under.
    pub fn key(&self) -> &str {
        match self {
            Self::Metadata(m) => &m.key,
            Self::TrustAnchorList(t) => &t.key,
        }
    }

    pub fn into_metadata(self) -> Result<MetadataRecord, TypeError> {
        match self {
            Self::Metadata(m) => Ok(m),
            other => Err(TypeError::KindMismatch {
                expected: DocType::Metadata.as_str(),
                found: other.doc_type().to_string(),
            }),
        }
    }

    pub fn into_trust_anchor_list(self) -> Result<TrustAnchorList, TypeError> {
        match self {
            Self::TrustAnchorList(t) => Ok(t),
            other => Err(TypeError::KindMismatch {
                expected: DocType::TrustAnchorList.as_str(),
                found: other.doc_type().to_string(),
            }),
        }
    }
}

impl From<MetadataRecord> for Document {
    fn from(record: MetadataRecord) -> Self {
        Self::Metadata(record)
    }
}

impl From<TrustAnchorList> for Document {
    fn from(record: TrustAnchorList) -> Self {
        Self::TrustAnchorList(record)
    }
}
