use tal_store::{LedgerStore, Selector};
use tal_types::{
    Codec, DocType, Document, MetadataRecord, TrustAnchorList, TypeError, VehicleRecord,
    DOC_TYPE_FIELD,
};
use tracing::{debug, info};

use crate::aggregate::{aggregate_json, single_match, wrap_values, QueryMatch};
use crate::config::{AnchorFilter, BookConfig, DecodePolicy};
use crate::error::{LedgerError, LedgerResult};
use crate::keys::{allocator_for, Counter, KeyAllocator};

const USER_FIELD: &str = "User";
const ENTITY_ID_FIELD: &str = "EntityID";

/// Record operations over a [`LedgerStore`].
///
/// Every operation is a short sequence of synchronous store calls. Read,
/// modify, and write steps are separate calls: a concurrent writer of the
/// same key can interleave unless `conditional_updates` is enabled and the
/// store supports `compare_and_put`.
pub struct RecordBook<S> {
    store: S,
    config: BookConfig,
    allocator: Box<dyn KeyAllocator>,
}

impl<S: LedgerStore> RecordBook<S> {
    /// A record book with the default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, BookConfig::default())
    }

    pub fn with_config(store: S, config: BookConfig) -> Self {
        let allocator = allocator_for(config.key_strategy);
        Self {
            store,
            config,
            allocator,
        }
    }

    /// Replace the key allocator chosen by the configuration.
    pub fn with_allocator(mut self, allocator: impl KeyAllocator + 'static) -> Self {
        self.allocator = Box::new(allocator);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Write the fixture records. See [`crate::fixtures`].
    pub fn seed_fixtures(&self) -> LedgerResult<()> {
        crate::fixtures::seed_fixtures(&self.store)
    }

    // -----------------------------------------------------------------------
    // Exact-key access
    // -----------------------------------------------------------------------

    /// Read whatever is stored at `key`.
    ///
    /// A missing key and an empty value both come back as empty bytes.
    pub fn fetch_by_key(&self, key: &str) -> LedgerResult<Vec<u8>> {
        Ok(self.store.get(key)?.unwrap_or_default())
    }

    /// Write `vehicle` at `key`, replacing anything already there.
    pub fn create_vehicle(&self, key: &str, vehicle: &VehicleRecord) -> LedgerResult<()> {
        self.store.put(key, &vehicle.encode()?)?;
        debug!(key, owner = %vehicle.owner, "vehicle written");
        Ok(())
    }

    /// Set the owner of the vehicle at `key` and write it back.
    pub fn change_owner(&self, key: &str, new_owner: &str) -> LedgerResult<VehicleRecord> {
        let current = self.store.get(key)?;
        let vehicle = self.decode_vehicle(key, current.as_deref())?;
        let updated = vehicle.with_owner(new_owner);
        self.write_back(key, current.as_deref(), &updated.encode()?)?;
        debug!(key, owner = new_owner, "vehicle owner changed");
        Ok(updated)
    }

    fn decode_vehicle(&self, key: &str, bytes: Option<&[u8]>) -> LedgerResult<VehicleRecord> {
        let bytes = bytes.filter(|b| !b.is_empty());
        match (self.config.decode_policy, bytes) {
            (DecodePolicy::Strict, None) => Err(LedgerError::NotFound {
                key: key.to_string(),
            }),
            (DecodePolicy::Strict, Some(bytes)) => {
                VehicleRecord::decode(bytes).map_err(|source| LedgerError::Decode {
                    key: key.to_string(),
                    source,
                })
            }
            (DecodePolicy::ZeroValue, None) => Ok(VehicleRecord::default()),
            (DecodePolicy::ZeroValue, Some(bytes)) => {
                Ok(VehicleRecord::decode(bytes).unwrap_or_default())
            }
        }
    }

    /// Write a record under a freshly allocated key. With conditional
    /// updates the key must still be vacant.
    fn write_new(&self, key: &str, value: &[u8]) -> LedgerResult<()> {
        self.write_back(key, None, value)
    }

    /// Write an updated value over the one read as `previous`.
    fn write_back(&self, key: &str, previous: Option<&[u8]>, value: &[u8]) -> LedgerResult<()> {
        if self.config.conditional_updates {
            self.store.compare_and_put(key, previous, value)?;
        } else {
            self.store.put(key, value)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Metadata
    // -----------------------------------------------------------------------

    /// Store a metadata blob for `user` and return the key it was written at.
    ///
    /// Each call creates a new record unless `dedup_metadata` is set, in
    /// which case an existing record for `user` is updated under its key.
    pub fn store_metadata(&self, user: &str, metadata: &str) -> LedgerResult<String> {
        if self.config.dedup_metadata {
            if let Some(existing) = self.find_metadata(user)? {
                let mut record = existing.record;
                record.metadata = metadata.to_string();
                let bytes = Document::from(record).encode()?;
                self.write_back(&existing.key, Some(&existing.raw), &bytes)?;
                debug!(key = %existing.key, user, "metadata updated in place");
                return Ok(existing.key);
            }
        }

        let key = self.allocator.next_key(&self.store, Counter::Metadata)?;
        let record = MetadataRecord::new(user, metadata, key.clone());
        self.write_new(&key, &Document::from(record).encode()?)?;
        info!(key = %key, user, "metadata stored");
        Ok(key)
    }

    /// The `User` field of the metadata record registered by `user`, or
    /// empty bytes when there is none.
    pub fn query_user_metadata(&self, user: &str) -> LedgerResult<Vec<u8>> {
        Ok(self
            .find_metadata(user)?
            .map(|m| m.record.user.into_bytes())
            .unwrap_or_default())
    }

    /// Every metadata record registered by `user`, as a JSON array.
    pub fn fetch_user_metadata(&self, user: &str) -> LedgerResult<Vec<u8>> {
        self.query_selector(&metadata_selector(user))
    }

    fn find_metadata(&self, user: &str) -> LedgerResult<Option<QueryMatch<MetadataRecord>>> {
        self.find_document(&metadata_selector(user), |doc| doc.into_metadata())
    }

    // -----------------------------------------------------------------------
    // Trust anchor lists
    // -----------------------------------------------------------------------

    /// Add `url` to the trust anchor list of `entity_id`.
    ///
    /// If the lookup finds the entity's list, the URL is appended and the
    /// list is rewritten under the key it was read from. Otherwise a new
    /// list holding only `url` is created under a freshly allocated key.
    /// Returns the key written.
    pub fn append_trust_anchor(&self, entity_id: &str, url: &str) -> LedgerResult<String> {
        let selector = match self.config.anchor_filter {
            AnchorFilter::ByEntity => trust_anchor_selector(entity_id),
            AnchorFilter::DocTypeOnly => doc_type_selector(DocType::TrustAnchorList),
        };
        let found = self.find_document(&selector, |doc| doc.into_trust_anchor_list())?;

        match found {
            Some(existing) if existing.record.entity_id == entity_id => {
                let mut list = existing.record;
                list.push(url);
                let bytes = Document::from(list).encode()?;
                self.write_back(&existing.key, Some(&existing.raw), &bytes)?;
                debug!(key = %existing.key, entity_id, url, "trust anchor appended");
                Ok(existing.key)
            }
            _ => {
                let key = self.allocator.next_key(&self.store, Counter::TrustAnchor)?;
                let list = TrustAnchorList::new(entity_id, url, key.clone());
                self.write_new(&key, &Document::from(list).encode()?)?;
                info!(key = %key, entity_id, url, "trust anchor list created");
                Ok(key)
            }
        }
    }

    /// The trust anchor list of `entity_id`, if one exists.
    pub fn trust_anchor_list(&self, entity_id: &str) -> LedgerResult<Option<TrustAnchorList>> {
        Ok(self
            .find_document(&trust_anchor_selector(entity_id), |doc| {
                doc.into_trust_anchor_list()
            })?
            .map(|m| m.record))
    }

    // -----------------------------------------------------------------------
    // Bulk queries
    // -----------------------------------------------------------------------

    /// Every record in the configured vehicle range, as a JSON array in key
    /// order.
    pub fn query_all_vehicles(&self) -> LedgerResult<Vec<u8>> {
        let range = &self.config.vehicle_range;
        aggregate_json(self.store.range_scan(&range.start, &range.end)?)
    }

    /// Every record matching `selector`, as a JSON array.
    pub fn query_selector(&self, selector: &Selector) -> LedgerResult<Vec<u8>> {
        aggregate_json(self.store.selector_query(&selector.to_query())?)
    }

    /// Every record matching `selector`, as `{"values": [...]}`.
    pub fn query_selector_values(&self, selector: &Selector) -> LedgerResult<Vec<u8>> {
        Ok(wrap_values(&self.query_selector(selector)?))
    }

    fn find_document<T, F>(
        &self,
        selector: &Selector,
        convert: F,
    ) -> LedgerResult<Option<QueryMatch<T>>>
    where
        F: Fn(Document) -> Result<T, TypeError>,
    {
        let query = selector.to_query();
        let cursor = self.store.selector_query(&query)?;
        single_match(cursor, self.config.match_policy, &query, |key, bytes| {
            Document::decode(bytes)
                .and_then(&convert)
                .map_err(|source| LedgerError::Decode {
                    key: key.to_string(),
                    source,
                })
        })
    }
}

impl<S> std::fmt::Debug for RecordBook<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordBook")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Selector for records of one doc type.
pub fn doc_type_selector(doc_type: DocType) -> Selector {
    Selector::new().eq(DOC_TYPE_FIELD, doc_type.as_str())
}

/// Selector for the metadata records of `user`.
pub fn metadata_selector(user: &str) -> Selector {
    doc_type_selector(DocType::Metadata).eq(USER_FIELD, user)
}

/// Selector for the trust anchor list of `entity_id`.
pub fn trust_anchor_selector(entity_id: &str) -> Selector {
    doc_type_selector(DocType::TrustAnchorList).eq(ENTITY_ID_FIELD, entity_id)
}
