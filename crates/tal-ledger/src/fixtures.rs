//! Fixture records written by ledger initialization.

use tal_store::LedgerStore;
use tal_types::{Codec, Document, MetadataRecord, TrustAnchorList};
use tracing::info;

use crate::error::LedgerResult;

/// SAML service-provider metadata registered for `www.idp.org`.
pub const IDP_METADATA: &str = "entityid: \"https://mail.service.com/service/extension/samlreceiver \",\n  contacts: [],\n  \"metadata-set\": \"saml20-sp-remote\",\n  AssertionConsumerService: [\n    {\n      Binding: \"urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST\",\n      Location: \"https://mail.service.com/service/extension/samlreceiver\",\n      index: 0,\n    },\n  ],\n  SingleLogoutService: [],\n  \"validate.authnrequest\": false,\n  \"NameIDFormat\": \"urn:oasis:names:tc:";

const IDP_METADATA_URL: &str = "http://idp.sust.com/simplesaml/saml2/idp/metadata.php";

/// The fixture documents, in write order. Each carries its own key.
pub fn fixture_documents() -> Vec<Document> {
    vec![
        MetadataRecord::new("www.idp.org", IDP_METADATA, "000").into(),
        TrustAnchorList::with_urls(
            "www.idp.sust.com",
            [
                "http://sp1.sust.com/simplesaml/module.php/saml/sp/metadata.php/default-sp",
                "http://sp2.sust.com/simplesaml/module.php/saml/sp/metadata.php/default-sp",
                "http://code.sust.com/simplesaml/module.php/saml/sp/metadata.php/default-sp",
                "http://18.191.122.156:3000/mailmetadata",
            ],
            "0001",
        )
        .into(),
        TrustAnchorList::with_urls("www.sp1.sust.com", [IDP_METADATA_URL], "0002").into(),
        TrustAnchorList::with_urls("www.sp2.sust.com", [IDP_METADATA_URL], "0003").into(),
    ]
}

/// Write the fixture documents, overwriting whatever is at their keys.
///
/// Running this twice leaves the store in the same state as running it once.
pub fn seed_fixtures(store: &dyn LedgerStore) -> LedgerResult<()> {
    let documents = fixture_documents();
    for document in &documents {
        store.put(document.key(), &document.encode()?)?;
    }
    info!(count = documents.len(), "ledger fixtures seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tal_store::InMemoryStore;

    #[test]
    fn seeds_four_documents_at_fixed_keys() {
        let store = InMemoryStore::new();
        seed_fixtures(&store).unwrap();
        assert_eq!(store.keys().unwrap(), vec!["000", "0001", "0002", "0003"]);

        let idp = Document::decode(&store.get("0001").unwrap().unwrap())
            .unwrap()
            .into_trust_anchor_list()
            .unwrap();
        assert_eq!(idp.entity_id, "www.idp.sust.com");
        assert_eq!(idp.entries.len(), 4);
        assert_eq!(idp.key, "0001");
    }

    #[test]
    fn metadata_fixture_is_tagged() {
        let store = InMemoryStore::new();
        seed_fixtures(&store).unwrap();
        let raw: serde_json::Value =
            serde_json::from_slice(&store.get("000").unwrap().unwrap()).unwrap();
        assert_eq!(raw["Doctype"], "MetaData Store");
        assert_eq!(raw["User"], "www.idp.org");
        assert_eq!(raw["Metadata"], IDP_METADATA);
        assert_eq!(raw["Key"], "000");
    }

    #[test]
    fn seeding_is_idempotent() {
        let store = InMemoryStore::new();
        seed_fixtures(&store).unwrap();
        let once = store.snapshot().unwrap();
        seed_fixtures(&store).unwrap();
        assert_eq!(store.snapshot().unwrap(), once);
    }
}
