//! Cursor draining.
//!
//! Range scans and selector queries hand back a [`ScopedCursor`]. The
//! helpers here drain one into either a JSON array response or a single
//! decoded match. Every helper consumes the cursor, so it is closed on all
//! exit paths.

use tal_store::ScopedCursor;
use tal_types::TypeError;
use tracing::debug;

use crate::config::MatchPolicy;
use crate::error::{LedgerError, LedgerResult};

/// A decoded record together with the key and raw bytes it was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryMatch<T> {
    pub key: String,
    pub raw: Vec<u8>,
    pub record: T,
}

/// Drain `cursor` into a JSON array of `{"Key": <key>, "Record": <value>}`.
///
/// Entries appear in cursor order. Values are copied verbatim; an empty
/// value is written as `null`. An empty cursor produces `[]`.
pub fn aggregate_json(mut cursor: ScopedCursor<'_>) -> LedgerResult<Vec<u8>> {
    let mut buffer = Vec::with_capacity(64);
    buffer.push(b'[');

    let mut count = 0usize;
    for entry in cursor.by_ref() {
        let kv = entry?;
        if count > 0 {
            buffer.push(b',');
        }
        buffer.extend_from_slice(b"{\"Key\":");
        serde_json::to_writer(&mut buffer, &kv.key)
            .map_err(|e| LedgerError::Encode(TypeError::Encode(e.to_string())))?;
        buffer.extend_from_slice(b", \"Record\":");
        if kv.value.is_empty() {
            buffer.extend_from_slice(b"null");
        } else {
            buffer.extend_from_slice(&kv.value);
        }
        buffer.push(b'}');
        count += 1;
    }
    buffer.push(b']');

    cursor.close()?;
    debug!(count, bytes = buffer.len(), "aggregated query result");
    Ok(buffer)
}

/// Wrap an aggregated array as `{"values": [...]}`.
pub fn wrap_values(array: &[u8]) -> Vec<u8> {
    let mut wrapped = Vec::with_capacity(array.len() + 12);
    wrapped.extend_from_slice(b"{\"values\": ");
    wrapped.extend_from_slice(array);
    wrapped.push(b'}');
    wrapped
}

/// Drain `cursor` down to at most one decoded match.
///
/// With [`MatchPolicy::Unique`], a second match aborts with
/// [`LedgerError::AmbiguousMatch`] naming `selector`. With
/// [`MatchPolicy::LastWins`], the last match in cursor order is returned.
/// Every match is decoded as it is read; the first decode failure aborts.
pub fn single_match<T, F>(
    mut cursor: ScopedCursor<'_>,
    policy: MatchPolicy,
    selector: &str,
    mut decode: F,
) -> LedgerResult<Option<QueryMatch<T>>>
where
    F: FnMut(&str, &[u8]) -> LedgerResult<T>,
{
    let mut found: Option<QueryMatch<T>> = None;
    for entry in cursor.by_ref() {
        let kv = entry?;
        let record = decode(&kv.key, &kv.value)?;
        if let (MatchPolicy::Unique, Some(first)) = (policy, &found) {
            return Err(LedgerError::AmbiguousMatch {
                selector: selector.to_string(),
                first: first.key.clone(),
                second: kv.key,
            });
        }
        found = Some(QueryMatch {
            key: kv.key,
            raw: kv.value,
            record,
        });
    }
    cursor.close()?;
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::Value;
    use std::sync::Arc;
    use tal_store::{CursorStats, KeyValue, StoreError, VecCursor};

    fn cursor(entries: Vec<(&str, &str)>, stats: &Arc<CursorStats>) -> ScopedCursor<'static> {
        ScopedCursor::new(
            VecCursor::new(
                entries
                    .into_iter()
                    .map(|(k, v)| KeyValue::new(k, v))
                    .collect(),
            )
            .tracked(stats.clone()),
        )
    }

    fn utf8_decode(_key: &str, bytes: &[u8]) -> LedgerResult<String> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| LedgerError::Encode(TypeError::Decode(e.to_string())))
    }

    // -----------------------------------------------------------------------
    // JSON aggregation
    // -----------------------------------------------------------------------

    #[test]
    fn empty_cursor_aggregates_to_empty_array() {
        let stats = Arc::new(CursorStats::new());
        let out = aggregate_json(cursor(vec![], &stats)).unwrap();
        assert_eq!(out, b"[]");
        assert_eq!(stats.closed(), 1);
    }

    #[test]
    fn aggregates_in_cursor_order_with_raw_records() {
        let stats = Arc::new(CursorStats::new());
        let out = aggregate_json(cursor(
            vec![("CAR1", r#"{"owner":"b"}"#), ("CAR0", r#"{"owner":"a"}"#)],
            &stats,
        ))
        .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"[{"Key":"CAR1", "Record":{"owner":"b"}},{"Key":"CAR0", "Record":{"owner":"a"}}]"#
        );
    }

    #[test]
    fn keys_are_json_escaped() {
        let stats = Arc::new(CursorStats::new());
        let out = aggregate_json(cursor(vec![("we\"ird", "1")], &stats)).unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[0]["Key"], "we\"ird");
        assert_eq!(parsed[0]["Record"], 1);
    }

    #[test]
    fn empty_value_becomes_null() {
        let stats = Arc::new(CursorStats::new());
        let out = aggregate_json(cursor(vec![("k", "")], &stats)).unwrap();
        let parsed: Value = serde_json::from_slice(&out).unwrap();
        assert!(parsed[0]["Record"].is_null());
    }

    #[test]
    fn cursor_error_aborts_and_closes() {
        let stats = Arc::new(CursorStats::new());
        let failing = ScopedCursor::new(
            VecCursor::from_results(vec![
                Ok(KeyValue::new("a", "1")),
                Err(StoreError::Cursor("lost connection".into())),
            ])
            .tracked(stats.clone()),
        );
        let err = aggregate_json(failing).unwrap_err();
        assert_eq!(err, LedgerError::Store(StoreError::Cursor("lost connection".into())));
        assert_eq!(stats.closed(), 1);
    }

    #[test]
    fn wrap_values_envelope() {
        assert_eq!(wrap_values(b"[]"), b"{\"values\": []}".to_vec());
    }

    // -----------------------------------------------------------------------
    // Single match
    // -----------------------------------------------------------------------

    #[test]
    fn no_match_is_none() {
        let stats = Arc::new(CursorStats::new());
        let m = single_match(cursor(vec![], &stats), MatchPolicy::Unique, "q", utf8_decode).unwrap();
        assert!(m.is_none());
        assert_eq!(stats.closed(), 1);
    }

    #[test]
    fn unique_policy_rejects_second_match() {
        let stats = Arc::new(CursorStats::new());
        let err = single_match(
            cursor(vec![("1", "a"), ("2", "b"), ("3", "c")], &stats),
            MatchPolicy::Unique,
            "q",
            utf8_decode,
        )
        .unwrap_err();
        assert_eq!(
            err,
            LedgerError::AmbiguousMatch {
                selector: "q".into(),
                first: "1".into(),
                second: "2".into(),
            }
        );
        assert_eq!(stats.closed(), 1);
    }

    #[test]
    fn last_wins_policy_keeps_final_match() {
        let stats = Arc::new(CursorStats::new());
        let m = single_match(
            cursor(vec![("1", "a"), ("2", "b")], &stats),
            MatchPolicy::LastWins,
            "q",
            utf8_decode,
        )
        .unwrap()
        .unwrap();
        assert_eq!(m.key, "2");
        assert_eq!(m.record, "b");
        assert_eq!(m.raw, b"b");
    }

    #[test]
    fn decode_failure_mid_iteration_closes_once() {
        let stats = Arc::new(CursorStats::new());
        let err = single_match(
            cursor(vec![("1", "ok"), ("2", "bad"), ("3", "ok")], &stats),
            MatchPolicy::LastWins,
            "q",
            |key, bytes| {
                if bytes == b"bad" {
                    Err(LedgerError::Decode {
                        key: key.to_string(),
                        source: TypeError::Decode("bad".into()),
                    })
                } else {
                    Ok(())
                }
            },
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::Decode { ref key, .. } if key == "2"));
        assert_eq!(stats.opened(), 1);
        assert_eq!(stats.closed(), 1);
    }

    proptest! {
        #[test]
        fn aggregation_preserves_every_entry_in_order(
            keys in proptest::collection::btree_set("[A-Z]{1,3}[0-9]{0,3}", 0..20),
        ) {
            let stats = Arc::new(CursorStats::new());
            let entries: Vec<KeyValue> = keys
                .iter()
                .enumerate()
                .map(|(i, k)| KeyValue::new(k.clone(), i.to_string()))
                .collect();
            let out = aggregate_json(ScopedCursor::new(
                VecCursor::new(entries).tracked(stats.clone()),
            ))
            .unwrap();
            let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
            prop_assert_eq!(parsed.len(), keys.len());
            for (i, (item, key)) in parsed.iter().zip(keys.iter()).enumerate() {
                prop_assert_eq!(item["Key"].as_str(), Some(key.as_str()));
                prop_assert_eq!(item["Record"].as_u64(), Some(i as u64));
            }
            prop_assert_eq!(stats.closed(), 1);
        }
    }
}
