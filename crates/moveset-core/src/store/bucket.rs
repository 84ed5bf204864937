//! Rating bucket shapes.
//!
//! A bucket has been stored both as a JSON array of records and as an
//! object keyed by pokemon name (or by stringified index). Reads normalize
//! either shape to an ordered list; writes always produce the keyed shape.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use super::path::sanitize_key;
use crate::record::PokemonRecord;

/// Normalize a stored bucket into an ordered list of records.
///
/// Object buckets whose keys are all integers are ordered numerically.
/// When a record has no name, its object key is used. Entries that are not
/// records are skipped.
pub fn normalize_bucket(value: Value) -> Vec<PokemonRecord> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| decode_record(None, item))
            .collect(),
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            if entries.iter().all(|(k, _)| k.parse::<u64>().is_ok()) {
                entries.sort_by_key(|(k, _)| k.parse::<u64>().unwrap_or(u64::MAX));
            }
            entries
                .into_iter()
                .filter_map(|(key, item)| decode_record(Some(key), item))
                .collect()
        }
        Value::Null => Vec::new(),
        other => {
            warn!("Ignoring bucket of unexpected JSON type: {}", other);
            Vec::new()
        }
    }
}

fn decode_record(key: Option<String>, item: Value) -> Option<PokemonRecord> {
    if !item.is_object() {
        return None;
    }
    match serde_json::from_value::<PokemonRecord>(item) {
        Ok(mut record) => {
            if record.name.is_empty() {
                match key {
                    Some(key) if key.parse::<u64>().is_err() => record.name = key,
                    _ => return None,
                }
            }
            Some(record)
        }
        Err(e) => {
            warn!("Skipping undecodable record {:?}: {}", key, e);
            None
        }
    }
}

/// A bucket keyed by sanitized pokemon name, ready to be stored
#[derive(Debug, Default)]
pub struct KeyedBucket {
    pub records: BTreeMap<String, PokemonRecord>,
    /// Names whose sanitized key was already taken; the first record wins
    pub collisions: Vec<String>,
}

impl KeyedBucket {
    /// Key records by sanitized name. The stored `name` field is rewritten
    /// to the key so lookups by name and by key agree.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = PokemonRecord>,
    {
        let mut bucket = Self::default();
        for mut record in records {
            let key = sanitize_key(&record.name);
            if key.trim().is_empty() || bucket.records.contains_key(&key) {
                bucket.collisions.push(record.name);
                continue;
            }
            record.name = key.clone();
            bucket.records.insert(key, record);
        }
        bucket
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(&self.records).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_list_bucket() {
        let records = normalize_bucket(json!([
            {"name": "Tauros", "raw_count": 10},
            null,
            {"name": "Snorlax"}
        ]));
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Tauros", "Snorlax"]);
        assert_eq!(records[0].raw_count, Some(10));
    }

    #[test]
    fn test_normalize_index_keyed_bucket_in_numeric_order() {
        let records = normalize_bucket(json!({
            "10": {"name": "Chansey"},
            "2": {"name": "Snorlax"},
            "1": {"name": "Tauros"}
        }));
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Tauros", "Snorlax", "Chansey"]);
    }

    #[test]
    fn test_normalize_name_keyed_bucket_fills_names() {
        let records = normalize_bucket(json!({
            "Mr Mime": {"raw_count": 3},
            "Tauros": {"name": "Tauros"},
            "Broken": "not a record"
        }));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Mr Mime");
        assert_eq!(records[0].raw_count, Some(3));
        assert!(normalize_bucket(Value::Null).is_empty());
        assert!(normalize_bucket(json!(42)).is_empty());
    }

    #[test]
    fn test_keyed_bucket_reports_collisions() {
        let bucket = KeyedBucket::from_records(vec![
            PokemonRecord::new("Mr. Mime"),
            PokemonRecord::new("Mr Mime"),
            PokemonRecord::new("Tauros"),
            PokemonRecord::new("..."),
        ]);
        assert_eq!(bucket.records.len(), 2);
        assert_eq!(bucket.records["Mr Mime"].name, "Mr Mime");
        assert_eq!(bucket.collisions, vec!["Mr Mime", "..."]);

        let value = bucket.to_value();
        assert!(value.get("Tauros").is_some());
    }
}
