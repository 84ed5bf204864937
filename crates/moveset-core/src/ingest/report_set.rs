use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::catalog::{Catalog, CatalogBuilder};
use crate::error::{Error, Result};
use crate::record::PokemonRecord;
use crate::store::{KeyedBucket, normalize_bucket};

/// Key wrapping the whole catalog in older files
const LEGACY_WRAPPER: &str = "pokemon";

type Buckets = BTreeMap<String, Vec<PokemonRecord>>;

/// Parsed reports: format key -> rating -> records.
///
/// Persisted as a JSON object of the same nesting whose buckets are
/// objects keyed by sanitized pokemon name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSet {
    formats: BTreeMap<String, Buckets>,
}

impl ReportSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, format_key: &str, rating: &str, records: Vec<PokemonRecord>) {
        self.formats
            .entry(format_key.to_string())
            .or_default()
            .insert(rating.to_string(), records);
    }

    pub fn get(&self, format_key: &str, rating: &str) -> Option<&[PokemonRecord]> {
        self.formats
            .get(format_key)
            .and_then(|ratings| ratings.get(rating))
            .map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Buckets)> {
        self.formats.iter()
    }

    pub fn format_count(&self) -> usize {
        self.formats.len()
    }

    pub fn bucket_count(&self) -> usize {
        self.formats.values().map(BTreeMap::len).sum()
    }

    pub fn record_count(&self) -> usize {
        self.formats
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Decode a catalog value. Buckets may be arrays or objects, and the
    /// whole catalog may be wrapped in a single `pokemon` key.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut root) = value else {
            return Err(Error::malformed("catalog", "root is not a JSON object"));
        };
        if root.len() == 1
            && root.get(LEGACY_WRAPPER).is_some_and(Value::is_object)
            && let Some(Value::Object(inner)) = root.remove(LEGACY_WRAPPER)
        {
            root = inner;
        }

        let mut reports = Self::new();
        for (format_key, ratings) in root {
            let Value::Object(ratings) = ratings else {
                warn!("Skipping format {}: ratings are not an object", format_key);
                continue;
            };
            for (rating, bucket) in ratings {
                reports.insert(&format_key, &rating, normalize_bucket(bucket));
            }
        }
        Ok(reports)
    }

    /// Encode with name-keyed buckets. Records whose sanitized name collides
    /// with an earlier one are dropped with a warning.
    pub fn to_value(&self) -> Value {
        let mut root = Map::new();
        for (format_key, ratings) in &self.formats {
            let mut buckets = Map::new();
            for (rating, records) in ratings {
                let keyed = KeyedBucket::from_records(records.iter().cloned());
                for name in &keyed.collisions {
                    warn!("Duplicate key for {} in {}/{}", name, format_key, rating);
                }
                buckets.insert(rating.clone(), keyed.to_value());
            }
            root.insert(format_key.clone(), Value::Object(buckets));
        }
        Value::Object(root)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let value: Value = serde_json::from_str(&content)?;
        Self::from_value(value)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.to_value())?;
        fs::write(&path, content)?;
        info!(
            "Saved {} buckets ({} records) to {}",
            self.bucket_count(),
            self.record_count(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Name-only catalog over every bucket
    pub fn to_catalog(&self) -> Catalog {
        let mut builder = CatalogBuilder::new();
        for (format_key, ratings) in &self.formats {
            builder.add_format(format_key);
            for (rating, records) in ratings {
                builder.add_records(format_key, rating, records);
            }
        }
        builder.build()
    }
}
