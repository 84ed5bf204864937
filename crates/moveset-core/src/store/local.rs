use std::collections::BTreeSet;
use std::path::Path;
use std::sync::RwLock;

use serde_json::{Map, Value};
use tracing::{info, warn};

use super::{KeyedBucket, RemoteStore, StorePath};
use crate::error::Result;
use crate::ingest::ReportSet;

/// In-memory JSON tree with the same path semantics as the remote store.
///
/// Arrays are addressed by stringified index, the way the remote store
/// exposes them.
#[derive(Debug, Default)]
pub struct LocalStore {
    tree: RwLock<Value>,
}

impl LocalStore {
    pub fn new() -> Self {
        Self::from_value(Value::Object(Map::new()))
    }

    pub fn from_value(tree: Value) -> Self {
        Self {
            tree: RwLock::new(tree),
        }
    }

    /// Build a store from a local catalog file (`format key -> rating ->
    /// bucket`), mounted under `root`. Buckets of either shape are rewritten
    /// into name-keyed objects so shallow reads list pokemon names.
    pub fn from_catalog_file<P: AsRef<Path>>(path: P, root: &str) -> Result<Self> {
        let reports = ReportSet::load(&path)?;
        info!(
            "Loaded fallback catalog from {} ({} formats)",
            path.as_ref().display(),
            reports.format_count()
        );
        Ok(Self::from_report_set(&reports, root))
    }

    pub fn from_report_set(reports: &ReportSet, root: &str) -> Self {
        let mut formats = Map::new();
        for (format_key, ratings) in reports.iter() {
            let mut buckets = Map::new();
            for (rating, records) in ratings {
                let keyed = KeyedBucket::from_records(records.iter().cloned());
                for name in &keyed.collisions {
                    warn!("Duplicate key for {} in {}/{}", name, format_key, rating);
                }
                buckets.insert(rating.clone(), keyed.to_value());
            }
            formats.insert(format_key.clone(), Value::Object(buckets));
        }
        let mut tree = Map::new();
        tree.insert(root.to_string(), Value::Object(formats));
        Self::from_value(Value::Object(tree))
    }
}

fn child<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn lookup<'a>(tree: &'a Value, path: &StorePath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(tree, |node, key| child(node, key))
        .filter(|value| !value.is_null())
}

/// Walk to `path`, turning missing or scalar nodes into objects and arrays
/// into index-keyed objects
fn lookup_or_create<'a>(tree: &'a mut Value, path: &StorePath) -> &'a mut Value {
    path.segments().iter().fold(tree, |node, key| {
        match node.take() {
            Value::Array(items) => {
                *node = Value::Object(
                    items
                        .into_iter()
                        .enumerate()
                        .map(|(i, v)| (i.to_string(), v))
                        .collect(),
                );
            }
            object @ Value::Object(_) => *node = object,
            // Null (left by take) becomes an object on first index
            _ => {}
        }
        &mut node[key.as_str()]
    })
}

impl RemoteStore for LocalStore {
    async fn fetch_shallow(&self, path: &StorePath) -> BTreeSet<String> {
        let Ok(tree) = self.tree.read() else {
            return BTreeSet::new();
        };
        match lookup(&tree, path) {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_null())
                .map(|(i, _)| i.to_string())
                .collect(),
            _ => BTreeSet::new(),
        }
    }

    async fn fetch_full(&self, path: &StorePath) -> Option<Value> {
        let tree = self.tree.read().ok()?;
        lookup(&tree, path).cloned()
    }

    async fn put(&self, path: &StorePath, value: &Value) -> bool {
        let Ok(mut tree) = self.tree.write() else {
            return false;
        };
        *lookup_or_create(&mut tree, path) = value.clone();
        true
    }

    async fn patch(&self, path: &StorePath, value: &Value) -> bool {
        let Value::Object(updates) = value else {
            return false;
        };
        let Ok(mut tree) = self.tree.write() else {
            return false;
        };
        let node = lookup_or_create(&mut tree, path);
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        if let Value::Object(map) = node {
            for (key, update) in updates {
                map.insert(key.clone(), update.clone());
            }
        }
        true
    }

    async fn delete(&self, path: &StorePath) -> bool {
        let Ok(mut tree) = self.tree.write() else {
            return false;
        };
        let Some((last, parents)) = path.segments().split_last() else {
            *tree = Value::Object(Map::new());
            return true;
        };
        let parent = parents
            .iter()
            .try_fold(&mut *tree, |node, key| match node {
                Value::Object(map) => map.get_mut(key),
                _ => None,
            });
        if let Some(Value::Object(map)) = parent {
            map.remove(last);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fetch_bucket;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn path(parts: &[&str]) -> StorePath {
        let (first, rest) = parts.split_first().unwrap();
        rest.iter()
            .fold(StorePath::root(first).unwrap(), |p, s| p.child(s).unwrap())
    }

    #[tokio::test]
    async fn test_shallow_and_full_reads() {
        let store = LocalStore::from_value(json!({
            "pokemondata": {
                "gen1ou": {"0": {"Tauros": {"name": "Tauros", "raw_count": 5}}}
            }
        }));

        let keys = store.fetch_shallow(&path(&["pokemondata", "gen1ou"])).await;
        assert_eq!(keys.into_iter().collect::<Vec<_>>(), vec!["0"]);

        let value = store
            .fetch_full(&path(&["pokemondata", "gen1ou", "0", "Tauros"]))
            .await
            .unwrap();
        assert_eq!(value["raw_count"], 5);

        assert!(store.fetch_shallow(&path(&["pokemondata", "gen2ou"])).await.is_empty());
        assert!(store.fetch_full(&path(&["pokemondata", "gen2ou"])).await.is_none());
    }

    #[tokio::test]
    async fn test_put_patch_delete() {
        let store = LocalStore::new();
        let bucket = path(&["pokemondata", "gen9ou", "1500"]);

        assert!(store.put(&bucket, &json!({"Kingambit": {"name": "Kingambit"}})).await);
        assert!(
            store
                .patch(&bucket, &json!({"Gholdengo": {"name": "Gholdengo"}}))
                .await
        );
        let keys: Vec<String> = store.fetch_shallow(&bucket).await.into_iter().collect();
        assert_eq!(keys, vec!["Gholdengo", "Kingambit"]);

        assert!(store.delete(&bucket.child("Kingambit").unwrap()).await);
        let keys: Vec<String> = store.fetch_shallow(&bucket).await.into_iter().collect();
        assert_eq!(keys, vec!["Gholdengo"]);

        assert!(!store.patch(&bucket, &json!([1, 2])).await);
        assert!(store.delete(&path(&["nothing", "here"])).await);
    }

    #[tokio::test]
    async fn test_array_buckets_addressed_by_index() {
        let store = LocalStore::from_value(json!({
            "pokemondata": {"gen1ou": {"0": [{"name": "Tauros"}, null, {"name": "Snorlax"}]}}
        }));
        let bucket = path(&["pokemondata", "gen1ou", "0"]);
        let keys: Vec<String> = store.fetch_shallow(&bucket).await.into_iter().collect();
        assert_eq!(keys, vec!["0", "2"]);

        let names: Vec<String> = fetch_bucket(&store, &bucket)
            .await
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Tauros", "Snorlax"]);
    }

    #[tokio::test]
    async fn test_from_catalog_file_accepts_both_bucket_shapes() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            json!({
                "pokemon": {
                    "gen1ou": {
                        "0": [{"name": "Mr. Mime", "raw_count": 2}],
                        "1760": {"Tauros": {"name": "Tauros"}}
                    }
                }
            })
            .to_string(),
        )
        .unwrap();

        let store = LocalStore::from_catalog_file(file.path(), "pokemondata").unwrap();
        let low: Vec<String> = store
            .fetch_shallow(&path(&["pokemondata", "gen1ou", "0"]))
            .await
            .into_iter()
            .collect();
        assert_eq!(low, vec!["Mr Mime"]);

        let high: Vec<String> = store
            .fetch_shallow(&path(&["pokemondata", "gen1ou", "1760"]))
            .await
            .into_iter()
            .collect();
        assert_eq!(high, vec!["Tauros"]);
    }
}
