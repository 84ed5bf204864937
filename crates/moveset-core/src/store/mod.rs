//! Hierarchical document store access.
//!
//! Data lives under `<root>/<format key>/<rating>/<pokemon>`. Every level
//! can be read shallowly (child keys only) or in full. All operations are
//! fail-soft: transport failures are logged and reported as "absent" or
//! `false`, never raised to the caller.
//!
//! - [`HttpStore`]: REST access to the remote store
//! - [`LocalStore`]: in-memory tree, loaded from a local JSON catalog when
//!   the remote is unreachable (and used by tests)

mod bucket;
mod http;
mod local;
mod path;

pub use bucket::{KeyedBucket, normalize_bucket};
pub use http::HttpStore;
pub use local::LocalStore;
pub use path::{StorePath, sanitize_key};

use std::collections::BTreeSet;
use std::future::Future;

use serde_json::Value;
use tracing::warn;

use crate::record::PokemonRecord;

pub trait RemoteStore: Send + Sync {
    /// Child key names at `path`. Values are not transferred. A missing path
    /// or a failed request yields an empty set.
    fn fetch_shallow(&self, path: &StorePath) -> impl Future<Output = BTreeSet<String>> + Send;

    /// Complete value at `path`, or `None` if absent or unreachable
    fn fetch_full(&self, path: &StorePath) -> impl Future<Output = Option<Value>> + Send;

    /// Replace the value at `path`
    fn put(&self, path: &StorePath, value: &Value) -> impl Future<Output = bool> + Send;

    /// Merge the top-level keys of `value` into `path`, keeping siblings
    fn patch(&self, path: &StorePath, value: &Value) -> impl Future<Output = bool> + Send;

    fn delete(&self, path: &StorePath) -> impl Future<Output = bool> + Send;
}

/// Fetch and decode one record. Undecodable values count as absent.
pub async fn fetch_record<S>(store: &S, path: &StorePath) -> Option<PokemonRecord>
where
    S: RemoteStore + ?Sized,
{
    let value = store.fetch_full(path).await?;
    match serde_json::from_value::<PokemonRecord>(value) {
        Ok(mut record) => {
            if record.name.is_empty()
                && let Some(last) = path.segments().last()
            {
                record.name = last.clone();
            }
            Some(record)
        }
        Err(e) => {
            warn!("Record at {} could not be decoded: {}", path, e);
            None
        }
    }
}

/// Fetch a whole rating bucket as an ordered list of records
pub async fn fetch_bucket<S>(store: &S, path: &StorePath) -> Vec<PokemonRecord>
where
    S: RemoteStore + ?Sized,
{
    store
        .fetch_full(path)
        .await
        .map(normalize_bucket)
        .unwrap_or_default()
}
