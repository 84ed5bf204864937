use std::collections::BTreeSet;

use reqwest::{Method, Url};
use serde_json::Value;
use tracing::warn;

use super::{RemoteStore, StorePath};
use crate::error::{Error, Result};
use crate::network::{HttpClient, parse_url};

/// REST adapter: `GET/PUT/PATCH/DELETE <base>/<path>.json`, with
/// `?shallow=true` for key-only reads.
#[derive(Clone)]
pub struct HttpStore {
    client: HttpClient,
    base_url: Url,
}

impl HttpStore {
    pub fn new(client: HttpClient, base_url: &str) -> Result<Self> {
        let base_url = parse_url(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidInput(format!(
                "store URL {} cannot be a base",
                base_url
            )));
        }
        Ok(Self { client, base_url })
    }

    /// Build the request URL. Segments are percent-encoded and the last one
    /// gets the `.json` suffix.
    pub fn url(&self, path: &StorePath, shallow: bool) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            let parts = path.segments();
            if let Some((last, parents)) = parts.split_last() {
                segments.extend(parents);
                segments.push(&format!("{}.json", last));
            } else {
                segments.push(".json");
            }
        }
        if shallow {
            url.query_pairs_mut().append_pair("shallow", "true");
        }
        url
    }
}

impl RemoteStore for HttpStore {
    async fn fetch_shallow(&self, path: &StorePath) -> BTreeSet<String> {
        match self.client.get_json(&self.url(path, true)).await {
            Ok(Some(Value::Object(map))) => map.into_iter().map(|(k, _)| k).collect(),
            Ok(_) => BTreeSet::new(),
            Err(e) => {
                warn!("Shallow fetch of {} failed: {}", path, e);
                BTreeSet::new()
            }
        }
    }

    async fn fetch_full(&self, path: &StorePath) -> Option<Value> {
        match self.client.get_json(&self.url(path, false)).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Fetch of {} failed: {}", path, e);
                None
            }
        }
    }

    async fn put(&self, path: &StorePath, value: &Value) -> bool {
        let url = self.url(path, false);
        match self.client.send_json(Method::PUT, &url, value).await {
            Ok(()) => true,
            Err(e) => {
                warn!("PUT {} failed: {}", path, e);
                false
            }
        }
    }

    async fn patch(&self, path: &StorePath, value: &Value) -> bool {
        let url = self.url(path, false);
        match self.client.send_json(Method::PATCH, &url, value).await {
            Ok(()) => true,
            Err(e) => {
                warn!("PATCH {} failed: {}", path, e);
                false
            }
        }
    }

    async fn delete(&self, path: &StorePath) -> bool {
        match self.client.delete(&self.url(path, false)).await {
            Ok(()) => true,
            Err(e) => {
                warn!("DELETE {} failed: {}", path, e);
                false
            }
        }
    }
}
