//! Process-lifetime catalog snapshot for instant lookups.
//!
//! The snapshot is built once by a background crawl made of shallow reads
//! only (formats, then ratings, then pokemon keys). Until the crawl
//! finishes every lookup answers with an empty list.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use futures::stream::{self, StreamExt};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogBuilder};
use crate::config::{Config, DEFAULT_STORE_ROOT};
use crate::store::{LocalStore, RemoteStore, StorePath};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CacheState {
    NotReady = 0,
    Building = 1,
    Ready = 2,
}

impl CacheState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => CacheState::Building,
            2 => CacheState::Ready,
            _ => CacheState::NotReady,
        }
    }
}

pub struct QueryCache {
    root: String,
    concurrency: usize,
    fallback_path: Option<PathBuf>,
    state: AtomicU8,
    catalog: OnceLock<Catalog>,
    ready: Notify,
}

impl QueryCache {
    pub fn new(root: impl Into<String>, concurrency: usize) -> Self {
        Self {
            root: root.into(),
            concurrency: concurrency.max(1),
            fallback_path: None,
            state: AtomicU8::new(CacheState::NotReady as u8),
            catalog: OnceLock::new(),
            ready: Notify::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let cache = Self::new(config.store_root.clone(), config.crawl_concurrency);
        match &config.fallback_path {
            Some(path) => cache.with_fallback(path.clone()),
            None => cache,
        }
    }

    /// Local catalog file crawled instead when the store yields nothing
    pub fn with_fallback(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback_path = Some(path.into());
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn state(&self) -> CacheState {
        CacheState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_ready(&self) -> bool {
        self.state() == CacheState::Ready
    }

    /// Snapshot, once built
    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.get()
    }

    /// Crawl the store and publish the snapshot. Only the first call does
    /// any work; later calls return immediately.
    pub async fn build<S>(&self, store: &S)
    where
        S: RemoteStore + ?Sized,
    {
        if self
            .state
            .compare_exchange(
                CacheState::NotReady as u8,
                CacheState::Building as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            debug!("Catalog build already started");
            return;
        }

        let mut catalog = crawl(store, &self.root, self.concurrency).await;
        if catalog.is_empty()
            && let Some(path) = &self.fallback_path
        {
            warn!("Store returned no formats, using {}", path.display());
            match LocalStore::from_catalog_file(path, &self.root) {
                Ok(local) => catalog = crawl(&local, &self.root, self.concurrency).await,
                Err(e) => warn!("Fallback catalog unusable: {}", e),
            }
        }

        info!(
            "Catalog ready: {} generations, {} formats",
            catalog.generations().len(),
            catalog.format_count()
        );
        let _ = self.catalog.set(catalog);
        self.state.store(CacheState::Ready as u8, Ordering::Release);
        self.ready.notify_waiters();
    }

    /// Run [`build`](Self::build) as a background task
    pub fn spawn_build<S>(self: Arc<Self>, store: Arc<S>) -> JoinHandle<()>
    where
        S: RemoteStore + 'static,
    {
        tokio::spawn(async move { self.build(&*store).await })
    }

    /// Wait until the snapshot is published
    pub async fn wait_ready(&self) {
        loop {
            let notified = self.ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_ready() {
                return;
            }
            notified.await;
        }
    }

    pub fn generations(&self) -> &[String] {
        self.catalog().map(Catalog::generations).unwrap_or(&[])
    }

    pub fn formats(&self, generation: &str) -> &[String] {
        self.catalog()
            .map(|c| c.formats(generation))
            .unwrap_or(&[])
    }

    pub fn ratings(&self, generation: &str, format: &str) -> &[String] {
        self.catalog()
            .map(|c| c.ratings(generation, format))
            .unwrap_or(&[])
    }

    pub fn pokemon(&self, generation: &str, format: &str, rating: &str) -> &[String] {
        self.catalog()
            .map(|c| c.pokemon(generation, format, rating))
            .unwrap_or(&[])
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_ROOT, 20)
    }
}

/// Shallow-read every level under `root` into a catalog
pub async fn crawl<S>(store: &S, root: &str, concurrency: usize) -> Catalog
where
    S: RemoteStore + ?Sized,
{
    let root_path = match StorePath::root(root) {
        Ok(path) => path,
        Err(e) => {
            warn!("Cannot crawl {:?}: {}", root, e);
            return Catalog::default();
        }
    };
    let format_keys = store.fetch_shallow(&root_path).await;
    debug!("{} format keys under {}", format_keys.len(), root_path);

    let rating_sets: Vec<(String, StorePath, BTreeSet<String>)> =
        stream::iter(children(&root_path, format_keys))
            .map(|(format_key, path)| async move {
                let ratings = store.fetch_shallow(&path).await;
                (format_key, path, ratings)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

    let mut builder = CatalogBuilder::new();
    let mut buckets = Vec::new();
    for (format_key, path, ratings) in rating_sets {
        builder.add_format(&format_key);
        for (rating, bucket) in children(&path, ratings) {
            buckets.push((format_key.clone(), rating, bucket));
        }
    }

    let name_sets: Vec<(String, String, BTreeSet<String>)> = stream::iter(buckets)
        .map(|(format_key, rating, path)| async move {
            let names = store.fetch_shallow(&path).await;
            (format_key, rating, names)
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    for (format_key, rating, names) in name_sets {
        builder.add_bucket(&format_key, &rating, names);
    }
    builder.build()
}

fn children(parent: &StorePath, keys: BTreeSet<String>) -> Vec<(String, StorePath)> {
    keys.into_iter()
        .filter_map(|key| match parent.child(&key) {
            Ok(path) => Some((key, path)),
            Err(e) => {
                warn!("Skipping key under {}: {}", parent, e);
                None
            }
        })
        .collect()
}
