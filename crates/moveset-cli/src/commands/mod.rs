//! CLI command implementations.

pub mod catalog;
pub mod complete;
pub mod scrape;
pub mod show;
pub mod upload;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use moveset_core::{
    AggregationEngine, Config, HttpClient, HttpStore, LocalStore, MovesetService, QueryCache,
    RemoteStore,
};

/// Store the query commands read from
pub enum Backend {
    Remote(Arc<HttpStore>),
    Local(Arc<LocalStore>),
}

pub fn http_client(config: &Config) -> Result<HttpClient> {
    HttpClient::new(config.timeout(), config.max_retries).context("Failed to build HTTP client")
}

pub fn remote_store(config: &Config) -> Result<Option<HttpStore>> {
    let Some(url) = &config.store_url else {
        return Ok(None);
    };
    let store = HttpStore::new(http_client(config)?, url)
        .with_context(|| format!("Invalid store URL {:?}", url))?;
    Ok(Some(store))
}

/// Remote store when configured, otherwise the local catalog file
pub fn open_backend(config: &Config) -> Result<Backend> {
    if let Some(store) = remote_store(config)? {
        return Ok(Backend::Remote(Arc::new(store)));
    }
    if let Some(path) = &config.fallback_path {
        let store = LocalStore::from_catalog_file(path, &config.store_root)
            .with_context(|| format!("Failed to load catalog file {:?}", path))?;
        return Ok(Backend::Local(Arc::new(store)));
    }
    bail!("No store configured: pass --store-url or --fallback")
}

/// Wire the query service and wait for the catalog crawl to finish
pub async fn ready_service<S>(store: Arc<S>, config: &Config) -> Result<MovesetService<S>>
where
    S: RemoteStore + 'static,
{
    let cache = Arc::new(QueryCache::from_config(config));
    cache
        .clone()
        .spawn_build(store.clone())
        .await
        .context("Catalog build task failed")?;

    let engine = AggregationEngine::new(store.clone(), config.store_root.clone())
        .with_concurrency(config.query_concurrency)
        .with_policy(config.counter_policy);
    Ok(MovesetService::new(store, cache, engine))
}
