use std::sync::Arc;

use tracing::debug;

use crate::aggregate::AggregationEngine;
use crate::cache::QueryCache;
use crate::catalog::{ALL_RATINGS, Catalog, filter_choices, resolve_name};
use crate::error::{Error, Result};
use crate::record::PokemonRecord;
use crate::store::{RemoteStore, StorePath, fetch_record};

/// Query surface over the cached catalog and the store.
///
/// Every dependency is passed in; nothing is looked up globally.
pub struct MovesetService<S> {
    store: Arc<S>,
    cache: Arc<QueryCache>,
    engine: AggregationEngine<S>,
}

impl<S: RemoteStore> MovesetService<S> {
    pub fn new(store: Arc<S>, cache: Arc<QueryCache>, engine: AggregationEngine<S>) -> Self {
        Self {
            store,
            cache,
            engine,
        }
    }

    pub fn list_generations(&self) -> &[String] {
        self.cache.generations()
    }

    pub fn list_formats(&self, generation: &str) -> &[String] {
        self.cache.formats(generation)
    }

    /// Includes the synthetic `all` rating
    pub fn list_ratings(&self, generation: &str, format: &str) -> &[String] {
        self.cache.ratings(generation, format)
    }

    pub fn list_pokemon(&self, generation: &str, format: &str, rating: &str) -> &[String] {
        self.cache.pokemon(generation, format, rating)
    }

    pub fn autocomplete_generations(&self, query: &str) -> Vec<String> {
        filter_choices(self.list_generations(), query)
    }

    pub fn autocomplete_formats(&self, generation: &str, query: &str) -> Vec<String> {
        filter_choices(self.list_formats(generation), query)
    }

    pub fn autocomplete_ratings(&self, generation: &str, format: &str, query: &str) -> Vec<String> {
        filter_choices(self.list_ratings(generation, format), query)
    }

    pub fn autocomplete_pokemon(
        &self,
        generation: &str,
        format: &str,
        rating: &str,
        query: &str,
    ) -> Vec<String> {
        filter_choices(self.list_pokemon(generation, format, rating), query)
    }

    /// Fetch one record. Rating `all` returns the composite over every
    /// stored rating. The name is matched exactly first, then by prefix.
    pub async fn get_record(
        &self,
        generation: &str,
        format: &str,
        rating: &str,
        pokemon: &str,
    ) -> Result<PokemonRecord> {
        let catalog = self.cache.catalog().ok_or(Error::CacheNotReady)?;
        let generation = generation.trim().to_ascii_lowercase();
        let format = format.trim().to_ascii_lowercase();
        let rating = rating.trim().to_ascii_lowercase();
        let format_key = validate(catalog, &generation, &format, &rating)?;

        let query = pokemon.trim();
        if query.is_empty() {
            return Err(Error::InvalidInput("pokemon name is empty".to_string()));
        }
        let name = resolve_name(catalog.pokemon(&generation, &format, &rating), query)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "{} in {}{} ({})",
                    query, generation, format, rating
                ))
            })?;
        if name != query {
            debug!("Resolved {:?} to {:?}", query, name);
        }

        if rating == ALL_RATINGS {
            return self.engine.aggregate(catalog, &generation, &format, name).await;
        }

        let path = StorePath::record(self.cache.root(), format_key, &rating, name)?;
        fetch_record(&*self.store, &path)
            .await
            .ok_or_else(|| Error::NotFound(format!("{} at {}", name, path)))
    }
}

/// Check (generation, format, rating) against the catalog and return the
/// format's store key
fn validate<'a>(
    catalog: &'a Catalog,
    generation: &str,
    format: &str,
    rating: &str,
) -> Result<&'a str> {
    if !catalog.has_generation(generation) {
        return Err(Error::InvalidInput(format!(
            "unknown generation {:?}",
            generation
        )));
    }
    let format_key = catalog.format_key(generation, format).ok_or_else(|| {
        Error::InvalidInput(format!("unknown format {:?} for {}", format, generation))
    })?;
    if rating == ALL_RATINGS {
        return Ok(format_key);
    }
    if rating.is_empty() || !rating.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidInput(format!(
            "rating {:?} is not a number",
            rating
        )));
    }
    if !catalog.ratings(generation, format).iter().any(|r| r == rating) {
        return Err(Error::InvalidInput(format!(
            "no rating {} for {}{}",
            rating, generation, format
        )));
    }
    Ok(format_key)
}
