//! Browsing catalog: generation -> format -> rating -> pokemon names.
//!
//! A [`Catalog`] is an immutable snapshot. All lookup tables are computed
//! once by [`CatalogBuilder::build`]; rebuilding means building a new one.

mod choices;
mod format_key;

pub use choices::{MAX_CHOICES, filter_choices, normalize_name, resolve_name};
pub use format_key::{UNKNOWN_GENERATION, split_format_key};

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::warn;

use crate::record::PokemonRecord;

/// Synthetic rating covering every real rating of a format
pub const ALL_RATINGS: &str = "all";

type GenFormat = (String, String);
type GenFormatRating = (String, String, String);

/// Collects (format key, rating, names) buckets before building a [`Catalog`]
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    buckets: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the pokemon names of one (format key, rating) bucket.
    ///
    /// A stored `all` rating is ignored; it is always derived.
    pub fn add_bucket<I, S>(&mut self, format_key: &str, rating: &str, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if rating == ALL_RATINGS {
            return self;
        }
        self.buckets
            .entry(format_key.to_string())
            .or_default()
            .entry(rating.to_string())
            .or_default()
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Register a format key that has no ratings yet
    pub fn add_format(&mut self, format_key: &str) -> &mut Self {
        self.buckets.entry(format_key.to_string()).or_default();
        self
    }

    pub fn add_records(
        &mut self,
        format_key: &str,
        rating: &str,
        records: &[PokemonRecord],
    ) -> &mut Self {
        self.add_bucket(format_key, rating, records.iter().map(|r| r.name.clone()))
    }

    pub fn build(&self) -> Catalog {
        let mut catalog = Catalog::default();

        for (format_key, ratings) in &self.buckets {
            let (generation, format) = split_format_key(format_key);
            let gen_format = (generation.clone(), format.clone());
            if let Some(existing) = catalog.format_keys.get(&gen_format) {
                warn!(
                    "Format key {} collides with {} as {}/{}, keeping the first",
                    format_key, existing, generation, format
                );
                continue;
            }
            catalog
                .format_keys
                .insert(gen_format.clone(), format_key.clone());
            catalog
                .formats_by_gen
                .entry(generation.clone())
                .or_default()
                .push(format.clone());

            let mut sorted: Vec<&String> = ratings.keys().collect();
            sorted.sort_by_key(|r| rating_sort_key(r));

            let mut union = Vec::new();
            let mut union_seen = HashSet::new();
            for rating in &sorted {
                let names = dedup(&ratings[*rating]);
                for name in &names {
                    if union_seen.insert(name.clone()) {
                        union.push(name.clone());
                    }
                }
                catalog.pokemon.insert(
                    (generation.clone(), format.clone(), (*rating).clone()),
                    names,
                );
            }
            catalog
                .pokemon
                .insert((generation.clone(), format.clone(), ALL_RATINGS.to_string()), union);

            let mut listed = vec![ALL_RATINGS.to_string()];
            listed.extend(sorted.into_iter().cloned());
            catalog.ratings.insert(gen_format, listed);
        }

        for formats in catalog.formats_by_gen.values_mut() {
            formats.sort();
        }
        let mut generations: Vec<String> = catalog
            .formats_by_gen
            .keys()
            .filter(|g| *g != UNKNOWN_GENERATION)
            .cloned()
            .collect();
        generations.sort();
        if catalog.formats_by_gen.contains_key(UNKNOWN_GENERATION) {
            generations.push(UNKNOWN_GENERATION.to_string());
        }
        catalog.generations = generations;
        catalog
    }
}

/// Numeric ratings ascending, anything else after them
fn rating_sort_key(rating: &str) -> (u64, String) {
    (rating.parse().unwrap_or(u64::MAX), rating.to_string())
}

fn dedup(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

/// Read-only lookup tables over the known formats
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    generations: Vec<String>,
    formats_by_gen: HashMap<String, Vec<String>>,
    ratings: HashMap<GenFormat, Vec<String>>,
    pokemon: HashMap<GenFormatRating, Vec<String>>,
    format_keys: HashMap<GenFormat, String>,
}

impl Catalog {
    /// Generations sorted, `unknown` last
    pub fn generations(&self) -> &[String] {
        &self.generations
    }

    pub fn formats(&self, generation: &str) -> &[String] {
        self.formats_by_gen
            .get(generation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ratings ascending with `all` first; empty for an unknown format
    pub fn ratings(&self, generation: &str, format: &str) -> &[String] {
        self.ratings
            .get(&(generation.to_string(), format.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Stored ratings only, without the synthetic `all`
    pub fn real_ratings(&self, generation: &str, format: &str) -> &[String] {
        self.ratings(generation, format).get(1..).unwrap_or(&[])
    }

    pub fn pokemon(&self, generation: &str, format: &str, rating: &str) -> &[String] {
        self.pokemon
            .get(&(
                generation.to_string(),
                format.to_string(),
                rating.to_string(),
            ))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Original store key of a (generation, format) pair
    pub fn format_key(&self, generation: &str, format: &str) -> Option<&str> {
        self.format_keys
            .get(&(generation.to_string(), format.to_string()))
            .map(String::as_str)
    }

    pub fn has_generation(&self, generation: &str) -> bool {
        self.formats_by_gen.contains_key(generation)
    }

    pub fn has_format(&self, generation: &str, format: &str) -> bool {
        self.format_key(generation, format).is_some()
    }

    pub fn format_count(&self) -> usize {
        self.format_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.format_keys.is_empty()
    }
}
