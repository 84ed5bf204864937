//! Composite "all ratings" records.
//!
//! Percentages are averaged per entry name, weighted by each rating's
//! sample count. Counter rows are combined according to a
//! [`CounterPolicy`].

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::CounterPolicy;
use crate::error::{Error, Result};
use crate::record::{
    CounterEntry, MISSING_SCORE, PokemonRecord, Section, SectionName, UsageEntry, UsageRow,
};
use crate::store::{RemoteStore, StorePath, fetch_record};

/// One per-rating record taking part in a composite
pub type Contributor = (String, PokemonRecord);

pub struct AggregationEngine<S> {
    store: Arc<S>,
    root: String,
    concurrency: usize,
    policy: CounterPolicy,
}

impl<S: RemoteStore> AggregationEngine<S> {
    pub fn new(store: Arc<S>, root: impl Into<String>) -> Self {
        Self {
            store,
            root: root.into(),
            concurrency: 5,
            policy: CounterPolicy::default(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_policy(mut self, policy: CounterPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Combine every stored rating of `pokemon` in (generation, format).
    ///
    /// Fails with [`Error::UnknownFormat`] when the format has no ratings and
    /// with [`Error::NotFound`] when none of its ratings holds the pokemon.
    pub async fn aggregate(
        &self,
        catalog: &Catalog,
        generation: &str,
        format: &str,
        pokemon: &str,
    ) -> Result<PokemonRecord> {
        let unknown = || Error::UnknownFormat {
            generation: generation.to_string(),
            format: format.to_string(),
        };
        let ratings = catalog.real_ratings(generation, format);
        let format_key = catalog.format_key(generation, format).ok_or_else(unknown)?;
        if ratings.is_empty() {
            return Err(unknown());
        }

        let paths = ratings
            .iter()
            .map(|rating| {
                StorePath::record(&self.root, format_key, rating, pokemon)
                    .map(|path| (rating.clone(), path))
            })
            .collect::<Result<Vec<_>>>()?;

        let store = &*self.store;
        let mut contributors: Vec<Contributor> = stream::iter(paths)
            .map(|(rating, path)| async move {
                let record = fetch_record(store, &path).await;
                if record.is_none() {
                    debug!("{} absent, skipped", path);
                }
                record.map(|record| (rating, record))
            })
            .buffer_unordered(self.concurrency)
            .filter_map(|found| async move { found })
            .collect()
            .await;

        if contributors.is_empty() {
            return Err(Error::NotFound(format!(
                "{} in any rating of {}{}",
                pokemon, generation, format
            )));
        }
        contributors.sort_by_cached_key(|(rating, _)| rating_order(rating));

        let mut composite = combine_records(&contributors, self.policy);
        composite.name = pokemon.to_string();
        info!(
            "Aggregated {} over {}/{} ratings of {}",
            pokemon,
            contributors.len(),
            ratings.len(),
            format_key
        );
        Ok(composite)
    }
}

fn rating_order(rating: &str) -> (u64, String) {
    (rating.parse().unwrap_or(u64::MAX), rating.to_string())
}

/// Weight of each contributor: its sample count when every contributor
/// reports one, otherwise 1 for all.
fn weights(contributors: &[Contributor]) -> Vec<f64> {
    let counts: Option<Vec<u64>> = contributors
        .iter()
        .map(|(_, record)| record.raw_count.filter(|&count| count > 0))
        .collect();
    match counts {
        Some(counts) => counts.into_iter().map(|count| count as f64).collect(),
        None => vec![1.0; contributors.len()],
    }
}

/// Build the composite of already fetched per-rating records, given in
/// ascending rating order.
pub fn combine_records(contributors: &[Contributor], policy: CounterPolicy) -> PokemonRecord {
    let weights = weights(contributors);
    let total_weight: f64 = weights.iter().sum();

    let mut composite = PokemonRecord::default();
    if let Some((_, first)) = contributors.first() {
        composite.name = first.name.clone();
    }

    for name in SectionName::USAGE {
        let entries = average_usage(contributors, &weights, total_weight, name);
        composite.sections.insert(name, Section::Usage(entries));
    }

    let counters = match policy {
        CounterPolicy::Weighted => weighted_counters(contributors, &weights),
        CounterPolicy::HighestRating => contributors
            .last()
            .map(|(_, record)| record.counters().to_vec())
            .unwrap_or_default(),
    };
    composite
        .sections
        .insert(SectionName::ChecksAndCounters, Section::Counters(counters));

    let counts: Vec<u64> = contributors
        .iter()
        .filter_map(|(_, record)| record.raw_count)
        .collect();
    composite.raw_count = (!counts.is_empty()).then(|| counts.iter().sum());
    composite.viability_ceiling = contributors
        .iter()
        .filter_map(|(_, record)| record.viability_ceiling)
        .max();

    let ratings: Vec<&str> = contributors.iter().map(|(r, _)| r.as_str()).collect();
    composite.info = Some(format!(
        "Average of {} rating{} ({})",
        ratings.len(),
        if ratings.len() == 1 { "" } else { "s" },
        ratings.join(", ")
    ));
    composite
}

/// Weighted mean per entry name. A record without the entry counts as 0%.
fn average_usage(
    contributors: &[Contributor],
    weights: &[f64],
    total_weight: f64,
    section: SectionName,
) -> Vec<UsageRow> {
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, f64> = HashMap::new();

    for ((_, record), weight) in contributors.iter().zip(weights) {
        for entry in record.usage(section) {
            let sum = sums.entry(entry.name.clone()).or_insert_with(|| {
                order.push(entry.name.clone());
                0.0
            });
            *sum += entry.percentage * weight;
        }
    }
    if total_weight <= 0.0 {
        return Vec::new();
    }

    let mut averaged: Vec<UsageEntry> = order
        .into_iter()
        .map(|name| {
            let sum = sums.get(&name).copied().unwrap_or_default();
            UsageEntry::new(name, sum / total_weight)
        })
        .collect();
    averaged.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
    averaged.into_iter().map(UsageRow::Ranked).collect()
}

struct CounterAcc {
    template: CounterEntry,
    template_weight: f64,
    weighted_sum: f64,
    weight: f64,
}

/// Score average per opponent over the records that rate it. The raw line
/// and detail come from the heaviest record listing the opponent.
fn weighted_counters(contributors: &[Contributor], weights: &[f64]) -> Vec<CounterEntry> {
    let mut order: Vec<String> = Vec::new();
    let mut accs: HashMap<String, CounterAcc> = HashMap::new();

    for ((_, record), &weight) in contributors.iter().zip(weights) {
        for entry in record.counters() {
            let label = entry.label().to_string();
            let acc = accs.entry(label.clone()).or_insert_with(|| {
                order.push(label);
                CounterAcc {
                    template: entry.clone(),
                    template_weight: weight,
                    weighted_sum: 0.0,
                    weight: 0.0,
                }
            });
            if weight > acc.template_weight {
                acc.template = entry.clone();
                acc.template_weight = weight;
            }
            if entry.score >= 0.0 {
                acc.weighted_sum += entry.score * weight;
                acc.weight += weight;
            }
        }
    }

    let mut combined: Vec<CounterEntry> = order
        .into_iter()
        .filter_map(|label| accs.remove(&label))
        .map(|acc| {
            let mut entry = acc.template;
            entry.score = if acc.weight > 0.0 {
                acc.weighted_sum / acc.weight
            } else {
                MISSING_SCORE
            };
            entry
        })
        .collect();
    combined.sort_by(|a, b| b.score.total_cmp(&a.score));
    combined
}
