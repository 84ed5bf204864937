//! Show command: print one pokemon's statistics.

use std::sync::Arc;

use anyhow::Result;
use moveset_core::{Config, PokemonRecord, RemoteStore, SectionName};
use owo_colors::OwoColorize;

use super::ready_service;

pub struct ShowQuery<'a> {
    pub generation: &'a str,
    pub format: &'a str,
    pub rating: &'a str,
    pub pokemon: &'a str,
    pub top: usize,
    pub json: bool,
}

pub async fn run<S>(store: Arc<S>, config: &Config, query: &ShowQuery<'_>) -> Result<()>
where
    S: RemoteStore + 'static,
{
    let service = ready_service(store, config).await?;
    let record = service
        .get_record(query.generation, query.format, query.rating, query.pokemon)
        .await?;

    if query.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record, query.top);
    }
    Ok(())
}

fn print_record(record: &PokemonRecord, top: usize) {
    println!("{}", record.name.bold());
    if let Some(count) = record.raw_count {
        println!("Raw count: {}", count);
    }
    if let Some(weight) = record.avg_weight {
        println!("Avg. weight: {}", weight);
    }
    if let Some(ceiling) = record.viability_ceiling {
        println!("Viability ceiling: {}", ceiling);
    }
    if let Some(info) = &record.info {
        println!("{}", info.dimmed());
    }

    for section in SectionName::USAGE {
        let entries = record.top_usage(section, top);
        if entries.is_empty() {
            continue;
        }
        println!();
        println!("{}", section.as_str().cyan());
        for entry in entries {
            println!("  {:<32} {:>8.3}%", entry.name, entry.percentage);
        }
    }

    let counters = record.top_counters(top);
    if !counters.is_empty() {
        println!();
        println!("{}", SectionName::ChecksAndCounters.as_str().cyan());
        for counter in counters {
            println!("  {:<32} {:>8.3}", counter.label(), counter.score);
            if let Some(detail) = &counter.detail {
                println!("    {}", detail.dimmed());
            }
        }
    }
}
