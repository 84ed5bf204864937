//! Catalog command: crawl the store and print what is available.

use std::sync::Arc;

use anyhow::Result;
use moveset_core::{Config, RemoteStore};
use owo_colors::OwoColorize;

use super::ready_service;

pub async fn run<S>(store: Arc<S>, config: &Config) -> Result<()>
where
    S: RemoteStore + 'static,
{
    let service = ready_service(store, config).await?;

    let generations = service.list_generations();
    if generations.is_empty() {
        println!("The catalog is empty.");
        return Ok(());
    }

    for generation in generations {
        println!("{}", generation.bold());
        for format in service.list_formats(generation) {
            let ratings = service.list_ratings(generation, format);
            let pokemon = service.list_pokemon(generation, format, moveset_core::ALL_RATINGS);
            println!(
                "  {:<24} {:>4} pokemon  ratings: {}",
                format,
                pokemon.len(),
                ratings.join(", ").dimmed()
            );
        }
    }
    Ok(())
}
