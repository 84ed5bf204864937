//! Complete command: autocomplete the next catalog level.

use std::sync::Arc;

use anyhow::{Result, bail};
use moveset_core::{Config, RemoteStore};

use super::ready_service;

/// `levels` holds the generation, format and rating given so far
pub async fn run<S>(store: Arc<S>, config: &Config, levels: &[&str], query: &str) -> Result<()>
where
    S: RemoteStore + 'static,
{
    let service = ready_service(store, config).await?;

    let choices = match *levels {
        [] => service.autocomplete_generations(query),
        [generation] => service.autocomplete_formats(generation, query),
        [generation, format] => service.autocomplete_ratings(generation, format, query),
        [generation, format, rating] => {
            service.autocomplete_pokemon(generation, format, rating, query)
        }
        _ => bail!("At most generation, format and rating can be given"),
    };

    for choice in choices {
        println!("{}", choice);
    }
    Ok(())
}
