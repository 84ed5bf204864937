mod cli;
mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use moveset_core::Config;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, Command};
use crate::commands::Backend;

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("moveset").join("config.toml"))
}

/// Config file values, then command-line and environment overrides
fn load_config(args: &Args) -> Config {
    let path = args.config.clone().or_else(default_config_path);
    let mut config = match &path {
        Some(path) if args.config.is_some() || path.exists() => match Config::load(path) {
            Ok(c) => {
                info!("Loaded config from {:?}", path);
                c
            }
            Err(e) => {
                warn!("Failed to load config {:?}: {}, using defaults", path, e);
                Config::default()
            }
        },
        _ => Config::default(),
    };

    if let Some(url) = &args.store_url {
        config.store_url = Some(url.clone());
    }
    if let Some(path) = &args.fallback {
        config.fallback_path = Some(path.clone());
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output can be piped
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("moveset=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args);

    match args.command {
        Command::Scrape {
            month,
            index_url,
            output,
        } => commands::scrape::run(&config, month.as_deref(), index_url.as_deref(), &output).await,
        Command::Upload { input } => commands::upload::run(&config, &input).await,
        Command::Catalog => match commands::open_backend(&config)? {
            Backend::Remote(store) => commands::catalog::run(store, &config).await,
            Backend::Local(store) => commands::catalog::run(store, &config).await,
        },
        Command::Show {
            generation,
            format,
            rating,
            pokemon,
            top,
            json,
        } => {
            let query = commands::show::ShowQuery {
                generation: &generation,
                format: &format,
                rating: &rating,
                pokemon: &pokemon,
                top,
                json,
            };
            match commands::open_backend(&config)? {
                Backend::Remote(store) => commands::show::run(store, &config, &query).await,
                Backend::Local(store) => commands::show::run(store, &config, &query).await,
            }
        }
        Command::Complete {
            generation,
            format,
            rating,
            query,
        } => {
            let levels = [generation, format, rating];
            let levels: Vec<&str> = levels.iter().flatten().map(String::as_str).collect();
            match commands::open_backend(&config)? {
                Backend::Remote(store) => {
                    commands::complete::run(store, &config, &levels, &query).await
                }
                Backend::Local(store) => {
                    commands::complete::run(store, &config, &levels, &query).await
                }
            }
        }
    }
}
