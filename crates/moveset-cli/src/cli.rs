use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "moveset")]
#[command(about = "Smogon moveset statistics: scrape, upload and query")]
#[command(version)]
pub struct Args {
    /// Config file (default: <config dir>/moveset/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the remote document store
    #[arg(long, env = "MOVESET_STORE_URL", global = true)]
    pub store_url: Option<String>,

    /// Local catalog file used when the store is unreachable
    #[arg(long, env = "MOVESET_FALLBACK", global = true)]
    pub fallback: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Download and parse every moveset report of a month
    Scrape {
        /// Stats month (YYYY-MM), defaults to last month
        #[arg(short, long)]
        month: Option<String>,

        /// Index page listing the reports (overrides --month)
        #[arg(long)]
        index_url: Option<String>,

        /// Output catalog file
        #[arg(short, long, default_value = "moveset_catalog.json")]
        output: PathBuf,
    },

    /// Upload a scraped catalog file to the remote store
    Upload {
        /// Catalog file written by `scrape`
        #[arg(short, long, default_value = "moveset_catalog.json")]
        input: PathBuf,
    },

    /// Crawl the store and summarize the catalog
    Catalog,

    /// Show one pokemon's statistics (rating `all` averages every rating)
    Show {
        generation: String,
        format: String,
        rating: String,
        pokemon: String,

        /// Entries per section
        #[arg(short = 'n', long, default_value_t = 10)]
        top: usize,

        /// Print the full record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Autocomplete the next level: generations, formats, ratings or pokemon
    Complete {
        generation: Option<String>,
        format: Option<String>,
        rating: Option<String>,

        /// Text typed so far
        #[arg(short, long, default_value = "")]
        query: String,
    },
}
