//! # moveset-core
//!
//! Core library for the moveset statistics tools.
//!
//! This crate provides:
//! - Parsing of Smogon moveset reports into typed records
//! - The browsing catalog (generation, format, rating, pokemon) and autocomplete
//! - Access to the hierarchical document store, with a local-file fallback
//! - "All ratings" aggregation and the cached query service
//! - Report scraping and upload

pub mod aggregate;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ingest;
pub mod network;
pub mod parser;
pub mod record;
pub mod service;
pub mod store;

#[cfg(test)]
mod testing;

pub use aggregate::{AggregationEngine, combine_records};
pub use cache::{CacheState, QueryCache};
pub use catalog::{
    ALL_RATINGS, Catalog, CatalogBuilder, MAX_CHOICES, filter_choices, resolve_name,
    split_format_key,
};
pub use config::{Config, CounterPolicy, default_index_url, default_stats_month};
pub use error::{Error, Result};
pub use ingest::{ReportFile, ReportSet, ScrapeSummary, Scraper, UploadSummary, Uploader};
pub use network::HttpClient;
pub use parser::{parse_report, parse_report_checked};
pub use record::{
    CounterEntry, MISSING_SCORE, PokemonRecord, Section, SectionName, Sections, UsageEntry,
    UsageRow,
};
pub use service::MovesetService;
pub use store::{HttpStore, LocalStore, RemoteStore, StorePath, sanitize_key};
