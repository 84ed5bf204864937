use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::Result;

pub const DEFAULT_STORE_ROOT: &str = "pokemondata";
pub const STATS_BASE_URL: &str = "https://www.smogon.com/stats";

/// How "Checks and Counters" rows are combined across ratings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CounterPolicy {
    /// Weighted score average per opponent; detail from the heaviest record
    #[default]
    Weighted,
    /// Section taken verbatim from the highest numeric rating
    HighestRating,
}

/// Runtime settings, read from a TOML file. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store_url: Option<String>,
    pub store_root: String,
    pub index_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub crawl_concurrency: usize,
    pub query_concurrency: usize,
    pub scrape_concurrency: usize,
    pub fallback_path: Option<PathBuf>,
    pub counter_policy: CounterPolicy,
    pub upload_pause_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: None,
            store_root: DEFAULT_STORE_ROOT.to_string(),
            index_url: None,
            timeout_secs: 10,
            max_retries: 3,
            crawl_concurrency: 20,
            query_concurrency: 5,
            scrape_concurrency: 4,
            fallback_path: None,
            counter_policy: CounterPolicy::default(),
            upload_pause_ms: 500,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn upload_pause(&self) -> Duration {
        Duration::from_millis(self.upload_pause_ms)
    }

    /// Configured index URL, or the one for last month's reports
    pub fn index_url(&self) -> String {
        self.index_url.clone().unwrap_or_else(default_index_url)
    }
}

/// `YYYY-MM` of the month before `today`
pub fn previous_month(today: NaiveDate) -> String {
    let (year, month) = match today.month() {
        1 => (today.year() - 1, 12),
        m => (today.year(), m - 1),
    };
    format!("{:04}-{:02}", year, month)
}

/// Latest month with published reports
pub fn default_stats_month() -> String {
    previous_month(Local::now().date_naive())
}

pub fn index_url_for_month(month: &str) -> String {
    format!("{}/{}/moveset/", STATS_BASE_URL, month)
}

pub fn default_index_url() -> String {
    index_url_for_month(&default_stats_month())
}
