//! Moveset record types.
//!
//! A [`PokemonRecord`] holds everything one report says about one pokemon
//! for one (format, rating) pair: sample count metadata plus a set of
//! named [`Sections`]. Usage sections hold [`UsageRow`]s, the
//! "Checks and Counters" section holds [`CounterEntry`]s.

mod entry;
mod section;

pub use entry::{CounterEntry, MISSING_SCORE, UsageEntry, UsageRow};
pub use section::{Section, SectionName, Sections};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PokemonRecord {
    #[serde(default)]
    pub name: String,
    /// Number of samples; the weight used when combining ratings
    #[serde(default)]
    pub raw_count: Option<u64>,
    #[serde(default)]
    pub avg_weight: Option<f64>,
    #[serde(default)]
    pub viability_ceiling: Option<u32>,
    #[serde(default)]
    pub sections: Sections,
    /// Provenance note, only set on aggregated records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl PokemonRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Ranked entries of a usage section, in stored order
    pub fn usage(&self, name: SectionName) -> impl Iterator<Item = &UsageEntry> {
        let rows: &[UsageRow] = match self.sections.get(name) {
            Some(Section::Usage(rows)) => rows,
            _ => &[],
        };
        rows.iter().filter_map(UsageRow::as_entry)
    }

    pub fn counters(&self) -> &[CounterEntry] {
        match self.sections.get(SectionName::ChecksAndCounters) {
            Some(Section::Counters(rows)) => rows,
            _ => &[],
        }
    }

    /// Top `k` entries of a usage section by percentage, highest first
    pub fn top_usage(&self, name: SectionName, k: usize) -> Vec<&UsageEntry> {
        let mut entries: Vec<&UsageEntry> = self.usage(name).collect();
        entries.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
        entries.truncate(k);
        entries
    }

    /// Top `k` counter rows by score, highest first
    pub fn top_counters(&self, k: usize) -> Vec<&CounterEntry> {
        let mut entries: Vec<&CounterEntry> = self.counters().iter().collect();
        entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        entries.truncate(k);
        entries
    }
}
