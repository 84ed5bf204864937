use serde::{Deserialize, Serialize};

/// Score assigned to counter rows whose line carries no `<float> (` token
pub const MISSING_SCORE: f64 = -1.0;

/// One percentage-ranked row (move, ability, item, spread, tera type, teammate)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEntry {
    pub name: String,
    #[serde(rename = "pct")]
    pub percentage: f64,
}

impl UsageEntry {
    pub fn new(name: impl Into<String>, percentage: f64) -> Self {
        Self {
            name: name.into(),
            percentage,
        }
    }
}

/// A row of a usage section: either a ranked entry or the original cell text
/// when the row did not end in a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UsageRow {
    Ranked(UsageEntry),
    Raw { raw: String },
}

impl UsageRow {
    /// Parse a cleaned cell of the form `<name><whitespace><float>%`.
    /// Anything else is preserved verbatim.
    pub fn parse(cell: &str) -> Self {
        match parse_percent_cell(cell) {
            Some(entry) => UsageRow::Ranked(entry),
            None => UsageRow::Raw {
                raw: cell.to_string(),
            },
        }
    }

    pub fn as_entry(&self) -> Option<&UsageEntry> {
        match self {
            UsageRow::Ranked(entry) => Some(entry),
            UsageRow::Raw { .. } => None,
        }
    }
}

fn parse_percent_cell(cell: &str) -> Option<UsageEntry> {
    let body = cell.strip_suffix('%')?;
    let split = body.rfind(char::is_whitespace)?;
    let number = body[split..].trim_start();
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let percentage: f64 = number.parse().ok()?;
    let name = body[..split].trim();
    if name.is_empty() {
        return None;
    }
    Some(UsageEntry::new(name, percentage))
}

/// One row of the "Checks and Counters" table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredCounterEntry")]
pub struct CounterEntry {
    pub opponent: Option<String>,
    #[serde(rename = "raw")]
    pub raw_line: String,
    pub score: f64,
    pub detail: Option<String>,
}

/// Stored shape; records written before scores were kept carry no `score`.
#[derive(Deserialize)]
struct StoredCounterEntry {
    #[serde(default)]
    opponent: Option<String>,
    #[serde(default)]
    raw: String,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    detail: Option<String>,
}

impl From<StoredCounterEntry> for CounterEntry {
    fn from(stored: StoredCounterEntry) -> Self {
        let score = stored
            .score
            .unwrap_or_else(|| locate_score(&stored.raw).map_or(MISSING_SCORE, |(_, s)| s));
        Self {
            opponent: stored.opponent,
            raw_line: stored.raw,
            score,
            detail: stored.detail,
        }
    }
}

impl CounterEntry {
    /// Parse a counter row. The opponent is the text before the first
    /// `<float> (` token and the float is the score.
    pub fn parse(cell: &str) -> Self {
        let (opponent, score) = match locate_score(cell) {
            Some((start, score)) => {
                let name = cell[..start].trim();
                ((!name.is_empty()).then(|| name.to_string()), score)
            }
            None => (None, MISSING_SCORE),
        };
        Self {
            opponent,
            raw_line: cell.to_string(),
            score,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Opponent name, falling back to the raw line
    pub fn label(&self) -> &str {
        self.opponent.as_deref().unwrap_or(&self.raw_line)
    }
}

/// Find a whitespace-preceded number followed by optional spaces and `(`.
/// Returns the byte offset of the number and its value.
fn locate_score(line: &str) -> Option<(usize, f64)> {
    let bytes = line.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if !(bytes[i].is_ascii_digit() && bytes[i - 1].is_ascii_whitespace()) {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = i;
        while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
            end += 1;
        }
        if line[end..].trim_start().starts_with('(')
            && let Ok(score) = line[start..end].parse::<f64>()
        {
            return Some((start, score));
        }
        i = end;
    }
    None
}
