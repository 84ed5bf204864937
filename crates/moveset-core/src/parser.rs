//! Smogon moveset report parser.
//!
//! Reports are monospaced ASCII tables: `+----+` border lines and
//! `| cell |` rows. Column widths differ between reports, so parsing only
//! looks at cell content after stripping pipes and whitespace.
//!
//! A pokemon header is a border / single-cell row / border triplet whose
//! cell is not a section title, metadata or a percentage row. Everything
//! from one header to the next belongs to that pokemon.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::record::{CounterEntry, PokemonRecord, Section, SectionName, UsageRow};

const BOM: char = '\u{feff}';

const RAW_COUNT: &str = "Raw count";
const AVG_WEIGHT: &str = "Avg. weight";
const VIABILITY_CEILING: &str = "Viability Ceiling";

/// `Key: value` cell whose key is one of the metadata fields
fn metadata_key(cell: &str) -> Option<(&str, &str)> {
    let (key, value) = cell.split_once(':')?;
    let key = key.trim();
    [RAW_COUNT, AVG_WEIGHT, VIABILITY_CEILING]
        .contains(&key)
        .then(|| (key, value.trim()))
}

/// Split text into trimmed, non-blank lines.
///
/// Handles `\n`, `\r\n` and bare `\r` line endings and strips a leading
/// byte-order mark.
pub fn normalize_lines(text: &str) -> Vec<&str> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Strip surrounding pipes and whitespace from a table row
pub fn clean_cell(line: &str) -> &str {
    line.trim().trim_matches('|').trim()
}

pub fn is_border(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 3
        && line.starts_with('+')
        && line.ends_with('+')
        && line[1..line.len() - 1].bytes().all(|b| b == b'-')
}

pub fn is_row(line: &str) -> bool {
    line.starts_with('|') && line.ends_with('|')
}

fn header_name(lines: &[&str], i: usize) -> Option<String> {
    if i + 2 >= lines.len() {
        return None;
    }
    if !is_border(lines[i]) || !is_row(lines[i + 1]) || !is_border(lines[i + 2]) {
        return None;
    }
    let name = clean_cell(lines[i + 1]);
    if name.is_empty() || metadata_key(name).is_some() || SectionName::from_cell(name).is_some() {
        return None;
    }
    // A one-row section boxed by borders looks like a header
    if UsageRow::parse(name).as_entry().is_some() {
        return None;
    }
    Some(name.to_string())
}

/// Locate every pokemon header, in document order
pub fn find_headers(lines: &[&str]) -> Vec<(usize, String)> {
    (0..lines.len())
        .filter_map(|i| header_name(lines, i).map(|name| (i, name)))
        .collect()
}

/// Parse the lines owned by one header into a record.
///
/// Best effort: a row that does not fit its section is kept raw or skipped,
/// it never aborts the block.
pub fn parse_block(name: &str, lines: &[&str]) -> PokemonRecord {
    let mut record = PokemonRecord::new(name);
    let mut sections: BTreeMap<SectionName, Section> = BTreeMap::new();
    let mut current: Option<SectionName> = None;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        i += 1;
        if !is_row(line) {
            continue;
        }
        let cell = clean_cell(line);
        if cell.is_empty() {
            continue;
        }

        if let Some(section) = SectionName::from_cell(cell) {
            current = Some(section);
            sections
                .entry(section)
                .or_insert_with(|| Section::empty_for(section));
            continue;
        }

        if apply_metadata(&mut record, cell) {
            continue;
        }

        let Some(section) = current else {
            continue;
        };
        match sections
            .entry(section)
            .or_insert_with(|| Section::empty_for(section))
        {
            Section::Usage(rows) => rows.push(UsageRow::parse(cell)),
            Section::Counters(rows) => {
                let mut entry = CounterEntry::parse(cell);
                if let Some(next) = lines.get(i)
                    && is_row(next)
                {
                    let next_cell = clean_cell(next);
                    if next_cell.starts_with('(') {
                        entry = entry.with_detail(next_cell);
                        i += 1;
                    }
                }
                rows.push(entry);
            }
        }
    }

    for (name, section) in sections {
        record.sections.insert(name, section);
    }
    record
}

/// Handle `Raw count:`, `Avg. weight:` and `Viability Ceiling:` rows.
/// Returns true when the cell was a metadata row, even if its value
/// could not be read.
fn apply_metadata(record: &mut PokemonRecord, cell: &str) -> bool {
    let Some((key, value)) = metadata_key(cell) else {
        return false;
    };
    match key {
        RAW_COUNT => record.raw_count = value.replace(',', "").parse().ok(),
        AVG_WEIGHT => record.avg_weight = value.parse().ok(),
        _ => record.viability_ceiling = value.replace(',', "").parse().ok(),
    }
    true
}

/// Parse a whole report into records, in document order.
///
/// Text without any header yields no records.
pub fn parse_report(text: &str) -> Vec<PokemonRecord> {
    let lines = normalize_lines(text);
    let headers = find_headers(&lines);
    debug!("Found {} pokemon headers in {} lines", headers.len(), lines.len());

    headers
        .iter()
        .enumerate()
        .map(|(idx, (start, name))| {
            let end = headers.get(idx + 1).map_or(lines.len(), |(next, _)| *next);
            parse_block(name, &lines[*start..end])
        })
        .collect()
}

/// Like [`parse_report`], but a report with no recognizable header is an
/// error naming the source.
pub fn parse_report_checked(source_name: &str, text: &str) -> Result<Vec<PokemonRecord>> {
    let records = parse_report(text);
    if records.is_empty() {
        return Err(Error::malformed(source_name, "no pokemon header found"));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::UsageEntry;

    const TAUROS_REPORT: &str = "\u{feff} +----------------------------------------+ \r
 | Tauros                                 | \r
 +----------------------------------------+ \r
 | Raw count: 1,234                       | \r
 | Avg. weight: 0.56                      | \r
 | Viability Ceiling: 87                  | \r
 +----------------------------------------+ \r
 | Moves                                  | \r
 | Earthquake  45.23%                     | \r
 | Rock Slide  30.00%                     | \r
 +----------------------------------------+ \r
";

    const TWO_POKEMON_REPORT: &str = "
 +----------------------------------------+
 |   Snorlax   |
 +----------------------------------------+
 | Raw count: 500                         |
 +----------------------------------------+
 | Abilities                              |
 | Thick Fat 80.000%                      |
 | Immunity 20.000%                       |
 +----------------------------------------+
 | Items                                  |
 +----------------------------------------+
 | Tera Types                             |
 +----------------------------------------+
 | Normal 100.000%                        |
 +----------------------------------------+
 | Checks and Counters                    |
 | Zapdos 55.123 (60.00±1.22)             |
 |	 (20.3% KOed / 35.0% switched out)     |
 | Chansey 48.000 (52.10±1.00)            |
 | Exeggutor 41.0 (45.0±2.0)              |
 |	 (10.0% KOed / 31.0% switched out)     |
 +----------------------------------------+
 +----------------------------------------+
 | Mr. Mime                               |
 +----------------------------------------+
 | Raw count: 12                          |
 +----------------------------------------+
 | Moves                                  |
 | Psychic 99.000%                        |
 | Other                                  |
 +----------------------------------------+
";

    #[test]
    fn test_tauros_scenario() {
        let records = parse_report(TAUROS_REPORT);
        assert_eq!(records.len(), 1);

        let tauros = &records[0];
        assert_eq!(tauros.name, "Tauros");
        assert_eq!(tauros.raw_count, Some(1234));
        assert_eq!(tauros.avg_weight, Some(0.56));
        assert_eq!(tauros.viability_ceiling, Some(87));
        assert_eq!(tauros.sections.len(), 1);
        assert_eq!(
            tauros.sections.get(SectionName::Moves),
            Some(&Section::Usage(vec![
                UsageRow::Ranked(UsageEntry::new("Earthquake", 45.23)),
                UsageRow::Ranked(UsageEntry::new("Rock Slide", 30.00)),
            ]))
        );
    }

    #[test]
    fn test_header_name_is_trimmed() {
        let records = parse_report(TWO_POKEMON_REPORT);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Snorlax", "Mr. Mime"]);
    }

    #[test]
    fn test_boxed_single_row_is_not_a_header() {
        let records = parse_report(TWO_POKEMON_REPORT);
        let snorlax = &records[0];
        assert_eq!(
            snorlax.usage(SectionName::TeraTypes).collect::<Vec<_>>(),
            vec![&UsageEntry::new("Normal", 100.0)]
        );
    }

    #[test]
    fn test_sections_never_empty() {
        for record in parse_report(TWO_POKEMON_REPORT) {
            assert!(!record.sections.contains(SectionName::Items));
            for (_, section) in record.sections.iter() {
                assert!(!section.is_empty());
            }
        }
    }

    #[test]
    fn test_counters_consume_detail_rows() {
        let records = parse_report(TWO_POKEMON_REPORT);
        let counters = records[0].counters();
        assert_eq!(counters.len(), 3);

        assert_eq!(counters[0].opponent.as_deref(), Some("Zapdos"));
        assert_eq!(
            counters[0].detail.as_deref(),
            Some("(20.3% KOed / 35.0% switched out)")
        );
        assert_eq!(counters[1].opponent.as_deref(), Some("Chansey"));
        assert!(counters[1].detail.is_none());
        assert!((counters[2].score - 41.0).abs() < 1e-9);
        assert!(counters[2].detail.is_some());
    }

    #[test]
    fn test_unparsed_usage_row_is_preserved() {
        let records = parse_report(TWO_POKEMON_REPORT);
        let mime = &records[1];
        match mime.sections.get(SectionName::Moves) {
            Some(Section::Usage(rows)) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(
                    rows[1],
                    UsageRow::Raw {
                        raw: "Other".to_string()
                    }
                );
            }
            other => panic!("unexpected section: {:?}", other),
        }
    }

    #[test]
    fn test_percentages_survive_reserialization() {
        let expected = [("Thick Fat", 80.0), ("Immunity", 20.0)];
        let records = parse_report(TWO_POKEMON_REPORT);
        let json = serde_json::to_string(&records[0]).unwrap();
        let back: PokemonRecord = serde_json::from_str(&json).unwrap();

        let mut pairs: Vec<(String, f64)> = back
            .usage(SectionName::Abilities)
            .map(|e| (e.name.clone(), e.percentage))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        let mut expected: Vec<(String, f64)> =
            expected.iter().map(|(n, p)| (n.to_string(), *p)).collect();
        expected.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(pairs.len(), expected.len());
        for ((name, pct), (exp_name, exp_pct)) in pairs.iter().zip(&expected) {
            assert_eq!(name, exp_name);
            assert!((pct - exp_pct).abs() < 1e-6);
        }
    }

    #[test]
    fn test_malformed_metadata_keeps_block() {
        let text = "+---+\n| Ditto |\n+---+\n| Raw count: lots |\n| Moves |\n| Transform 100.0% |\n+---+\n";
        let records = parse_report(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].raw_count, None);
        assert_eq!(records[0].usage(SectionName::Moves).count(), 1);
    }

    #[test]
    fn test_colon_in_pokemon_name_starts_new_block() {
        let text = "+---+\n| Tauros |\n+---+\n| Raw count: 1234 |\n+---+\n| Moves |\n| Earthquake 45.0% |\n+---+\n\
+---+\n| Type: Null |\n+---+\n| Raw count: 7 |\n+---+\n| Moves |\n| U-turn 80.0% |\n+---+\n";
        let records = parse_report(text);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Tauros", "Type: Null"]);
        assert_eq!(records[0].raw_count, Some(1234));
        let moves: Vec<&str> = records[0]
            .usage(SectionName::Moves)
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(moves, vec!["Earthquake"]);
        assert_eq!(records[1].raw_count, Some(7));
    }

    #[test]
    fn test_no_headers_yields_nothing() {
        assert!(parse_report("<html>404 Not Found</html>").is_empty());
        assert!(parse_report("").is_empty());

        let err = parse_report_checked("gen9ou-0.txt", "garbage").unwrap_err();
        assert!(matches!(err, Error::MalformedSource { .. }));
    }

    #[test]
    fn test_is_border() {
        assert!(is_border("+----+"));
        assert!(is_border("  +-+  "));
        assert!(!is_border("++"));
        assert!(!is_border("+--x-+"));
        assert!(!is_border("| Moves |"));
    }
}
