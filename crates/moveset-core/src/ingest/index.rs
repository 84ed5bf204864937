//! Report discovery on the stats index page.

use std::collections::BTreeSet;

const HREF: &str = "href=\"";
const TXT: &str = ".txt";

/// One `<format key>-<rating>.txt` report
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReportFile {
    pub file_name: String,
    pub format_key: String,
    pub rating: String,
}

impl ReportFile {
    /// Split a file name of the form `<format key>-<digits>.txt`
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = strip_suffix_ignore_case(file_name, TXT)?;
        let (format_key, rating) = stem.rsplit_once('-')?;
        if format_key.is_empty() || rating.is_empty() || !rating.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        Some(Self {
            file_name: file_name.to_string(),
            format_key: format_key.to_string(),
            rating: rating.to_string(),
        })
    }
}

/// Result of scanning an index page
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReportListing {
    pub files: Vec<ReportFile>,
    /// `.txt` links whose name does not follow the report naming rule
    pub skipped: Vec<String>,
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    if !s.is_char_boundary(split) || !s[split..].eq_ignore_ascii_case(suffix) {
        return None;
    }
    Some(&s[..split])
}

/// Collect `.txt` link targets (case-insensitive), reduced to their file
/// name, deduplicated and sorted. Compressed `.txt.gz` links never match.
pub fn txt_links(html: &str) -> Vec<String> {
    // ASCII lowercasing keeps byte offsets aligned with the original
    let lowered = html.to_ascii_lowercase();
    let mut names = BTreeSet::new();
    let mut cursor = 0;

    while let Some(found) = lowered[cursor..].find(HREF) {
        let start = cursor + found + HREF.len();
        let Some(len) = html[start..].find('"') else {
            break;
        };
        let href = &html[start..start + len];
        cursor = start + len + 1;

        if strip_suffix_ignore_case(href, TXT).is_none() {
            continue;
        }
        let file_name = href.rsplit('/').next().unwrap_or(href);
        if !file_name.is_empty() {
            names.insert(file_name.to_string());
        }
    }
    names.into_iter().collect()
}

pub fn list_report_files(html: &str) -> ReportListing {
    let mut listing = ReportListing::default();
    for name in txt_links(html) {
        match ReportFile::parse(&name) {
            Some(file) => listing.files.push(file),
            None => listing.skipped.push(name),
        }
    }
    listing
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX_HTML: &str = r#"<html><body><pre>
<a href="../">../</a>
<a href="gen9ou-0.txt">gen9ou-0.txt</a>
<a href="gen9ou-0.txt.gz">gen9ou-0.txt.gz</a>
<a HREF="gen9ou-1760.TXT">gen9ou-1760.TXT</a>
<a href="/stats/2025-11/moveset/gen1ou-1500.txt">gen1ou-1500.txt</a>
<a href="gen9ou-0.txt">duplicate</a>
<a href="readme.txt">readme.txt</a>
<a href="gen9doublesou-abc.txt">bad rating</a>
<a href="chaos/">chaos/</a>
</pre></body></html>"#;

    #[test]
    fn test_report_file_parse() {
        let file = ReportFile::parse("gen9ou-1760.txt").unwrap();
        assert_eq!(file.format_key, "gen9ou");
        assert_eq!(file.rating, "1760");

        let file = ReportFile::parse("gen8battlestadium-singles-1500.txt").unwrap();
        assert_eq!(file.format_key, "gen8battlestadium-singles");

        assert!(ReportFile::parse("gen9ou.txt").is_none());
        assert!(ReportFile::parse("-0.txt").is_none());
        assert!(ReportFile::parse("gen9ou-0.txt.gz").is_none());
        assert!(ReportFile::parse("gen9ou-x1.txt").is_none());
    }

    #[test]
    fn test_txt_links() {
        assert_eq!(
            txt_links(INDEX_HTML),
            vec![
                "gen1ou-1500.txt",
                "gen9doublesou-abc.txt",
                "gen9ou-0.txt",
                "gen9ou-1760.TXT",
                "readme.txt",
            ]
        );
    }

    #[test]
    fn test_list_report_files() {
        let listing = list_report_files(INDEX_HTML);
        let keys: Vec<(&str, &str)> = listing
            .files
            .iter()
            .map(|f| (f.format_key.as_str(), f.rating.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("gen1ou", "1500"), ("gen9ou", "0"), ("gen9ou", "1760")]
        );
        assert_eq!(listing.skipped, vec!["gen9doublesou-abc.txt", "readme.txt"]);
    }

    #[test]
    fn test_empty_page() {
        assert_eq!(list_report_files(""), ReportListing::default());
    }
}
