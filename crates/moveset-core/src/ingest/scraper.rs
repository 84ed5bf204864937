use futures::stream::{self, StreamExt};
use reqwest::Url;
use tracing::{error, info, warn};

use super::index::{ReportFile, ReportListing, list_report_files};
use super::report_set::ReportSet;
use crate::error::{Error, Result};
use crate::network::{HttpClient, parse_url};
use crate::parser::parse_report_checked;
use crate::record::PokemonRecord;

/// Outcome counts of one scrape run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub processed: usize,
    pub skipped: usize,
}

/// Downloads and parses every report linked from a stats index page
pub struct Scraper {
    client: HttpClient,
    index_url: Url,
    concurrency: usize,
}

impl Scraper {
    pub fn new(client: HttpClient, index_url: &str, concurrency: usize) -> Result<Self> {
        let mut index_url = parse_url(index_url)?;
        // Relative report links resolve against the directory
        if !index_url.path().ends_with('/') {
            let path = format!("{}/", index_url.path());
            index_url.set_path(&path);
        }
        Ok(Self {
            client,
            index_url,
            concurrency: concurrency.max(1),
        })
    }

    pub fn index_url(&self) -> &Url {
        &self.index_url
    }

    pub async fn list_files(&self) -> Result<ReportListing> {
        let html = self
            .client
            .get_text(&self.index_url)
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("{}: {}", self.index_url, e)))?;
        Ok(list_report_files(&html))
    }

    async fn fetch_report(&self, file: &ReportFile) -> Result<Vec<PokemonRecord>> {
        let url = self
            .index_url
            .join(&file.file_name)
            .map_err(|e| Error::InvalidInput(format!("{}: {}", file.file_name, e)))?;
        let text = self
            .client
            .get_text(&url)
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("{}: {}", url, e)))?;
        parse_report_checked(&file.file_name, &text)
    }

    /// Scrape every listed report. Failed reports are logged and skipped;
    /// an unreachable index yields an empty set.
    pub async fn scrape(&self) -> (ReportSet, ScrapeSummary) {
        let mut reports = ReportSet::new();
        let mut summary = ScrapeSummary::default();

        let listing = match self.list_files().await {
            Ok(listing) => listing,
            Err(e) => {
                error!("Cannot list reports: {}", e);
                return (reports, summary);
            }
        };
        info!(
            "Found {} report files ({} with unexpected names)",
            listing.files.len(),
            listing.skipped.len()
        );
        summary.skipped += listing.skipped.len();

        let results: Vec<(ReportFile, Result<Vec<PokemonRecord>>)> = stream::iter(listing.files)
            .map(|file| async move {
                let result = self.fetch_report(&file).await;
                (file, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (file, result) in results {
            match result {
                Ok(records) => {
                    info!(
                        "{} -> {}/{} ({} pokemon)",
                        file.file_name,
                        file.format_key,
                        file.rating,
                        records.len()
                    );
                    reports.insert(&file.format_key, &file.rating, records);
                    summary.processed += 1;
                }
                Err(e) => {
                    warn!("Skipping {}: {}", file.file_name, e);
                    summary.skipped += 1;
                }
            }
        }
        (reports, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client() -> HttpClient {
        HttpClient::new(Duration::from_secs(1), 1).unwrap()
    }

    #[test]
    fn test_index_url_gets_trailing_slash() {
        let scraper = Scraper::new(client(), "https://www.smogon.com/stats/2025-11/moveset", 4)
            .unwrap();
        assert_eq!(
            scraper.index_url().as_str(),
            "https://www.smogon.com/stats/2025-11/moveset/"
        );
        let url = scraper.index_url().join("gen9ou-0.txt").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.smogon.com/stats/2025-11/moveset/gen9ou-0.txt"
        );
    }

    const REPORT: &str = " +----------------------------------------+ 
 | Tauros                                 | 
 +----------------------------------------+ 
 | Raw count: 1234                        | 
 +----------------------------------------+ 
 | Moves                                  | 
 | Earthquake 45.230%                     | 
 | Rock Slide 30.000%                     | 
 +----------------------------------------+ 
";

    #[tokio::test]
    async fn test_bad_reports_skipped_batch_continues() {
        let index = r#"<a href="gen1ou-0.txt">gen1ou-0.txt</a>
<a href="gen1ou-1500.txt">gen1ou-1500.txt</a>
<a href="gen1ou-1760.txt">gen1ou-1760.txt</a>"#;
        let base = crate::testing::page_server(vec![
            ("/moveset/", index.to_string()),
            ("/moveset/gen1ou-0.txt", REPORT.to_string()),
            ("/moveset/gen1ou-1500.txt", "<html>maintenance</html>".to_string()),
        ])
        .await;

        let scraper = Scraper::new(client(), &format!("{}/moveset/", base), 2).unwrap();
        let (reports, summary) = scraper.scrape().await;

        assert_eq!(summary, ScrapeSummary { processed: 1, skipped: 2 });
        assert_eq!(reports.bucket_count(), 1);
        let records = reports.get("gen1ou", "0").unwrap();
        assert_eq!(records[0].name, "Tauros");
        assert_eq!(records[0].raw_count, Some(1234));
    }

    #[tokio::test]
    async fn test_unreachable_index_yields_empty_set() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let scraper = Scraper::new(client(), "http://127.0.0.1:9/moveset/", 2).unwrap();
        let (reports, summary) = scraper.scrape().await;
        assert!(reports.is_empty());
        assert_eq!(summary, ScrapeSummary::default());
    }
}
