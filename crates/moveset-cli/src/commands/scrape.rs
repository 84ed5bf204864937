//! Scrape command: download a month of moveset reports into a catalog file.

use std::path::Path;

use anyhow::{Context, Result, bail};
use moveset_core::Config;
use moveset_core::config::index_url_for_month;
use moveset_core::ingest::Scraper;

use super::http_client;

pub async fn run(
    config: &Config,
    month: Option<&str>,
    index_url: Option<&str>,
    output: &Path,
) -> Result<()> {
    let url = match (index_url, month) {
        (Some(url), _) => url.to_string(),
        (None, Some(month)) => index_url_for_month(month),
        (None, None) => config.index_url(),
    };
    eprintln!("Scraping reports from {}", url);

    let scraper = Scraper::new(http_client(config)?, &url, config.scrape_concurrency)
        .with_context(|| format!("Invalid index URL {:?}", url))?;
    let (reports, summary) = scraper.scrape().await;

    if reports.is_empty() {
        bail!("No reports could be scraped from {}", url);
    }

    reports
        .save(output)
        .with_context(|| format!("Failed to write {:?}", output))?;

    println!(
        "Scraped {} reports ({} skipped): {} formats, {} pokemon records -> {}",
        summary.processed,
        summary.skipped,
        reports.format_count(),
        reports.record_count(),
        output.display()
    );
    Ok(())
}
