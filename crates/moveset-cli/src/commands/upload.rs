//! Upload command for pushing a scraped catalog file to the remote store.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use moveset_core::{Config, ReportSet, Uploader};

use super::remote_store;

pub async fn run(config: &Config, input: &Path) -> Result<()> {
    let store = remote_store(config)?.context("Upload needs --store-url")?;
    let reports =
        ReportSet::load(input).with_context(|| format!("Failed to read catalog {:?}", input))?;

    println!(
        "Uploading {} buckets ({} records)...",
        reports.bucket_count(),
        reports.record_count()
    );

    let uploader = Uploader::new(
        Arc::new(store),
        config.store_root.clone(),
        config.upload_pause(),
    );
    let summary = uploader.upload(&reports).await;

    println!("Buckets uploaded: {}", summary.buckets);
    if summary.individual > 0 {
        println!("Records uploaded one by one: {}", summary.individual);
    }
    if summary.collisions > 0 {
        println!("Duplicate names dropped: {}", summary.collisions);
    }
    if summary.failed > 0 {
        bail!("{} records failed to upload", summary.failed);
    }
    Ok(())
}
