use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::report_set::ReportSet;
use crate::store::{KeyedBucket, RemoteStore, StorePath};

/// Pause between single-record writes after a failed bucket write
const ITEM_PAUSE: Duration = Duration::from_millis(100);

/// Outcome counts of one upload run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UploadSummary {
    /// Buckets written in one request
    pub buckets: usize,
    /// Records written one by one after a bucket write failed
    pub individual: usize,
    pub failed: usize,
    /// Records dropped because their sanitized name was already taken
    pub collisions: usize,
}

/// Writes a [`ReportSet`] into the store, one rating bucket at a time
pub struct Uploader<S> {
    store: Arc<S>,
    root: String,
    pause: Duration,
}

impl<S: RemoteStore> Uploader<S> {
    pub fn new(store: Arc<S>, root: impl Into<String>, pause: Duration) -> Self {
        Self {
            store,
            root: root.into(),
            pause,
        }
    }

    /// Upload every bucket. A bucket that cannot be written whole is retried
    /// record by record.
    pub async fn upload(&self, reports: &ReportSet) -> UploadSummary {
        let mut summary = UploadSummary::default();

        for (format_key, ratings) in reports.iter() {
            for (rating, records) in ratings {
                let path = match StorePath::bucket(&self.root, format_key, rating) {
                    Ok(path) => path,
                    Err(e) => {
                        warn!("Skipping {}/{}: {}", format_key, rating, e);
                        summary.failed += records.len();
                        continue;
                    }
                };
                let keyed = KeyedBucket::from_records(records.iter().cloned());
                for name in &keyed.collisions {
                    warn!("Duplicate key for {} in {}, keeping the first", name, path);
                }
                summary.collisions += keyed.collisions.len();

                info!("Uploading {} ({} pokemon)", path, keyed.records.len());
                if self.store.put(&path, &keyed.to_value()).await {
                    summary.buckets += 1;
                } else {
                    warn!("Bucket upload failed for {}, writing records one by one", path);
                    self.upload_items(&path, &keyed, &mut summary).await;
                }

                if !self.pause.is_zero() {
                    tokio::time::sleep(self.pause).await;
                }
            }
        }
        summary
    }

    async fn upload_items(&self, bucket: &StorePath, keyed: &KeyedBucket, summary: &mut UploadSummary) {
        for (key, record) in &keyed.records {
            let written = match (bucket.child(key), serde_json::to_value(record)) {
                (Ok(path), Ok(value)) => self.store.put(&path, &value).await,
                _ => false,
            };
            if written {
                summary.individual += 1;
            } else {
                warn!("Failed to upload {}/{}", bucket, key);
                summary.failed += 1;
            }
            if !self.pause.is_zero() {
                tokio::time::sleep(ITEM_PAUSE).await;
            }
        }
    }
}
