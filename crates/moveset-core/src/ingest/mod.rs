//! Report ingestion: discovery, scraping, persistence and upload.

mod index;
mod report_set;
mod scraper;
mod uploader;

pub use index::{ReportFile, ReportListing, list_report_files, txt_links};
pub use report_set::ReportSet;
pub use scraper::{ScrapeSummary, Scraper};
pub use uploader::{UploadSummary, Uploader};
