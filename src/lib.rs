//! PNJ Scraper - jewelry catalog crawler
//!
//! Crawls PNJ listing pages for one item type, decodes the product data each
//! product page embeds for hydration, fills the fields the catalog lacks and
//! writes everything as one idempotent upsert SQL script, optionally with
//! the product images.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{RunRequest, ScrapeOrchestrator};
pub use domain::{RunSummary, RawProductRecord};
pub use infrastructure::{AppConfig, HttpClient, HttpClientConfig, PageFetcher, ScraperError};
