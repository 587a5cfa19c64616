//! Product page extraction
//!
//! The embedded JSON is an external contract owned by the site and may change
//! shape at any time. A page that cannot be fetched or decoded is reported and
//! skipped; it never fails the run.

#![allow(clippy::uninlined_format_args)]

use futures::future::join_all;
use std::sync::Arc;
use tracing::warn;

use crate::domain::RawProductRecord;
use crate::infrastructure::errors::ParseResult;
use crate::infrastructure::http_client::PageFetcher;
use crate::infrastructure::parsing::{ContextualParser, DetailParseContext, ProductDetailParser};

pub struct DetailExtractor {
    fetcher: Arc<dyn PageFetcher>,
    parser: ProductDetailParser,
}

impl DetailExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> ParseResult<Self> {
        Ok(Self {
            fetcher,
            parser: ProductDetailParser::new()?,
        })
    }

    pub async fn extract_detail(&self, url: &str) -> Option<RawProductRecord> {
        let html = match self.fetcher.fetch_text(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Product page unavailable (recoverable: {}): {}", e.is_recoverable(), e);
                return None;
            }
        };

        self.parser
            .parse_str(&html, &DetailParseContext::new(url))
            .map_err(|e| warn!("Skipping {}: {}", url, e))
            .ok()
    }

    /// Extract all URLs concurrently; the result is aligned with `urls`
    pub async fn extract_all(&self, urls: &[String]) -> Vec<Option<RawProductRecord>> {
        join_all(urls.iter().map(|url| self.extract_detail(url))).await
    }
}
