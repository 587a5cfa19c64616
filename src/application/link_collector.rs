//! Listing page link collection

#![allow(clippy::uninlined_format_args)]

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::infrastructure::config::utils::listing_page_url;
use crate::infrastructure::errors::ParseResult;
use crate::infrastructure::http_client::PageFetcher;
use crate::infrastructure::parsing::{ContextualParser, ParseContext, ProductListParser};

pub struct LinkCollector {
    fetcher: Arc<dyn PageFetcher>,
    parser: ProductListParser,
    base_url: String,
    item_type: String,
}

impl LinkCollector {
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: &str, item_type: &str) -> ParseResult<Self> {
        Ok(Self {
            fetcher,
            parser: ProductListParser::new()?,
            base_url: base_url.to_string(),
            item_type: item_type.to_string(),
        })
    }

    pub fn page_url(&self, page_number: u32) -> String {
        listing_page_url(&self.base_url, &self.item_type, page_number)
    }

    /// Product URLs on one listing page, in document order.
    /// Fetch failures and missing containers yield an empty list.
    pub async fn collect_links(&self, page_number: u32) -> Vec<String> {
        let url = self.page_url(page_number);

        let html = match self.fetcher.fetch_text(&url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(
                    "Listing page {} unavailable at {} (recoverable: {}): {}",
                    page_number,
                    e.url(),
                    e.is_recoverable(),
                    e
                );
                return Vec::new();
            }
        };

        let context = ParseContext::new(page_number, url.as_str(), self.base_url.as_str());
        match self.parser.parse_str(&html, &context) {
            Ok(links) => {
                debug!("Page {}: {} links", page_number, links.len());
                links
            }
            Err(e) => {
                warn!("Listing page {} has no product grid: {}", page_number, e);
                Vec::new()
            }
        }
    }

    /// Collect every page in `start..=end` concurrently; results keep page order
    pub async fn collect_range(&self, start: u32, end: u32) -> Vec<Vec<String>> {
        join_all((start..=end).map(|page| self.collect_links(page))).await
    }
}
