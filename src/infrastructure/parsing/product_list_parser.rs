//! Listing page parser
//!
//! Extracts one product page URL per product tile inside the listing
//! container. Pages carry no pagination metadata; the caller owns the range.

#![allow(clippy::uninlined_format_args)]

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::config::ProductListSelectors;
use super::{ContextualParser, ParseContext, compile_selector};
use crate::infrastructure::config::utils::resolve_url;
use crate::infrastructure::errors::{ParseError, ParseResult};

/// Parser for product links on listing pages
pub struct ProductListParser {
    container_selector: Selector,
    container_selector_str: String,
    product_image_selector: Selector,
    link_selector: Selector,
}

impl ProductListParser {
    /// Create a parser with the default PNJ selectors
    pub fn new() -> ParseResult<Self> {
        Self::with_config(&ProductListSelectors::default())
    }

    pub fn with_config(selectors: &ProductListSelectors) -> ParseResult<Self> {
        Ok(Self {
            container_selector: compile_selector(&selectors.container)?,
            container_selector_str: selectors.container.clone(),
            product_image_selector: compile_selector(&selectors.product_image)?,
            link_selector: compile_selector(&selectors.product_link)?,
        })
    }

    fn extract_link(&self, tile: &ElementRef, base_url: &str) -> Option<String> {
        let href = tile
            .select(&self.link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))?;
        resolve_url(base_url, href)
    }
}

impl ContextualParser for ProductListParser {
    type Output = Vec<String>;
    type Context = ParseContext;

    /// Fails only when the container is missing; a container without
    /// product tiles yields an empty list.
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParseResult<Self::Output> {
        let container = html
            .select(&self.container_selector)
            .next()
            .ok_or_else(|| ParseError::element_missing(&self.container_selector_str, &context.page_url))?;

        let mut links = Vec::new();
        for (index, tile) in container.select(&self.product_image_selector).enumerate() {
            match self.extract_link(&tile, &context.base_url) {
                Some(link) => links.push(link),
                None => debug!("Tile {} on page {} has no usable link", index, context.page_number),
            }
        }

        debug!("Extracted {} product links from page {}", links.len(), context.page_number);
        Ok(links)
    }
}
