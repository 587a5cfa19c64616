//! HTML parsing for listing pages and product pages
//!
//! Parsers are synchronous and operate on already-fetched HTML; fetching and
//! error-to-empty mapping happen in the application layer.

pub mod config;
pub mod context;
pub mod product_detail_parser;
pub mod product_list_parser;

pub use config::{ProductDetailSelectors, ProductListSelectors};
pub use context::{DetailParseContext, ParseContext};
pub use product_detail_parser::ProductDetailParser;
pub use product_list_parser::ProductListParser;

use scraper::{Html, Selector};

use super::errors::{ParseError, ParseResult};

/// Parser over a parsed document with per-call context
pub trait ContextualParser {
    type Output;
    type Context;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParseResult<Self::Output>;

    /// Parse raw HTML text; the `Html` tree never outlives this call
    fn parse_str(&self, html: &str, context: &Self::Context) -> ParseResult<Self::Output> {
        let document = Html::parse_document(html);
        self.parse_with_context(&document, context)
    }
}

pub(crate) fn compile_selector(selector: &str) -> ParseResult<Selector> {
    Selector::parse(selector).map_err(|e| ParseError::invalid_selector(selector, e))
}
