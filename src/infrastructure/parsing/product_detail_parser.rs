//! Product page parser
//!
//! Locates the server-rendered `__NEXT_DATA__` script and decodes its text
//! as JSON. Field-level interpretation is left to the record projector.

#![allow(clippy::uninlined_format_args)]

use scraper::{Html, Selector};

use super::config::ProductDetailSelectors;
use super::{ContextualParser, DetailParseContext, compile_selector};
use crate::domain::RawProductRecord;
use crate::infrastructure::errors::{ParseError, ParseResult};

pub struct ProductDetailParser {
    script_selector: Selector,
    script_selector_str: String,
}

impl ProductDetailParser {
    pub fn new() -> ParseResult<Self> {
        Self::with_config(&ProductDetailSelectors::default())
    }

    pub fn with_config(selectors: &ProductDetailSelectors) -> ParseResult<Self> {
        Ok(Self {
            script_selector: compile_selector(&selectors.embedded_data_script)?,
            script_selector_str: selectors.embedded_data_script.clone(),
        })
    }
}

impl ContextualParser for ProductDetailParser {
    type Output = RawProductRecord;
    type Context = DetailParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParseResult<Self::Output> {
        let script = html
            .select(&self.script_selector)
            .next()
            .ok_or_else(|| ParseError::element_missing(&self.script_selector_str, &context.url))?;

        let text: String = script.text().collect();
        let root: serde_json::Value = serde_json::from_str(text.trim()).map_err(|e| ParseError::InvalidJson {
            url: context.url.clone(),
            reason: e.to_string(),
        })?;

        Ok(RawProductRecord::new(context.url.clone(), root))
    }
}
