//! Context objects passed alongside the document being parsed

/// Context for a listing page
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// 1-based listing page number
    pub page_number: u32,

    /// URL the page was fetched from
    pub page_url: String,

    /// Site root for resolving relative links
    pub base_url: String,
}

impl ParseContext {
    pub fn new(page_number: u32, page_url: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            page_number,
            page_url: page_url.into(),
            base_url: base_url.into(),
        }
    }
}

/// Context for a product page
#[derive(Debug, Clone)]
pub struct DetailParseContext {
    pub url: String,
}

impl DetailParseContext {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}
