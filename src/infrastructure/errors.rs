//! Error taxonomy for the scraping pipeline
//!
//! Per-item errors (`FetchError`, `ParseError`, `ProjectionError`) are logged and
//! resolved to empty results at the point they occur. Only `ScraperError` is
//! allowed to end a run.

use std::path::PathBuf;
use thiserror::Error;

/// Transport or HTTP level failure while fetching a URL
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("HTTP request failed for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to read response body from {url}: {message}")]
    BodyRead { url: String, message: String },

    #[error("Admission gate closed while waiting to fetch {url}")]
    GateClosed { url: String },

    #[error("No such resource: {url}")]
    NotFound { url: String },
}

impl FetchError {
    pub fn transport(url: &str, message: impl ToString) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn body_read(url: &str, message: impl ToString) -> Self {
        Self::BodyRead {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    /// The URL the failed request was aimed at
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::BodyRead { url, .. }
            | Self::GateClosed { url }
            | Self::NotFound { url } => url,
        }
    }

    /// Whether a later run could plausibly succeed for the same URL.
    /// Nothing retries within a run; this only feeds the log line.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::BodyRead { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            Self::GateClosed { .. } | Self::NotFound { .. } => false,
        }
    }
}

/// Missing or invalid page structure (listing container, embedded JSON blob)
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("Element '{selector}' not found on {url}")]
    ElementMissing { selector: String, url: String },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Embedded JSON on {url} is invalid: {reason}")]
    InvalidJson { url: String, reason: String },
}

impl ParseError {
    pub fn element_missing(selector: &str, url: &str) -> Self {
        Self::ElementMissing {
            selector: selector.to_string(),
            url: url.to_string(),
        }
    }

    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Missing or malformed field inside an otherwise valid record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("Path '{path}' not found (stopped at '{segment}')")]
    NotFound { path: String, segment: String },

    #[error("Value at '{path}' is not {expected}")]
    WrongType { path: String, expected: &'static str },
}

impl ProjectionError {
    pub fn wrong_type(path: &str, expected: &'static str) -> Self {
        Self::WrongType {
            path: path.to_string(),
            expected,
        }
    }
}

/// File system failure while writing run output
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration loading or validation failure
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Conditions that terminate a run
#[derive(Error, Debug)]
pub enum ScraperError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),

    #[error("Parser setup failed: {0}")]
    ParserSetup(#[from] ParseError),

    #[error("Invalid page range {start}..={end}")]
    InvalidPageRange { start: u32, end: u32 },
}

pub type FetchResult<T> = Result<T, FetchError>;
pub type ParseResult<T> = Result<T, ParseError>;
pub type ProjectionResult<T> = Result<T, ProjectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_recoverability() {
        let server = FetchError::HttpStatus { status: 503, url: "https://x".into() };
        let missing = FetchError::HttpStatus { status: 404, url: "https://x".into() };
        assert!(server.is_recoverable());
        assert!(!missing.is_recoverable());
        assert!(FetchError::transport("https://x", "reset").is_recoverable());
    }

    #[test]
    fn test_fetch_error_url() {
        let err = FetchError::body_read("https://www.pnj.com.vn/a", "eof");
        assert_eq!(err.url(), "https://www.pnj.com.vn/a");
    }

    #[test]
    fn test_invalid_page_range_message() {
        let zero_start = ScraperError::InvalidPageRange { start: 0, end: 5 };
        assert_eq!(zero_start.to_string(), "Invalid page range 0..=5");
    }
}
