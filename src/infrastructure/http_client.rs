//! HTTP client for catalog crawling with a fixed concurrency cap
//!
//! Every request passes through an admission gate (a semaphore sized by
//! `max_concurrent_requests`); callers beyond the cap suspend until a permit
//! frees. There is no retry: a failed fetch is reported once as `FetchError`.

#![allow(clippy::uninlined_format_args)]

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::debug;

use super::config::ScraperConfig;
use super::errors::{FetchError, FetchResult};

/// HTTP client configuration
#[derive(Debug, Clone, serde::Serialize)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_concurrent_requests: u32,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from_scraper_config(&ScraperConfig::default())
    }
}

impl HttpClientConfig {
    pub fn from_scraper_config(config: &ScraperConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout_seconds: config.request_timeout_seconds,
            max_concurrent_requests: config.max_concurrent_requests,
            follow_redirects: config.follow_redirects,
        }
    }
}

/// Fixed-size admission gate bounding in-flight requests
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionGate {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a free slot; the slot is released when the permit drops
    pub async fn admit(&self, url: &str) -> FetchResult<SemaphorePermit<'_>> {
        self.permits
            .acquire()
            .await
            .map_err(|_| FetchError::GateClosed { url: url.to_string() })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

/// Body of a fetched resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedContent {
    Text(String),
    Bytes(Vec<u8>),
}

impl FetchedContent {
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.into_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }
}

/// Source of pages and binary resources for the pipeline
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`, decoded as text unless `as_bytes` is set
    async fn fetch(&self, url: &str, as_bytes: bool) -> FetchResult<FetchedContent>;

    async fn fetch_text(&self, url: &str) -> FetchResult<String> {
        self.fetch(url, false).await.map(FetchedContent::into_text)
    }

    async fn fetch_bytes(&self, url: &str) -> FetchResult<Vec<u8>> {
        self.fetch(url, true).await.map(FetchedContent::into_bytes)
    }
}

/// reqwest-backed fetcher
pub struct HttpClient {
    client: Client,
    gate: AdmissionGate,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("vi-VN,vi;q=0.9,en;q=0.8"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()?;

        Ok(Self {
            client,
            gate: AdmissionGate::new(config.max_concurrent_requests as usize),
        })
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str, as_bytes: bool) -> FetchResult<FetchedContent> {
        let _permit = self.gate.admit(url).await?;

        debug!("HTTP GET {} ({} slots free)", url, self.gate.available());
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content = if as_bytes {
            let bytes = response.bytes().await.map_err(|e| FetchError::body_read(url, e))?;
            FetchedContent::Bytes(bytes.to_vec())
        } else {
            let text = response.text().await.map_err(|e| FetchError::body_read(url, e))?;
            FetchedContent::Text(text)
        };

        debug!("Fetched {} ({})", url, status);
        Ok(content)
    }
}
