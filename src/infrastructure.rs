//! Infrastructure layer: HTTP, HTML parsing, configuration, logging and output

pub mod config;
pub mod errors;
pub mod http_client;
pub mod logging;
pub mod output_store;
pub mod parsing;
pub mod sql_emitter;

pub use config::{AppConfig, LoggingConfig, ScraperConfig};
pub use errors::{ConfigError, FetchError, ParseError, PersistenceError, ProjectionError, ScraperError};
pub use http_client::{AdmissionGate, FetchedContent, HttpClient, HttpClientConfig, PageFetcher};
pub use output_store::OutputStore;
pub use parsing::{ContextualParser, ProductDetailParser, ProductListParser};
pub use sql_emitter::{UpsertBlock, UpsertPlan};
