//! Configuration infrastructure
//!
//! Layered loading with the `config` crate:
//! 1. Built-in defaults (`AppConfig::default()`)
//! 2. Optional `config/default.toml` next to the working directory
//! 3. Optional explicit file passed on the command line
//! 4. `PNJ_SCRAPER__*` environment variables (e.g. `PNJ_SCRAPER__SCRAPER__MAX_CONCURRENT_REQUESTS=4`)

#![allow(clippy::uninlined_format_args)]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::errors::ConfigError;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub logging: LoggingConfig,
}

/// Crawling and output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Site root, e.g. `https://www.pnj.com.vn`
    pub site_base_url: String,

    /// Size of the fetch admission gate
    pub max_concurrent_requests: u32,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    pub user_agent: String,

    pub follow_redirects: bool,

    /// Root of the per-item-type output tree
    pub output_root: PathBuf,

    /// Download product images after the SQL script is written
    pub download_images: bool,

    /// Keep a copy of each raw record under `json/`
    pub write_json_snapshots: bool,

    /// Seed for enrichment randomness; `None` seeds from entropy
    pub enrichment_seed: Option<u64>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs in the file layer
    pub json_format: bool,

    pub console_output: bool,

    pub file_output: bool,

    /// Directory for log files; relative paths resolve against the working directory
    pub log_dir: PathBuf,

    pub file_name: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            site_base_url: pnj::BASE_URL.to_string(),
            max_concurrent_requests: defaults::MAX_CONCURRENT_REQUESTS,
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            user_agent: defaults::USER_AGENT.to_string(),
            follow_redirects: true,
            output_root: PathBuf::from(defaults::OUTPUT_ROOT),
            download_images: defaults::DOWNLOAD_IMAGES,
            write_json_snapshots: defaults::WRITE_JSON_SNAPSHOTS,
            enrichment_seed: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: PathBuf::from(defaults::LOG_DIR),
            file_name: defaults::LOG_FILE_NAME.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, optional files and the environment
    pub fn load(explicit_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::with_name(defaults::CONFIG_FILE).required(false));

        if let Some(path) = explicit_file {
            builder = builder.add_source(config::File::with_name(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// One-line description for the start-up log
    pub fn describe(&self) -> String {
        format!(
            "site={}, concurrency={}, output_root={:?}, download_images={}, seed={:?}",
            self.scraper.site_base_url,
            self.scraper.max_concurrent_requests,
            self.scraper.output_root,
            self.scraper.download_images,
            self.scraper.enrichment_seed
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scraper.max_concurrent_requests == 0 {
            return Err(ConfigError::Validation {
                message: "max_concurrent_requests must be greater than 0".to_string(),
            });
        }

        if self.scraper.request_timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                message: "request_timeout_seconds must be greater than 0".to_string(),
            });
        }

        if url::Url::parse(&self.scraper.site_base_url).is_err() {
            return Err(ConfigError::Validation {
                message: format!("site_base_url is not a valid URL: '{}'", self.scraper.site_base_url),
            });
        }

        Ok(())
    }
}

/// PNJ website constants
pub mod pnj {
    /// Site root
    pub const BASE_URL: &str = "https://www.pnj.com.vn";

    /// Container holding the product grid on listing pages
    pub const LISTING_CONTAINER_ID: &str = "ajax_pagination_contents";

    /// Script element carrying the server-rendered page data
    pub const NEXT_DATA_SCRIPT_ID: &str = "__NEXT_DATA__";

    /// Path of the product object inside the page data
    pub const PRODUCT_DATA_PATH: &str = "props.pageProps.dataServerSide";
}

/// Default values
pub mod defaults {
    /// Default maximum concurrent in-flight requests
    pub const MAX_CONCURRENT_REQUESTS: u32 = 10;

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

    pub const OUTPUT_ROOT: &str = "data";

    pub const DOWNLOAD_IMAGES: bool = true;

    pub const WRITE_JSON_SNAPSHOTS: bool = true;

    /// Page range used when the prompt is left blank
    pub const START_PAGE: u32 = 1;
    pub const END_PAGE: u32 = 8;

    // Log configuration defaults
    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = true;
    pub const LOG_DIR: &str = "logs";
    pub const LOG_FILE_NAME: &str = "pnj-scraper.log";

    pub const CONFIG_FILE: &str = "config/default";
    pub const ENV_PREFIX: &str = "PNJ_SCRAPER";
}

/// URL building helper functions
pub mod utils {
    /// Listing page URL: `{base}/{item_type}/page-{n}/`
    pub fn listing_page_url(base_url: &str, item_type: &str, page: u32) -> String {
        format!(
            "{}/{}/page-{}/",
            base_url.trim_end_matches('/'),
            item_type.trim_matches('/'),
            page
        )
    }

    /// Resolve a possibly relative URL against the site root.
    /// Protocol-relative (`//cdn...`) URLs get `https:`.
    pub fn resolve_url(base_url: &str, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        if href.starts_with("//") {
            return Some(format!("https:{}", href));
        }
        let base = url::Url::parse(base_url).ok()?;
        base.join(href).ok().map(|u| u.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scraper.max_concurrent_requests, 10);
        assert!(config.scraper.enrichment_seed.is_none());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = AppConfig::default();
        config.scraper.max_concurrent_requests = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_describe_reflects_overrides() {
        let mut config = AppConfig::default();
        config.scraper.download_images = false;
        config.scraper.enrichment_seed = Some(42);

        let line = config.describe();
        assert!(line.contains("concurrency=10"));
        assert!(line.contains("download_images=false"));
        assert!(line.contains("seed=Some(42)"));
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraper.toml");
        std::fs::write(
            &path,
            "[scraper]\nmax_concurrent_requests = 4\nenrichment_seed = 7\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.scraper.max_concurrent_requests, 4);
        assert_eq!(config.scraper.enrichment_seed, Some(7));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.scraper.site_base_url, pnj::BASE_URL);
    }

    #[test]
    fn test_listing_page_url() {
        assert_eq!(
            utils::listing_page_url("https://www.pnj.com.vn/", "nhan", 3),
            "https://www.pnj.com.vn/nhan/page-3/"
        );
    }

    #[test]
    fn test_resolve_url() {
        let base = "https://www.pnj.com.vn";
        assert_eq!(
            utils::resolve_url(base, "/nhan-vang-18k/").as_deref(),
            Some("https://www.pnj.com.vn/nhan-vang-18k/")
        );
        assert_eq!(
            utils::resolve_url(base, "//cdn.pnj.io/a.png").as_deref(),
            Some("https://cdn.pnj.io/a.png")
        );
        assert_eq!(
            utils::resolve_url(base, "https://other.vn/x").as_deref(),
            Some("https://other.vn/x")
        );
        assert_eq!(utils::resolve_url(base, "  "), None);
    }
}
