//! Logging system configuration and initialization
//!
//! - Console and file output, each optional
//! - Optional JSON formatting for the file layer
//! - Previous log file rotated aside with a timestamp on start-up
//! - ICT (Indochina Time, UTC+7) timestamps, matching the target site's locale

#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use chrono::{FixedOffset, Offset, Utc};
use lazy_static::lazy_static;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub use crate::infrastructure::config::LoggingConfig;

const ICT_OFFSET_SECONDS: i32 = 7 * 3600;

// Keeps the non-blocking file writer alive for the life of the process
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> = Mutex::new(Vec::new());
}

fn ict_offset() -> FixedOffset {
    FixedOffset::east_opt(ICT_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix())
}

/// Custom time formatter for ICT (UTC+7)
struct IctTimeFormatter;

impl FormatTime for IctTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Utc::now().with_timezone(&ict_offset());
        write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S%.3f %:z"))
    }
}

/// Build the env filter: `RUST_LOG` wins, otherwise the configured level with
/// HTTP internals held at warn unless tracing
fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = EnvFilter::new(&config.level);

        if !config.level.to_lowercase().contains("trace") {
            for directive in ["reqwest=warn", "hyper=warn", "hyper_util=warn", "h2=warn", "html5ever=warn", "selectors=warn"] {
                if let Ok(d) = directive.parse() {
                    filter = filter.add_directive(d);
                }
            }
        }

        filter
    })
}

/// Rotate an existing log file by renaming it with its modification timestamp
fn rotate_existing_log_file(log_dir: &Path, log_file_name: &str) -> Result<()> {
    let log_file_path = log_dir.join(log_file_name);
    if !log_file_path.exists() {
        return Ok(());
    }

    let metadata = std::fs::metadata(&log_file_path)
        .map_err(|e| anyhow!("Failed to get log file metadata: {}", e))?;
    let file_time = metadata.modified().unwrap_or_else(|_| std::time::SystemTime::now());
    let datetime: chrono::DateTime<Utc> = file_time.into();
    let stamped = datetime.with_timezone(&ict_offset());

    let file_stem = log_file_name.trim_end_matches(".log");
    let rotated_name = format!("{}.{}.log", file_stem, stamped.format("%Y%m%dT%H%M%S"));
    let rotated_path = log_dir.join(&rotated_name);

    std::fs::rename(&log_file_path, &rotated_path).map_err(|e| {
        anyhow!(
            "Failed to rotate log file {} to {}: {}",
            log_file_path.display(),
            rotated_path.display(),
            e
        )
    })?;

    Ok(())
}

/// Initialize logging with custom configuration
///
/// Set `RUST_LOG` to override filtering, e.g.
/// ```bash
/// RUST_LOG="debug,reqwest=debug" pnj-scraper --item-type nhan
/// ```
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let registry = Registry::default().with(build_env_filter(config));

    match (config.file_output, config.console_output) {
        (true, console) => {
            std::fs::create_dir_all(&config.log_dir)
                .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", config.log_dir, e))?;
            rotate_existing_log_file(&config.log_dir, &config.file_name)?;

            let file_appender = rolling::never(&config.log_dir, &config.file_name);
            let (file_writer, file_guard) = non_blocking(file_appender);
            LOG_GUARDS
                .lock()
                .map_err(|_| anyhow!("Log guard registry poisoned"))?
                .push(file_guard);

            if config.json_format {
                let file_layer = fmt::Layer::new()
                    .json()
                    .with_writer(file_writer)
                    .with_timer(IctTimeFormatter)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false);
                let console_layer = console.then(|| {
                    fmt::Layer::new()
                        .with_writer(std::io::stdout)
                        .with_timer(IctTimeFormatter)
                        .with_target(false)
                });
                registry
                    .with(file_layer)
                    .with(console_layer)
                    .try_init()
                    .map_err(|e| anyhow!("Failed to install subscriber: {}", e))?;
            } else {
                // time + level + message only
                let file_layer = fmt::Layer::new()
                    .with_writer(file_writer)
                    .with_timer(IctTimeFormatter)
                    .with_target(false)
                    .with_ansi(false);
                let console_layer = console.then(|| {
                    fmt::Layer::new()
                        .with_writer(std::io::stdout)
                        .with_timer(IctTimeFormatter)
                        .with_target(false)
                });
                registry
                    .with(file_layer)
                    .with(console_layer)
                    .try_init()
                    .map_err(|e| anyhow!("Failed to install subscriber: {}", e))?;
            }
        }
        (false, true) => {
            let console_layer = fmt::Layer::new()
                .with_writer(std::io::stdout)
                .with_timer(IctTimeFormatter)
                .with_target(false);
            registry
                .with(console_layer)
                .try_init()
                .map_err(|e| anyhow!("Failed to install subscriber: {}", e))?;
        }
        (false, false) => {
            return Err(anyhow!("No logging output configured"));
        }
    }

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    if config.file_output {
        info!("Log file: {:?}", config.log_dir.join(&config.file_name));
    }
    Ok(())
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("=== PNJ Scraper ===");
    info!("Application version: {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {}", std::env::consts::OS);
    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {:?}", current_dir);
    }
    info!("===================");
}
