use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{error, info};

use pnj_scraper_lib::infrastructure::config::defaults;
use pnj_scraper_lib::infrastructure::logging::{init_logging_with_config, log_system_info};
use pnj_scraper_lib::{AppConfig, HttpClient, HttpClientConfig, RunRequest, ScrapeOrchestrator, ScraperError};

#[derive(Parser, Debug)]
#[command(name = "pnj-scraper", version, about = "Scrape a PNJ catalog section into an upsert SQL script")]
struct Cli {
    /// Catalog slug, e.g. `nhan`; prompted for when omitted
    #[arg(long)]
    item_type: Option<String>,

    /// First listing page (1-based); prompted for when omitted
    #[arg(long)]
    start_page: Option<u32>,

    /// Last listing page, inclusive; prompted for when omitted
    #[arg(long)]
    end_page: Option<u32>,

    /// Do not download product images
    #[arg(long = "skip-images", action = ArgAction::SetTrue)]
    skip_images: bool,

    /// Seed for the enrichment fields, for reproducible output
    #[arg(long, env = "PNJ_SCRAPER_SEED")]
    seed: Option<u64>,

    /// Extra configuration file layered over `config/default`
    #[arg(long)]
    config: Option<String>,
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).context("reading stdin")?;
    Ok(line.trim().to_string())
}

fn prompt_page(label: &str, default: u32) -> Result<u32> {
    let answer = prompt(&format!("{} [{}]: ", label, default))?;
    if answer.is_empty() {
        return Ok(default);
    }
    answer
        .parse()
        .with_context(|| format!("'{}' is not a page number", answer))
}

fn resolve_request(cli: &Cli) -> Result<RunRequest> {
    let item_type = match &cli.item_type {
        Some(item_type) => item_type.clone(),
        None => prompt("Item type (e.g. nhan, bong-tai, day-chuyen): ")?,
    };
    anyhow::ensure!(!item_type.is_empty(), "item type must not be empty");

    let start_page = match cli.start_page {
        Some(page) => page,
        None => prompt_page("Start page", defaults::START_PAGE)?,
    };
    let end_page = match cli.end_page {
        Some(page) => page,
        None => prompt_page("End page", defaults::END_PAGE)?,
    };

    Ok(RunRequest::new(item_type, start_page, end_page))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let request = resolve_request(&cli)?;

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if cli.skip_images {
        config.scraper.download_images = false;
    }
    if cli.seed.is_some() {
        config.scraper.enrichment_seed = cli.seed;
    }

    init_logging_with_config(&config.logging)?;
    log_system_info();
    info!("Loaded configuration: {}", config.describe());

    let client = HttpClient::new(HttpClientConfig::from_scraper_config(&config.scraper))
        .map_err(|e| ScraperError::ClientSetup(e.to_string()))?;
    let orchestrator = ScrapeOrchestrator::new(Arc::new(client), config.scraper);

    match orchestrator.run(&request).await {
        Ok(summary) => {
            info!(
                "📊 Summary: {} pages, {} links, {} records, {} products, {} images saved ({} failed)",
                summary.pages_requested,
                summary.links_found,
                summary.records_extracted,
                summary.products,
                summary.images_downloaded,
                summary.images_failed
            );
            if let Some(path) = &summary.sql_path {
                info!("SQL: {}", path.display());
            }
            Ok(())
        }
        Err(e) => {
            error!("❌ Run failed: {}", e);
            Err(e.into())
        }
    }
}
