//! Scrape run orchestration
//!
//! Runs the phases of one item-type scrape strictly in order:
//!
//! ```text
//! CollectLinks -> ExtractDetails -> Project -> Emit -> DownloadImages (optional) -> Done
//! ```
//!
//! No phase starts before the previous one has its full result set. Fetches
//! within a phase run concurrently behind the fetcher's admission gate, and
//! results are folded into the `RunContext` one at a time in submission order.

#![allow(clippy::uninlined_format_args)]

use chrono::Local;
use futures::future::join_all;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use super::detail_extractor::DetailExtractor;
use super::field_synthesizer::FieldSynthesizer;
use super::link_collector::LinkCollector;
use super::record_projector::{RecordProjector, projection_timestamp};
use crate::domain::{ImageRow, RunContext, RunPhase, RunSummary};
use crate::infrastructure::config::ScraperConfig;
use crate::infrastructure::errors::ScraperError;
use crate::infrastructure::http_client::PageFetcher;
use crate::infrastructure::output_store::OutputStore;
use crate::infrastructure::sql_emitter::{self, dedupe_categories};

/// What to scrape in one run
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Catalog slug, e.g. `nhan` or `bong-tai`
    pub item_type: String,
    pub start_page: u32,
    pub end_page: u32,
}

impl RunRequest {
    pub fn new(item_type: impl Into<String>, start_page: u32, end_page: u32) -> Self {
        Self {
            item_type: item_type.into(),
            start_page,
            end_page,
        }
    }

    fn validate(&self) -> Result<(), ScraperError> {
        if self.start_page == 0 || self.start_page > self.end_page {
            return Err(ScraperError::InvalidPageRange {
                start: self.start_page,
                end: self.end_page,
            });
        }
        Ok(())
    }
}

pub struct ScrapeOrchestrator {
    fetcher: Arc<dyn PageFetcher>,
    config: ScraperConfig,
}

impl ScrapeOrchestrator {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: ScraperConfig) -> Self {
        Self { fetcher, config }
    }

    /// Run every phase for `request`. Only output directory creation and the
    /// SQL write can fail the run; per-item failures are logged and skipped.
    pub async fn run(&self, request: &RunRequest) -> Result<RunSummary, ScraperError> {
        request.validate()?;

        let store = OutputStore::new(&self.config.output_root, &request.item_type);
        store.prepare().await?;

        let mut ctx = RunContext::new(&request.item_type, request.start_page, request.end_page);
        let download_images = self.config.download_images;
        info!(
            "🚀 Run {} started: item_type={}, pages {}..={}",
            ctx.run_id, ctx.item_type, ctx.start_page, ctx.end_page
        );

        while ctx.phase != RunPhase::Done {
            match ctx.phase {
                RunPhase::CollectLinks => self.collect_links(&mut ctx).await?,
                RunPhase::ExtractDetails => self.extract_details(&mut ctx).await?,
                RunPhase::Project => self.project(&mut ctx, &store).await,
                RunPhase::Emit => self.emit(&mut ctx, &store).await?,
                RunPhase::DownloadImages => self.download_images(&mut ctx, &store).await,
                RunPhase::Done => {}
            }
            ctx.advance(download_images);
        }

        let elapsed = Local::now() - ctx.started_at;
        let summary = ctx.summary;
        info!(
            "✅ Run {} finished in {}ms: {} products, {} categories, {} images, {} features, {} variants, sql={:?}",
            ctx.run_id,
            elapsed.num_milliseconds(),
            summary.products,
            summary.categories,
            summary.images,
            summary.features,
            summary.variants,
            summary.sql_path
        );
        Ok(summary)
    }

    async fn collect_links(&self, ctx: &mut RunContext) -> Result<(), ScraperError> {
        let collector = LinkCollector::new(Arc::clone(&self.fetcher), &self.config.site_base_url, &ctx.item_type)?;

        let pages = collector.collect_range(ctx.start_page, ctx.end_page).await;
        ctx.summary.pages_requested = ctx.end_page - ctx.start_page + 1;

        let mut seen = HashSet::new();
        let mut duplicates = 0usize;
        for link in pages.into_iter().flatten() {
            if seen.insert(link.clone()) {
                ctx.links.push(link);
            } else {
                duplicates += 1;
            }
        }

        ctx.summary.links_found = ctx.links.len();
        info!(
            "🔗 {}: {} product links from {} pages ({} duplicates dropped)",
            ctx.phase, ctx.summary.links_found, ctx.summary.pages_requested, duplicates
        );
        Ok(())
    }

    async fn extract_details(&self, ctx: &mut RunContext) -> Result<(), ScraperError> {
        let extractor = DetailExtractor::new(Arc::clone(&self.fetcher))?;

        let results = extractor.extract_all(&ctx.links).await;
        ctx.records.extend(results.into_iter().flatten());

        ctx.summary.records_extracted = ctx.records.len();
        info!(
            "📄 {}: {} of {} product pages decoded",
            ctx.phase,
            ctx.summary.records_extracted,
            ctx.links.len()
        );
        Ok(())
    }

    async fn project(&self, ctx: &mut RunContext, store: &OutputStore) {
        let projector = RecordProjector::new(&self.config.site_base_url);
        let mut synthesizer = FieldSynthesizer::new(self.config.enrichment_seed);
        let timestamp = projection_timestamp();

        for record in &ctx.records {
            let Some(projected) = projector.project(record, &mut synthesizer, &timestamp) else {
                continue;
            };

            if self.config.write_json_snapshots {
                if let Err(e) = store.write_json_snapshot(projected.product.id, record).await {
                    warn!("Snapshot for product {} not written: {}", projected.product.id, e);
                }
            }

            ctx.rows.push(projected);
        }

        let rows = &ctx.rows;
        ctx.summary.products = rows.products.len();
        ctx.summary.categories = dedupe_categories(&rows.categories).len();
        ctx.summary.images = rows.images.len();
        ctx.summary.features = rows.features.len();
        ctx.summary.variants = rows.variants.len();
        info!(
            "🧩 {}: {} products, {} categories, {} images, {} features, {} variants",
            ctx.phase,
            ctx.summary.products,
            ctx.summary.categories,
            ctx.summary.images,
            ctx.summary.features,
            ctx.summary.variants
        );
    }

    async fn emit(&self, ctx: &mut RunContext, store: &OutputStore) -> Result<(), ScraperError> {
        let rows = &ctx.rows;
        if rows.is_empty() {
            warn!("{}: no products projected, the script will only carry constraint guards", ctx.phase);
        }
        let script = sql_emitter::emit(
            &rows.products,
            &rows.categories,
            &rows.images,
            &rows.features,
            &rows.variants,
        );

        let path = store.write_sql(&script, Local::now()).await?;
        info!("💾 {}: SQL script at {}", ctx.phase, path.display());
        ctx.summary.sql_path = Some(path);
        Ok(())
    }

    async fn download_images(&self, ctx: &mut RunContext, store: &OutputStore) {
        let results: Vec<Option<PathBuf>> =
            join_all(ctx.rows.images.iter().map(|image| self.download_image(image, store))).await;

        ctx.summary.images_downloaded = results.iter().filter(|r| r.is_some()).count();
        ctx.summary.images_failed = results.len() - ctx.summary.images_downloaded;
        info!(
            "🖼️ {}: {} images saved, {} failed",
            ctx.phase, ctx.summary.images_downloaded, ctx.summary.images_failed
        );
    }

    async fn download_image(&self, image: &ImageRow, store: &OutputStore) -> Option<PathBuf> {
        // Rows carry SQL-ready text; the request needs the original URL
        let url = image.image_url.replace("''", "'");

        let bytes = match self.fetcher.fetch_bytes(&url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Image for product {} not downloaded: {}", image.product_id, e);
                return None;
            }
        };

        match store.write_image(image.product_id, image.sort_order, &url, &bytes).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Image for product {} not saved: {}", image.product_id, e);
                None
            }
        }
    }
}
