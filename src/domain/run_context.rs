//! Per-run state threaded through the orchestrator's phases

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use super::product::ProductRow;
use super::product_parts::{CategoryRow, FeatureRow, ImageRow, VariantRow};
use super::raw_record::RawProductRecord;

/// Orchestrator phases, strictly sequential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunPhase {
    CollectLinks,
    ExtractDetails,
    Project,
    Emit,
    DownloadImages,
    Done,
}

impl RunPhase {
    /// Next phase; `DownloadImages` is skipped when downloads are disabled
    pub fn next(self, download_images: bool) -> Self {
        match self {
            Self::CollectLinks => Self::ExtractDetails,
            Self::ExtractDetails => Self::Project,
            Self::Project => Self::Emit,
            Self::Emit if download_images => Self::DownloadImages,
            Self::Emit | Self::DownloadImages | Self::Done => Self::Done,
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CollectLinks => "collect-links",
            Self::ExtractDetails => "extract-details",
            Self::Project => "project",
            Self::Emit => "emit",
            Self::DownloadImages => "download-images",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Rows projected from a single record
#[derive(Debug, Clone)]
pub struct ProjectedProduct {
    pub product: ProductRow,
    pub categories: Vec<CategoryRow>,
    pub images: Vec<ImageRow>,
    pub features: Vec<FeatureRow>,
    pub variants: Vec<VariantRow>,
}

/// The five ordered row sets consumed by the SQL emitter
#[derive(Debug, Clone, Default)]
pub struct RowSets {
    pub products: Vec<ProductRow>,
    pub categories: Vec<CategoryRow>,
    pub images: Vec<ImageRow>,
    pub features: Vec<FeatureRow>,
    pub variants: Vec<VariantRow>,
}

impl RowSets {
    /// Append one product's rows, keeping insertion order
    pub fn push(&mut self, projected: ProjectedProduct) {
        self.products.push(projected.product);
        self.categories.extend(projected.categories);
        self.images.extend(projected.images);
        self.features.extend(projected.features);
        self.variants.extend(projected.variants);
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// State of one scraping run; owned and folded by the orchestrator only
#[derive(Debug)]
pub struct RunContext {
    pub run_id: Uuid,
    pub item_type: String,
    pub start_page: u32,
    pub end_page: u32,
    pub started_at: DateTime<Local>,
    pub phase: RunPhase,
    pub links: Vec<String>,
    pub records: Vec<RawProductRecord>,
    pub rows: RowSets,
    pub summary: RunSummary,
}

impl RunContext {
    pub fn new(item_type: &str, start_page: u32, end_page: u32) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            item_type: item_type.to_string(),
            start_page,
            end_page,
            started_at: Local::now(),
            phase: RunPhase::CollectLinks,
            links: Vec::new(),
            records: Vec::new(),
            rows: RowSets::default(),
            summary: RunSummary::default(),
        }
    }

    pub fn advance(&mut self, download_images: bool) {
        self.phase = self.phase.next(download_images);
    }
}

/// Counts reported when a run completes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub pages_requested: u32,
    pub links_found: usize,
    pub records_extracted: usize,
    pub products: usize,
    pub categories: usize,
    pub images: usize,
    pub features: usize,
    pub variants: usize,
    pub sql_path: Option<PathBuf>,
    pub images_downloaded: usize,
    pub images_failed: usize,
}
