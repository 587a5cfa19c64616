//! End-to-end runs of the scrape pipeline against an in-memory site

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use pnj_scraper_lib::infrastructure::config::ScraperConfig;
use pnj_scraper_lib::infrastructure::errors::{FetchError, FetchResult};
use pnj_scraper_lib::infrastructure::http_client::{FetchedContent, PageFetcher};
use pnj_scraper_lib::{RunRequest, RunSummary, ScrapeOrchestrator};

const SITE: &str = "https://www.pnj.com.vn";

/// Serves canned pages and records every requested URL
#[derive(Default)]
struct StaticFetcher {
    pages: HashMap<String, FetchedContent>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    fn page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), FetchedContent::Text(html));
        self
    }

    fn image(mut self, url: &str) -> Self {
        self.pages
            .insert(url.to_string(), FetchedContent::Bytes(b"\x89PNG fake".to_vec()));
        self
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str, _as_bytes: bool) -> FetchResult<FetchedContent> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}

fn listing(hrefs: &[&str]) -> String {
    let tiles: String = hrefs
        .iter()
        .map(|h| format!(r#"<div class="product-image"><a href="{h}"><img src="t.png"></a></div>"#))
        .collect();
    format!(r#"<html><body><div id="ajax_pagination_contents">{tiles}</div></body></html>"#)
}

fn product_page(data: Value) -> String {
    let blob = json!({"props": {"pageProps": {"dataServerSide": data}}});
    format!(r#"<html><head><script id="__NEXT_DATA__" type="application/json">{blob}</script></head></html>"#)
}

fn product(id: i64, category_id: i64, name: &str) -> Value {
    json!({
        "product_id": id,
        "product_code": format!("GN{id}"),
        "product": name,
        "price": 4_500_000,
        "status": "A",
        "amount": 2,
        "categories": [{"category_id": category_id, "category": "Nhẫn", "url": "/nhan/"}],
        "images": [
            format!("https://cdn.pnj.io/images/{id}-1.png"),
            format!("https://cdn.pnj.io/images/{id}-2.png"),
            format!("//cdn.pnj.io/images/{id}-3.png"),
        ],
        "features": [{"description": "Loại đá", "value": "Không"}],
        "size_price": {"10": 4_500_000, "11": 4_600_000}
    })
}

fn with_images(fetcher: StaticFetcher, id: i64) -> StaticFetcher {
    (1..=3).fold(fetcher, |f, n| f.image(&format!("https://cdn.pnj.io/images/{id}-{n}.png")))
}

fn config(root: &Path) -> ScraperConfig {
    ScraperConfig {
        output_root: root.to_path_buf(),
        enrichment_seed: Some(2024),
        ..ScraperConfig::default()
    }
}

async fn run(fetcher: Arc<StaticFetcher>, root: &Path, start: u32, end: u32) -> RunSummary {
    ScrapeOrchestrator::new(fetcher, config(root))
        .run(&RunRequest::new("nhan", start, end))
        .await
        .unwrap()
}

fn sql_of(summary: &RunSummary) -> String {
    std::fs::read_to_string(summary.sql_path.as_ref().unwrap()).unwrap()
}

#[tokio::test]
async fn two_products_end_to_end() {
    let fetcher = StaticFetcher::default()
        .page(&format!("{SITE}/nhan/page-1/"), listing(&["/nhan-a/", "/nhan-b/"]))
        .page(&format!("{SITE}/nhan-a/"), product_page(product(100_001, 12, "Nhẫn Vàng 18K")))
        .page(&format!("{SITE}/nhan-b/"), product_page(product(100_002, 30, "Nhẫn Bạc")));
    let fetcher = Arc::new(with_images(with_images(fetcher, 100_001), 100_002));
    let tmp = TempDir::new().unwrap();

    let summary = run(Arc::clone(&fetcher), tmp.path(), 1, 1).await;

    assert_eq!(summary.links_found, 2);
    assert_eq!(summary.records_extracted, 2);
    assert_eq!(summary.products, 2);
    assert_eq!(summary.images, 6);
    assert_eq!(summary.variants, 4);
    assert_eq!(summary.images_downloaded, 6);
    assert_eq!(summary.images_failed, 0);

    let sql = sql_of(&summary);
    assert_eq!(sql.matches("INSERT INTO products (").count(), 2);
    assert!(sql.matches("INSERT INTO categories (").count() <= 2);
    assert_eq!(sql.matches("INSERT INTO product_images (").count(), 6);
    assert!(sql.contains("SELECT 1 FROM products WHERE id = 100001)"));
    assert!(sql.contains("SELECT 1 FROM products WHERE id = 100002)"));
    assert!(sql.contains("'https://cdn.pnj.io/images/100002-3.png'"));

    let base = tmp.path().join("nhan");
    assert!(base.join("images/100001_1_100001-1.png").is_file());
    assert!(base.join("images/100002_3_100002-3.png").is_file());
    assert!(base.join("json/100001.json").is_file());
    assert!(summary.sql_path.unwrap().starts_with(base.join("sql")));
}

#[tokio::test]
async fn zero_padding_only_in_file_names() {
    let fetcher = StaticFetcher::default()
        .page(&format!("{SITE}/nhan/page-1/"), listing(&["/nhan-c/"]))
        .page(&format!("{SITE}/nhan-c/"), product_page(product(42, 12, "Nhẫn")));
    let fetcher = Arc::new(with_images(fetcher, 42));
    let tmp = TempDir::new().unwrap();

    let summary = run(fetcher, tmp.path(), 1, 1).await;

    let sql = sql_of(&summary);
    assert!(sql.contains("WHERE id = 42)"));
    assert!(!sql.contains("000042"));
    assert!(tmp.path().join("nhan/images/000042_1_42-1.png").is_file());
    assert!(tmp.path().join("nhan/json/000042.json").is_file());
}

#[tokio::test]
async fn page_without_embedded_data_contributes_nothing() {
    let fetcher = Arc::new(
        StaticFetcher::default()
            .page(&format!("{SITE}/nhan/page-1/"), listing(&["/nhan-a/", "/broken/"]))
            .page(&format!("{SITE}/nhan-a/"), product_page(product(100_001, 12, "Nhẫn")))
            .page(&format!("{SITE}/broken/"), "<html><body>no data</body></html>".to_string()),
    );
    let tmp = TempDir::new().unwrap();

    let summary = run(fetcher, tmp.path(), 1, 1).await;

    assert_eq!(summary.links_found, 2);
    assert_eq!(summary.records_extracted, 1);
    assert_eq!(summary.products, 1);
    assert_eq!(summary.images, 3);
    // images were not served, so every download fails without failing the run
    assert_eq!(summary.images_failed, 3);
    assert_eq!(sql_of(&summary).matches("INSERT INTO products (").count(), 1);
}

#[tokio::test]
async fn record_without_product_id_is_dropped() {
    let mut no_id = product(1, 12, "Nhẫn");
    no_id.as_object_mut().unwrap().remove("product_id");
    let fetcher = Arc::new(
        StaticFetcher::default()
            .page(&format!("{SITE}/nhan/page-1/"), listing(&["/no-id/"]))
            .page(&format!("{SITE}/no-id/"), product_page(no_id)),
    );
    let tmp = TempDir::new().unwrap();

    let summary = run(fetcher, tmp.path(), 1, 1).await;

    assert_eq!(summary.records_extracted, 1);
    assert_eq!(summary.products, 0);
    assert_eq!(summary.categories, 0);
    assert_eq!(summary.images, 0);
    assert!(!sql_of(&summary).contains("INSERT INTO"));
}

#[tokio::test]
async fn duplicate_links_across_pages_fetched_once() {
    let fetcher = Arc::new(
        StaticFetcher::default()
            .page(&format!("{SITE}/nhan/page-1/"), listing(&["/nhan-a/"]))
            .page(&format!("{SITE}/nhan/page-2/"), listing(&["/nhan-a/"]))
            .page(&format!("{SITE}/nhan-a/"), product_page(product(100_001, 12, "Nhẫn"))),
    );
    let tmp = TempDir::new().unwrap();

    let summary = run(Arc::clone(&fetcher), tmp.path(), 1, 3).await;

    assert_eq!(summary.pages_requested, 3);
    assert_eq!(summary.links_found, 1);
    let detail_fetches = fetcher
        .requested()
        .iter()
        .filter(|u| u.as_str() == format!("{SITE}/nhan-a/"))
        .count();
    assert_eq!(detail_fetches, 1);
}

#[tokio::test]
async fn skipping_images_fetches_no_images() {
    let fetcher = StaticFetcher::default()
        .page(&format!("{SITE}/nhan/page-1/"), listing(&["/nhan-a/"]))
        .page(&format!("{SITE}/nhan-a/"), product_page(product(100_001, 12, "Nhẫn")));
    let fetcher = Arc::new(with_images(fetcher, 100_001));
    let tmp = TempDir::new().unwrap();

    let config = ScraperConfig {
        download_images: false,
        write_json_snapshots: false,
        ..config(tmp.path())
    };
    let summary = ScrapeOrchestrator::new(Arc::clone(&fetcher) as Arc<dyn PageFetcher>, config)
        .run(&RunRequest::new("nhan", 1, 1))
        .await
        .unwrap();

    assert_eq!(summary.images, 3);
    assert_eq!(summary.images_downloaded, 0);
    assert!(fetcher.requested().iter().all(|u| !u.contains("cdn.pnj.io")));
    assert!(!tmp.path().join("nhan/json/100001.json").exists());
}
