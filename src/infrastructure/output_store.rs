//! Per-run output layout
//!
//! ```text
//! {output_root}/{item_type}/
//!     json/    raw record snapshots, {id:06}.json
//!     images/  {id:06}_{sort_order}_{basename}
//!     sql/     {item_type}_{YYYYMMDD_HHMMSS}.sql
//! ```

#![allow(clippy::uninlined_format_args)]

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::errors::PersistenceError;
use crate::domain::RawProductRecord;

/// File name for a downloaded image: zero-padded product id, position, URL basename
pub fn image_file_name(product_id: i64, sort_order: u32, image_url: &str) -> String {
    format!("{:06}_{}_{}", product_id, sort_order, url_basename(image_url))
}

/// Last path segment of a URL, without query or fragment
fn url_basename(image_url: &str) -> String {
    let from_url = url::Url::parse(image_url).ok().and_then(|u| {
        u.path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
    });

    let raw = from_url.unwrap_or_else(|| {
        let without_query = image_url.split(['?', '#']).next().unwrap_or_default();
        without_query.rsplit('/').next().unwrap_or_default().to_string()
    });

    if raw.is_empty() { "image".to_string() } else { raw }
}

#[derive(Debug, Clone)]
pub struct OutputStore {
    item_type: String,
    base_dir: PathBuf,
}

impl OutputStore {
    pub fn new(output_root: impl AsRef<Path>, item_type: &str) -> Self {
        Self {
            item_type: item_type.to_string(),
            base_dir: output_root.as_ref().join(item_type),
        }
    }

    pub fn json_dir(&self) -> PathBuf {
        self.base_dir.join("json")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.base_dir.join("images")
    }

    pub fn sql_dir(&self) -> PathBuf {
        self.base_dir.join("sql")
    }

    /// Create the three output directories; failure here ends the run
    pub async fn prepare(&self) -> Result<(), PersistenceError> {
        for dir in [self.json_dir(), self.images_dir(), self.sql_dir()] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|source| PersistenceError::CreateDir { path: dir.clone(), source })?;
            debug!("Output directory ready: {}", dir.display());
        }
        Ok(())
    }

    pub fn sql_path(&self, at: DateTime<Local>) -> PathBuf {
        self.sql_dir()
            .join(format!("{}_{}.sql", self.item_type, at.format("%Y%m%d_%H%M%S")))
    }

    /// Write the run's SQL script, returning its path
    pub async fn write_sql(&self, script: &str, at: DateTime<Local>) -> Result<PathBuf, PersistenceError> {
        let path = self.sql_path(at);
        tokio::fs::write(&path, script)
            .await
            .map_err(|source| PersistenceError::Write { path: path.clone(), source })?;
        info!("SQL script written to {} ({} bytes)", path.display(), script.len());
        Ok(path)
    }

    pub async fn write_image(
        &self,
        product_id: i64,
        sort_order: u32,
        image_url: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, PersistenceError> {
        let path = self.images_dir().join(image_file_name(product_id, sort_order, image_url));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| PersistenceError::Write { path: path.clone(), source })?;
        debug!("Image saved: {}", path.display());
        Ok(path)
    }

    pub async fn write_json_snapshot(
        &self,
        product_id: i64,
        record: &RawProductRecord,
    ) -> Result<PathBuf, PersistenceError> {
        let path = self.json_dir().join(format!("{:06}.json", product_id));
        let body = serde_json::to_vec_pretty(record.root()).map_err(|source| PersistenceError::Serialize {
            what: format!("record {}", product_id),
            source,
        })?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|source| PersistenceError::Write { path: path.clone(), source })?;
        Ok(path)
    }
}
