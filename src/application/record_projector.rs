//! Projection of raw product records into relational rows
//!
//! Each projection works on its own part of the record and degrades on its
//! own: a malformed part is logged and yields an empty or partial result
//! without affecting the others. Only a missing product id drops the whole
//! record, since every row keys on it.

#![allow(clippy::uninlined_format_args)]

use chrono::Local;
use serde_json::Value;
use tracing::{debug, warn};

use super::field_synthesizer::{EnrichmentSource, FieldSynthesizer};
use crate::domain::raw_record::{as_i64, as_text, lookup};
use crate::domain::{
    CategoryRow, FeatureRow, ImageRow, ProductRow, ProductStatus, ProjectedProduct, RawProductRecord, VariantRow,
};
use crate::infrastructure::config::utils::resolve_url;

/// Wall-clock format shared by `created_at` and `updated_at`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Double single quotes so the text can sit inside a SQL string literal.
/// This is the only escaping applied.
pub fn sanitize_text(text: Option<&str>) -> String {
    text.map(|t| t.replace('\'', "''")).unwrap_or_default()
}

pub fn projection_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Image rows for already-resolved URLs: first is primary, `sort_order` counts from 1
pub fn image_rows(product_id: i64, urls: &[String]) -> Vec<ImageRow> {
    urls.iter()
        .enumerate()
        .map(|(index, url)| ImageRow {
            product_id,
            image_url: sanitize_text(Some(url)),
            is_primary: index == 0,
            sort_order: (index + 1) as u32,
        })
        .collect()
}

fn text_field(record: &RawProductRecord, key: &str) -> Option<String> {
    record.product_text(key).ok()
}

fn text_in(entry: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| lookup(entry, key).ok().and_then(|v| as_text(v, key).ok()))
}

/// Integer field with `0` for absent or unreadable values
fn int_or_zero(record: &RawProductRecord, key: &str) -> i64 {
    match record.product_field(key) {
        Ok(Value::Number(n)) if n.as_i64().is_none() => n.as_f64().map(|f| f.round() as i64).unwrap_or_default(),
        Ok(value) => as_i64(value, key).unwrap_or_else(|e| {
            debug!("{} on {}: {}, using 0", key, record.source_url(), e);
            0
        }),
        Err(_) => 0,
    }
}

pub struct RecordProjector {
    base_url: String,
}

impl RecordProjector {
    /// `base_url` resolves site-relative image paths
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// All five projections for one record; `None` when the record has no product id
    pub fn project<R: EnrichmentSource>(
        &self,
        record: &RawProductRecord,
        synthesizer: &mut FieldSynthesizer<R>,
        timestamp: &str,
    ) -> Option<ProjectedProduct> {
        let product = self.project_product(record, synthesizer, timestamp)?;
        let id = product.id;
        let quantity = product.quantity;

        Some(ProjectedProduct {
            categories: self.project_categories(record),
            images: self.project_images(record, id),
            features: self.project_features(record, id),
            variants: self.project_variants(record, id, quantity),
            product,
        })
    }

    pub fn project_product<R: EnrichmentSource>(
        &self,
        record: &RawProductRecord,
        synthesizer: &mut FieldSynthesizer<R>,
        timestamp: &str,
    ) -> Option<ProductRow> {
        let id = match record.product_i64("product_id") {
            Ok(id) => id,
            Err(e) => {
                warn!("Dropping record from {}: no product id ({})", record.source_url(), e);
                return None;
            }
        };

        let raw_name = text_field(record, "product").unwrap_or_default();
        let description = text_field(record, "full_description").or_else(|| text_field(record, "short_description"));
        let status = ProductStatus::from_source_code(text_field(record, "status").as_deref());
        let category_id = record
            .product_field("categories.0.category_id")
            .and_then(|v| as_i64(v, "category_id"))
            .ok();

        let material = synthesizer.material(&raw_name);
        let gold_karat = synthesizer.gold_karat(material);
        let color = synthesizer.color(material);
        let brand = synthesizer.brand();
        let gender = synthesizer.gender();

        Some(ProductRow {
            id,
            name: sanitize_text(Some(&raw_name)),
            code: sanitize_text(text_field(record, "product_code").as_deref()),
            description: sanitize_text(description.as_deref()),
            price: int_or_zero(record, "price"),
            status,
            quantity: int_or_zero(record, "amount"),
            category_id,
            material,
            gold_karat,
            color: color.to_string(),
            brand: sanitize_text(Some(brand)),
            gender,
            created_at: timestamp.to_string(),
            updated_at: timestamp.to_string(),
        })
    }

    pub fn project_categories(&self, record: &RawProductRecord) -> Vec<CategoryRow> {
        let entries = match record.product_array("categories") {
            Ok(entries) => entries,
            Err(e) => {
                warn!("No categories on {}: {}", record.source_url(), e);
                return Vec::new();
            }
        };

        entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let id = lookup(entry, "category_id").and_then(|v| as_i64(v, "category_id"));
                match id {
                    Ok(id) => Some(CategoryRow {
                        id,
                        name: sanitize_text(text_in(entry, &["category"]).as_deref()),
                        url: sanitize_text(text_in(entry, &["url"]).as_deref()),
                    }),
                    Err(e) => {
                        warn!("Skipping category #{} on {}: {}", index, record.source_url(), e);
                        None
                    }
                }
            })
            .collect()
    }

    pub fn project_images(&self, record: &RawProductRecord, product_id: i64) -> Vec<ImageRow> {
        let entries = match record.product_array("images") {
            Ok(entries) => entries,
            Err(e) => {
                warn!("No images for product {}: {}", product_id, e);
                return Vec::new();
            }
        };

        let urls: Vec<String> = entries
            .iter()
            .filter_map(|entry| {
                let path = match entry {
                    Value::String(s) => Some(s.clone()),
                    other => text_in(other, &["image_path"]),
                };
                let resolved = path.as_deref().and_then(|p| resolve_url(&self.base_url, p));
                if resolved.is_none() {
                    warn!("Skipping unusable image entry for product {}: {}", product_id, entry);
                }
                resolved
            })
            .collect();

        image_rows(product_id, &urls)
    }

    pub fn project_features(&self, record: &RawProductRecord, product_id: i64) -> Vec<FeatureRow> {
        let entries = match record.product_array("features") {
            Ok(entries) => entries,
            Err(e) => {
                debug!("No features for product {}: {}", product_id, e);
                return Vec::new();
            }
        };

        entries
            .iter()
            .filter_map(|entry| match text_in(entry, &["description", "name"]) {
                Some(name) => Some(FeatureRow {
                    product_id,
                    name: sanitize_text(Some(&name)),
                    value: sanitize_text(text_in(entry, &["value", "variant"]).as_deref()),
                }),
                None => {
                    warn!("Skipping unnamed feature for product {}", product_id);
                    None
                }
            })
            .collect()
    }

    /// One SIZE variant per size/price pair; stock is the product's own quantity
    pub fn project_variants(&self, record: &RawProductRecord, product_id: i64, quantity: i64) -> Vec<VariantRow> {
        let sizes = match record.product_object("size_price") {
            Ok(sizes) => sizes,
            Err(e) => {
                debug!("No size/price mapping for product {}: {}", product_id, e);
                return Vec::new();
            }
        };

        sizes
            .iter()
            .map(|(size, price)| {
                let price = as_i64(price, size).unwrap_or_else(|e| {
                    warn!("Size {} of product {} has no usable price: {}", size, product_id, e);
                    0
                });
                VariantRow::size(product_id, sanitize_text(Some(size)), price, quantity)
            })
            .collect()
    }
}
