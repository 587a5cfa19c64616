//! Rows that hang off a product: categories, images, features and size variants.
//! Text fields hold SQL-ready text (single quotes already doubled).

use serde::Serialize;

/// Variant type recorded for every size/price entry
pub const SIZE_VARIANT_TYPE: &str = "SIZE";

/// Identity: `id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub url: String,
}

/// Identity: `(product_id, image_url)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRow {
    pub product_id: i64,
    pub image_url: String,
    pub is_primary: bool,
    /// 1-based position in source order
    pub sort_order: u32,
}

/// Identity: `(product_id, name)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureRow {
    pub product_id: i64,
    pub name: String,
    pub value: String,
}

/// Identity: `(product_id, variant_type, variant_value)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantRow {
    pub product_id: i64,
    pub variant_type: String,
    pub variant_value: String,
    pub price: i64,
    /// Copied from the product's on-hand quantity; the source has no per-size stock
    pub quantity: i64,
}

impl VariantRow {
    pub fn size(product_id: i64, size: String, price: i64, quantity: i64) -> Self {
        Self {
            product_id,
            variant_type: SIZE_VARIANT_TYPE.to_string(),
            variant_value: size,
            price,
            quantity,
        }
    }
}
