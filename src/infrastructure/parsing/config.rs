//! Parsing configuration for HTML extraction
//!
//! Centralized CSS selectors for the PNJ listing and product pages.

use serde::{Deserialize, Serialize};

use crate::infrastructure::config::pnj;

/// CSS selectors for listing pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListSelectors {
    /// The product grid container
    pub container: String,

    /// One element per product tile, inside the container
    pub product_image: String,

    /// Link to the product page, inside a product tile
    pub product_link: String,
}

impl Default for ProductListSelectors {
    fn default() -> Self {
        Self {
            container: format!("div#{}", pnj::LISTING_CONTAINER_ID),
            product_image: "div.product-image".to_string(),
            product_link: "a[href]".to_string(),
        }
    }
}

/// CSS selectors for product pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetailSelectors {
    /// Script element carrying the server-rendered JSON blob
    pub embedded_data_script: String,
}

impl Default for ProductDetailSelectors {
    fn default() -> Self {
        Self {
            embedded_data_script: format!("script#{}", pnj::NEXT_DATA_SCRIPT_ID),
        }
    }
}
