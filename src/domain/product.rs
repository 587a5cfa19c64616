use serde::{Deserialize, Serialize};
use std::fmt;

/// Listing status derived from the source status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Active,
    Inactive,
}

impl ProductStatus {
    /// `"A"` means active; every other code (or none) is inactive
    pub fn from_source_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("A") => Self::Active,
            _ => Self::Inactive,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }
}

/// Jewelry material; an enrichment field, not scraped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Gold,
    Silver,
    Platinum,
    Diamond,
    Pearl,
    Gemstone,
    Alloy,
}

impl Material {
    pub const ALL: [Self; 7] = [
        Self::Gold,
        Self::Silver,
        Self::Platinum,
        Self::Diamond,
        Self::Pearl,
        Self::Gemstone,
        Self::Alloy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gold => "Gold",
            Self::Silver => "Silver",
            Self::Platinum => "Platinum",
            Self::Diamond => "Diamond",
            Self::Pearl => "Pearl",
            Self::Gemstone => "Gemstone",
            Self::Alloy => "Alloy",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target audience, stored as 0/1/2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Unisex = 0,
    Male = 1,
    Female = 2,
}

impl Gender {
    pub const ALL: [Self; 3] = [Self::Unisex, Self::Male, Self::Female];

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// One row of the `products` table.
///
/// Text fields hold SQL-ready text (single quotes already doubled).
/// `gold_karat` is only set when `material` is Gold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: String,
    pub price: i64,
    pub status: ProductStatus,
    pub quantity: i64,
    pub category_id: Option<i64>,
    pub material: Material,
    pub gold_karat: Option<u8>,
    pub color: String,
    pub brand: String,
    pub gender: Gender,
    pub created_at: String,
    pub updated_at: String,
}
