//! SQL script emitter
//!
//! Turns the run's row sets into one transactional PostgreSQL script made of
//! guarded blocks: insert the row when its identity is absent, otherwise
//! update its mutable columns. The script targets contexts without native
//! upsert support, so each row is an `IF NOT EXISTS … INSERT … ELSE UPDATE`
//! `DO` block rather than `ON CONFLICT`.
//!
//! Text values are expected to be quote-doubled already; the emitter only
//! wraps them in single quotes.

#![allow(clippy::uninlined_format_args)]

use chrono::Local;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::{self, Write};

use crate::domain::{CategoryRow, FeatureRow, ImageRow, ProductRow, VariantRow};

pub const CATEGORIES_TABLE: &str = "categories";
pub const PRODUCTS_TABLE: &str = "products";
pub const IMAGES_TABLE: &str = "product_images";
pub const FEATURES_TABLE: &str = "product_features";
pub const VARIANTS_TABLE: &str = "product_variants";

/// Base name of the dollar-quote tag around `DO` bodies
const DO_TAG_NAME: &str = "pnj";

/// A literal in the emitted script
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum SqlValue {
    Int(i64),
    /// Already quote-doubled text
    Text(String),
    Bool(bool),
    Null,
}

impl SqlValue {
    pub fn text(value: &str) -> Self {
        Self::Text(value.to_string())
    }

    pub fn opt_int(value: Option<i64>) -> Self {
        value.map_or(Self::Null, Self::Int)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "'{}'", s),
            Self::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            Self::Null => f.write_str("NULL"),
        }
    }
}

type Columns = Vec<(&'static str, SqlValue)>;

/// Uniqueness constraint added (once) ahead of the row blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintGuard {
    pub name: &'static str,
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

/// One existence-checked insert-or-update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsertBlock {
    pub table: &'static str,
    /// Identity columns, used in the existence check and the update's WHERE
    pub key: Columns,
    /// Non-key columns written on insert
    pub insert: Columns,
    /// Columns rewritten when the row already exists
    pub update: Columns,
}

impl UpsertBlock {
    fn where_clause(&self) -> String {
        self.key
            .iter()
            .map(|(col, val)| format!("{} = {}", col, val))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Comment label; text keys are left out so scraped text never lands
    /// outside a quoted literal
    fn label(&self) -> String {
        let ids = self
            .key
            .iter()
            .filter_map(|(col, val)| match val {
                SqlValue::Int(n) => Some(format!("{}={}", col, n)),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} ({})", self.table, ids)
    }
}

/// Everything the script will do, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsertPlan {
    pub constraints: Vec<ConstraintGuard>,
    pub blocks: Vec<UpsertBlock>,
}

impl UpsertPlan {
    pub fn blocks_for(&self, table: &str) -> impl Iterator<Item = &UpsertBlock> {
        self.blocks.iter().filter(move |b| b.table == table)
    }
}

pub const CONSTRAINTS: [ConstraintGuard; 5] = [
    ConstraintGuard {
        name: "uq_categories_id",
        table: CATEGORIES_TABLE,
        columns: &["id"],
    },
    ConstraintGuard {
        name: "uq_products_id",
        table: PRODUCTS_TABLE,
        columns: &["id"],
    },
    ConstraintGuard {
        name: "uq_product_images_product_url",
        table: IMAGES_TABLE,
        columns: &["product_id", "image_url"],
    },
    ConstraintGuard {
        name: "uq_product_features_product_name",
        table: FEATURES_TABLE,
        columns: &["product_id", "name"],
    },
    ConstraintGuard {
        name: "uq_product_variants_identity",
        table: VARIANTS_TABLE,
        columns: &["product_id", "variant_type", "variant_value"],
    },
];

/// Deduplicate categories by id: the last occurrence's values win, the first
/// occurrence's position is kept
pub fn dedupe_categories(categories: &[CategoryRow]) -> Vec<CategoryRow> {
    let mut position: HashMap<i64, usize> = HashMap::new();
    let mut unique: Vec<CategoryRow> = Vec::new();
    for category in categories {
        match position.get(&category.id) {
            Some(&i) => unique[i] = category.clone(),
            None => {
                position.insert(category.id, unique.len());
                unique.push(category.clone());
            }
        }
    }
    unique
}

fn category_block(row: &CategoryRow) -> UpsertBlock {
    let mutable = vec![("name", SqlValue::text(&row.name)), ("url", SqlValue::text(&row.url))];
    UpsertBlock {
        table: CATEGORIES_TABLE,
        key: vec![("id", SqlValue::Int(row.id))],
        insert: mutable.clone(),
        update: mutable,
    }
}

fn product_block(row: &ProductRow) -> UpsertBlock {
    let karat = SqlValue::opt_int(row.gold_karat.map(i64::from));
    let gender = SqlValue::Int(i64::from(row.gender.code()));
    let insert = vec![
        ("name", SqlValue::text(&row.name)),
        ("code", SqlValue::text(&row.code)),
        ("description", SqlValue::text(&row.description)),
        ("price", SqlValue::Int(row.price)),
        ("status", SqlValue::text(row.status.as_str())),
        ("quantity", SqlValue::Int(row.quantity)),
        ("category_id", SqlValue::opt_int(row.category_id)),
        ("material", SqlValue::text(row.material.as_str())),
        ("gold_karat", karat.clone()),
        ("color", SqlValue::text(&row.color)),
        ("brand", SqlValue::text(&row.brand)),
        ("gender", gender.clone()),
        ("created_at", SqlValue::text(&row.created_at)),
        ("updated_at", SqlValue::text(&row.updated_at)),
    ];
    // id, code and created_at are fixed once inserted
    let update = vec![
        ("name", SqlValue::text(&row.name)),
        ("price", SqlValue::Int(row.price)),
        ("status", SqlValue::text(row.status.as_str())),
        ("quantity", SqlValue::Int(row.quantity)),
        ("material", SqlValue::text(row.material.as_str())),
        ("gold_karat", karat),
        ("color", SqlValue::text(&row.color)),
        ("brand", SqlValue::text(&row.brand)),
        ("gender", gender),
        ("updated_at", SqlValue::text(&row.updated_at)),
    ];
    UpsertBlock {
        table: PRODUCTS_TABLE,
        key: vec![("id", SqlValue::Int(row.id))],
        insert,
        update,
    }
}

fn image_block(row: &ImageRow) -> UpsertBlock {
    let mutable = vec![
        ("is_primary", SqlValue::Bool(row.is_primary)),
        ("sort_order", SqlValue::Int(i64::from(row.sort_order))),
    ];
    UpsertBlock {
        table: IMAGES_TABLE,
        key: vec![
            ("product_id", SqlValue::Int(row.product_id)),
            ("image_url", SqlValue::text(&row.image_url)),
        ],
        insert: mutable.clone(),
        update: mutable,
    }
}

fn feature_block(row: &FeatureRow) -> UpsertBlock {
    let mutable = vec![("value", SqlValue::text(&row.value))];
    UpsertBlock {
        table: FEATURES_TABLE,
        key: vec![
            ("product_id", SqlValue::Int(row.product_id)),
            ("name", SqlValue::text(&row.name)),
        ],
        insert: mutable.clone(),
        update: mutable,
    }
}

fn variant_block(row: &VariantRow) -> UpsertBlock {
    let mutable = vec![("price", SqlValue::Int(row.price)), ("quantity", SqlValue::Int(row.quantity))];
    UpsertBlock {
        table: VARIANTS_TABLE,
        key: vec![
            ("product_id", SqlValue::Int(row.product_id)),
            ("variant_type", SqlValue::text(&row.variant_type)),
            ("variant_value", SqlValue::text(&row.variant_value)),
        ],
        insert: mutable.clone(),
        update: mutable,
    }
}

/// Build the ordered plan: categories, products, images, features, variants
pub fn plan(
    products: &[ProductRow],
    categories: &[CategoryRow],
    images: &[ImageRow],
    features: &[FeatureRow],
    variants: &[VariantRow],
) -> UpsertPlan {
    let mut blocks = Vec::with_capacity(products.len() + categories.len() + images.len() + features.len() + variants.len());
    blocks.extend(dedupe_categories(categories).iter().map(category_block));
    blocks.extend(products.iter().map(product_block));
    blocks.extend(images.iter().map(image_block));
    blocks.extend(features.iter().map(feature_block));
    blocks.extend(variants.iter().map(variant_block));

    UpsertPlan {
        constraints: CONSTRAINTS.to_vec(),
        blocks,
    }
}

/// Dollar-quote tag that does not occur anywhere in `body`
fn dollar_tag(body: &str) -> String {
    let base = format!("${}$", DO_TAG_NAME);
    if !body.contains(&base) {
        return base;
    }
    (1u32..)
        .map(|n| format!("${}{}$", DO_TAG_NAME, n))
        .find(|tag| !body.contains(tag.as_str()))
        .unwrap_or(base)
}

fn write_do(out: &mut String, body: &str) -> fmt::Result {
    let tag = dollar_tag(body);
    writeln!(out, "DO {}", tag)?;
    out.push_str(body);
    writeln!(out, "END {};", tag)
}

fn write_constraint(out: &mut String, guard: &ConstraintGuard) -> fmt::Result {
    let mut body = String::new();
    writeln!(body, "BEGIN")?;
    writeln!(
        body,
        "    IF NOT EXISTS (SELECT 1 FROM pg_constraint WHERE conname = '{}') THEN",
        guard.name
    )?;
    writeln!(
        body,
        "        ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({});",
        guard.table,
        guard.name,
        guard.columns.join(", ")
    )?;
    writeln!(body, "    END IF;")?;
    writeln!(body, "EXCEPTION WHEN others THEN")?;
    writeln!(body, "    RAISE NOTICE 'Skipping constraint {}: %', SQLERRM;", guard.name)?;
    write_do(out, &body)
}

fn write_block(out: &mut String, block: &UpsertBlock) -> fmt::Result {
    let where_clause = block.where_clause();
    let (columns, values): (Vec<&str>, Vec<String>) = block
        .key
        .iter()
        .chain(block.insert.iter())
        .map(|(col, val)| (*col, val.to_string()))
        .unzip();
    let assignments = block
        .update
        .iter()
        .map(|(col, val)| format!("{} = {}", col, val))
        .collect::<Vec<_>>()
        .join(", ");

    let mut body = String::new();
    writeln!(body, "BEGIN")?;
    writeln!(
        body,
        "    IF NOT EXISTS (SELECT 1 FROM {} WHERE {}) THEN",
        block.table, where_clause
    )?;
    writeln!(
        body,
        "        INSERT INTO {} ({}) VALUES ({});",
        block.table,
        columns.join(", "),
        values.join(", ")
    )?;
    if !assignments.is_empty() {
        writeln!(body, "    ELSE")?;
        writeln!(body, "        UPDATE {} SET {} WHERE {};", block.table, assignments, where_clause)?;
    }
    writeln!(body, "    END IF;")?;

    writeln!(out, "-- {}", block.label())?;
    write_do(out, &body)
}

fn write_script(out: &mut String, plan: &UpsertPlan, generated_at: &str) -> fmt::Result {
    writeln!(out, "-- Generated by pnj-scraper at {}", generated_at)?;
    for table in [CATEGORIES_TABLE, PRODUCTS_TABLE, IMAGES_TABLE, FEATURES_TABLE, VARIANTS_TABLE] {
        writeln!(out, "-- {}: {} rows", table, plan.blocks_for(table).count())?;
    }
    writeln!(out)?;
    writeln!(out, "BEGIN;")?;
    writeln!(out)?;

    for guard in &plan.constraints {
        write_constraint(out, guard)?;
        writeln!(out)?;
    }

    for block in &plan.blocks {
        write_block(out, block)?;
        writeln!(out)?;
    }

    writeln!(out, "COMMIT;")
}

/// Render a plan to script text
pub fn render(plan: &UpsertPlan, generated_at: &str) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_script(&mut out, plan, generated_at);
    out
}

/// Build and render the full script, stamped with the current local time
pub fn emit(
    products: &[ProductRow],
    categories: &[CategoryRow],
    images: &[ImageRow],
    features: &[FeatureRow],
    variants: &[VariantRow],
) -> String {
    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    render(&plan(products, categories, images, features, variants), &generated_at)
}
