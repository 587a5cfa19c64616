//! Applies emitted upsert plans to a modelled database and checks that
//! re-running with the same rows leaves the same final state.

use std::collections::{BTreeMap, HashMap};

use pnj_scraper_lib::domain::{
    CategoryRow, FeatureRow, Gender, ImageRow, Material, ProductRow, ProductStatus, VariantRow,
};
use pnj_scraper_lib::infrastructure::sql_emitter::{SqlValue, UpsertPlan, plan};

type Row = BTreeMap<&'static str, SqlValue>;

/// table -> rendered key -> row
#[derive(Debug, Default, Clone, PartialEq)]
struct ModelDb {
    tables: HashMap<&'static str, BTreeMap<String, Row>>,
}

impl ModelDb {
    fn apply(&mut self, plan: &UpsertPlan) {
        for block in &plan.blocks {
            let key = block
                .key
                .iter()
                .map(|(col, val)| format!("{col}={val}"))
                .collect::<Vec<_>>()
                .join("&");
            let table = self.tables.entry(block.table).or_default();
            match table.get_mut(&key) {
                Some(row) => {
                    for (col, val) in &block.update {
                        row.insert(*col, val.clone());
                    }
                }
                None => {
                    let row: Row = block
                        .key
                        .iter()
                        .chain(block.insert.iter())
                        .map(|(col, val)| (*col, val.clone()))
                        .collect();
                    table.insert(key, row);
                }
            }
        }
    }

    fn count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, BTreeMap::len)
    }
}

fn product(id: i64, price: i64, updated_at: &str) -> ProductRow {
    ProductRow {
        id,
        name: format!("Nhẫn {id}"),
        code: format!("GN{id}"),
        description: "Nhẫn cưới".into(),
        price,
        status: ProductStatus::Active,
        quantity: 1,
        category_id: Some(12),
        material: Material::Gold,
        gold_karat: Some(18),
        color: "Yellow".into(),
        brand: "PNJ".into(),
        gender: Gender::Unisex,
        created_at: "2024-05-01 10:00:00".into(),
        updated_at: updated_at.into(),
    }
}

struct Rows {
    products: Vec<ProductRow>,
    categories: Vec<CategoryRow>,
    images: Vec<ImageRow>,
    features: Vec<FeatureRow>,
    variants: Vec<VariantRow>,
}

impl Rows {
    fn sample(price: i64, updated_at: &str) -> Self {
        Self {
            products: vec![product(100_001, price, updated_at), product(100_002, price, updated_at)],
            categories: vec![
                CategoryRow { id: 12, name: "Nhẫn".into(), url: "/nhan/".into() },
                CategoryRow { id: 12, name: "Nhẫn cưới".into(), url: "/nhan-cuoi/".into() },
            ],
            images: vec![ImageRow {
                product_id: 100_001,
                image_url: "https://cdn.pnj.io/a.png".into(),
                is_primary: true,
                sort_order: 1,
            }],
            features: vec![FeatureRow { product_id: 100_001, name: "Loại đá".into(), value: "Không".into() }],
            variants: vec![VariantRow::size(100_001, "10".into(), price, 1)],
        }
    }

    fn plan(&self) -> UpsertPlan {
        plan(&self.products, &self.categories, &self.images, &self.features, &self.variants)
    }
}

#[test]
fn same_rows_twice_same_state() {
    let rows = Rows::sample(5_000_000, "2024-05-01 10:00:00");
    let mut db = ModelDb::default();

    db.apply(&rows.plan());
    let after_first = db.clone();
    db.apply(&rows.plan());

    assert_eq!(db, after_first);
    assert_eq!(db.count("products"), 2);
    assert_eq!(db.count("categories"), 1);
    assert_eq!(db.count("product_images"), 1);
    assert_eq!(db.count("product_features"), 1);
    assert_eq!(db.count("product_variants"), 1);
}

#[test]
fn rerun_updates_mutable_fields_only() {
    let mut db = ModelDb::default();
    db.apply(&Rows::sample(5_000_000, "2024-05-01 10:00:00").plan());

    let mut changed = Rows::sample(5_500_000, "2024-06-01 08:00:00");
    changed.products[0].code = "CHANGED".into();
    changed.products[0].created_at = "2030-01-01 00:00:00".into();
    db.apply(&changed.plan());

    let row = &db.tables["products"]["id=100001"];
    assert_eq!(row["price"], SqlValue::Int(5_500_000));
    assert_eq!(row["updated_at"], SqlValue::text("2024-06-01 08:00:00"));
    assert_eq!(row["code"], SqlValue::text("GN100001"));
    assert_eq!(row["created_at"], SqlValue::text("2024-05-01 10:00:00"));
    assert_eq!(db.count("products"), 2);
}

#[test]
fn last_category_occurrence_wins() {
    let mut db = ModelDb::default();
    db.apply(&Rows::sample(1, "t").plan());

    let category = &db.tables["categories"]["id=12"];
    assert_eq!(category["name"], SqlValue::text("Nhẫn cưới"));
    assert_eq!(category["url"], SqlValue::text("/nhan-cuoi/"));
}

#[test]
fn plan_order_and_guards() {
    let plan = Rows::sample(1, "t").plan();
    assert_eq!(plan.constraints.len(), 5);

    let tables: Vec<&str> = plan.blocks.iter().map(|b| b.table).collect();
    let mut sorted = tables.clone();
    let rank = |t: &str| ["categories", "products", "product_images", "product_features", "product_variants"]
        .iter()
        .position(|x| *x == t)
        .unwrap();
    sorted.sort_by_key(|t| rank(*t));
    assert_eq!(tables, sorted);
}
