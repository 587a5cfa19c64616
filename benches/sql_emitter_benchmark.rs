//! SQL script emission throughput for catalog-sized runs

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use pnj_scraper_lib::domain::{
    CategoryRow, FeatureRow, Gender, ImageRow, Material, ProductRow, ProductStatus, VariantRow,
};
use pnj_scraper_lib::infrastructure::sql_emitter::emit;

struct Rows {
    products: Vec<ProductRow>,
    categories: Vec<CategoryRow>,
    images: Vec<ImageRow>,
    features: Vec<FeatureRow>,
    variants: Vec<VariantRow>,
}

fn rows(count: i64) -> Rows {
    let ids = 100_000..100_000 + count;
    Rows {
        products: ids
            .clone()
            .map(|id| ProductRow {
                id,
                name: format!("Nhẫn Vàng 18K {id}"),
                code: format!("GNXMXMY{id}"),
                description: "Nhẫn cưới vàng 18K đính đá ECZ".into(),
                price: 5_000_000 + id,
                status: ProductStatus::Active,
                quantity: 3,
                category_id: Some(id % 7),
                material: Material::Gold,
                gold_karat: Some(18),
                color: "Yellow".into(),
                brand: "PNJ".into(),
                gender: Gender::Female,
                created_at: "2024-05-01 10:00:00".into(),
                updated_at: "2024-05-01 10:00:00".into(),
            })
            .collect(),
        categories: ids
            .clone()
            .map(|id| CategoryRow {
                id: id % 7,
                name: format!("Danh mục {}", id % 7),
                url: format!("/danh-muc-{}/", id % 7),
            })
            .collect(),
        images: ids
            .clone()
            .flat_map(|id| {
                (1..=4).map(move |n| ImageRow {
                    product_id: id,
                    image_url: format!("https://cdn.pnj.io/images/{id}-{n}.png"),
                    is_primary: n == 1,
                    sort_order: n,
                })
            })
            .collect(),
        features: ids
            .clone()
            .map(|id| FeatureRow {
                product_id: id,
                name: "Loại đá".into(),
                value: "ECZ".into(),
            })
            .collect(),
        variants: ids
            .flat_map(|id| (8..14).map(move |size| VariantRow::size(id, size.to_string(), 5_000_000, 3)))
            .collect(),
    }
}

fn bench_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_emit");
    for count in [20_i64, 200, 1_000] {
        let rows = rows(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &rows, |b, rows| {
            b.iter(|| {
                black_box(emit(
                    &rows.products,
                    &rows.categories,
                    &rows.images,
                    &rows.features,
                    &rows.variants,
                ))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_emit);
criterion_main!(benches);
