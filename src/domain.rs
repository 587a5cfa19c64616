//! Domain layer: raw records, relational rows and per-run state

pub mod product;
pub mod product_parts;
pub mod raw_record;
pub mod run_context;

pub use product::{Gender, Material, ProductRow, ProductStatus};
pub use product_parts::{CategoryRow, FeatureRow, ImageRow, SIZE_VARIANT_TYPE, VariantRow};
pub use raw_record::RawProductRecord;
pub use run_context::{ProjectedProduct, RowSets, RunContext, RunPhase, RunSummary};
