//! Application layer
//!
//! The pipeline stages and the orchestrator that runs them in order.

pub mod detail_extractor;
pub mod field_synthesizer;
pub mod link_collector;
pub mod orchestrator;
pub mod record_projector;

pub use detail_extractor::DetailExtractor;
pub use field_synthesizer::{EnrichmentSource, FieldSynthesizer};
pub use link_collector::LinkCollector;
pub use orchestrator::{RunRequest, ScrapeOrchestrator};
pub use record_projector::{RecordProjector, sanitize_text};
