pub mod api;
pub mod core;
pub mod extractors;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod templates;

// Re-export commonly used types
pub use crate::core::{AppConfig, FillStage, InputKind, ProcessingError, ProcessingResult};
pub use extractors::{extract_docx, extract_xml};
pub use models::{ExtractedDocxContent, ExtractedXmlRecord, FieldMap, ItemRecord};
pub use storage::LocalStorage;
pub use templates::{fill_template, PlaceholderMap};
