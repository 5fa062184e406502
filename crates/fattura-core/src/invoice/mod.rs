//! Invoice record extraction module.

mod extractor;
pub mod fields;
pub mod rules;

pub use extractor::{FieldReport, RecordExtractor};

use crate::document::Document;
use crate::error::ExtractionError;
use crate::models::invoice::InvoiceRecord;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for invoice record extractors.
pub trait InvoiceExtractor {
    /// Whether the document has the root element this extractor understands.
    fn recognizes(&self, document: &Document) -> bool;

    /// Build a fully populated record from a parsed document.
    fn extract(&self, document: &Document) -> Result<InvoiceRecord>;
}
