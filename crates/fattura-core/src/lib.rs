//! Core library for FatturaPA electronic invoice extraction.
//!
//! This crate provides:
//! - Namespace-tolerant parsing of FatturaPA XML documents
//! - Extraction of supplier, document and payment fields into typed records
//! - Batch processing of document trees with date filtering and failure isolation
//! - Per-supplier payment aggregation and an export adapter interface

pub mod aggregate;
pub mod batch;
pub mod document;
pub mod error;
pub mod export;
pub mod invoice;
pub mod models;

pub use aggregate::{aggregate, sort_totals};
pub use batch::{
    BatchObserver, BatchResult, BatchStats, BatchWalker, DateRange, DocumentFailure,
    DocumentSource, DocumentStatus, ExtractionOutcome, InMemorySource, SourceDocument,
};
pub use document::{Document, DocumentAccessor, FieldPath, LookupTier};
pub use error::{BatchError, ErrorKind, FatturaError, Result};
pub use export::{DetailRow, ExportBundle, ExportSink, SummaryRow};
pub use invoice::{InvoiceExtractor, RecordExtractor};
pub use models::config::FatturaConfig;
pub use models::invoice::{AggregatedTotal, InvoiceRecord};
