//! Batch processing over a tree of documents.
//!
//! A run discovers candidate files beneath a root directory, extracts one
//! record per recognized document, keeps the records whose issue date falls
//! inside the requested range and collects a classified failure for every
//! document that could not be turned into a record. Per-document problems
//! never abort a run; only an inaccessible root or bad parameters do.

mod source;
mod walker;

pub use source::{DocumentSource, InMemorySource, SourceDocument};
pub use walker::BatchWalker;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate::aggregate;
use crate::error::{BatchError, ErrorKind};
use crate::invoice::rules::parse_iso_date;
use crate::models::invoice::{AggregatedTotal, InvoiceRecord};

/// Inclusive range of issue dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, BatchError> {
        if start > end {
            return Err(BatchError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse a range from two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, BatchError> {
        let parse = |name: &'static str, value: &str| {
            parse_iso_date(value.trim()).map_err(|_| BatchError::InvalidDate {
                name,
                value: value.to_string(),
            })
        };

        Self::new(parse("start", start)?, parse("end", end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Both bounds are inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// A document that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub kind: ErrorKind,
    pub message: String,
}

impl DocumentFailure {
    pub fn new(path: impl Into<PathBuf>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.path.display(), self.kind, self.message)
    }
}

/// Result of running the per-document pipeline on one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// A full record was extracted (before date filtering).
    Extracted(InvoiceRecord),
    /// The document is well-formed but not an invoice.
    Skipped,
    Failed(DocumentFailure),
}

/// What happened to a single document, as reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Extracted and inside the date range.
    Accepted,
    /// Extracted but issued outside the date range.
    OutOfRange,
    Skipped,
    Failed(ErrorKind),
}

/// Counters for a finished run.
///
/// `extracted + skipped + failed == discovered` always holds; unreadable
/// directory entries met during discovery count as discovered and failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub discovered: usize,
    pub skipped: usize,
    pub extracted: usize,
    pub out_of_range: usize,
    pub failed: usize,
}

impl BatchStats {
    /// Records kept after date filtering.
    pub fn accepted(&self) -> usize {
        self.extracted - self.out_of_range
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Records inside the date range, in discovery order.
    pub records: Vec<InvoiceRecord>,
    pub failures: Vec<DocumentFailure>,
    pub stats: BatchStats,
}

impl BatchResult {
    /// Per-supplier totals of the accepted records.
    pub fn totals(&self) -> crate::Result<Vec<AggregatedTotal>> {
        aggregate(&self.records)
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    fn record(&mut self, outcome: ExtractionOutcome, range: &DateRange) -> DocumentStatus {
        self.stats.discovered += 1;
        match outcome {
            ExtractionOutcome::Extracted(record) => {
                self.stats.extracted += 1;
                if range.contains(record.issue_date) {
                    self.records.push(record);
                    DocumentStatus::Accepted
                } else {
                    self.stats.out_of_range += 1;
                    DocumentStatus::OutOfRange
                }
            }
            ExtractionOutcome::Skipped => {
                self.stats.skipped += 1;
                DocumentStatus::Skipped
            }
            ExtractionOutcome::Failed(failure) => {
                self.stats.failed += 1;
                let status = DocumentStatus::Failed(failure.kind);
                self.failures.push(failure);
                status
            }
        }
    }
}

/// Receives progress notifications from a batch run.
pub trait BatchObserver {
    /// Called once discovery is complete.
    fn on_start(&mut self, _total: usize) {}

    /// Called after each document has been processed.
    fn on_document(&mut self, _path: &Path, _status: DocumentStatus) {}

    fn on_finish(&mut self, _result: &BatchResult) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}
