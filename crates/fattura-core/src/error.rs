//! Error types for the fattura-core library.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the fattura library.
#[derive(Error, Debug)]
pub enum FatturaError {
    /// Raw document could not be read or parsed.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Record extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Fatal batch error.
    #[error("batch error: {0}")]
    Batch(#[from] BatchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The document's root element is not the recognized invoice root.
    #[error("not a FatturaPA invoice (root element <{root}>)")]
    NotAnInvoice { root: String },

    /// A supplier's payment total exceeds the decimal range.
    #[error("payment total for {tax_id} ({name}) exceeds the supported range")]
    TotalOverflow { tax_id: String, name: String },
}

/// Errors raised while turning raw bytes into a document tree.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file was discovered but its bytes could not be read.
    #[error("failed to read document: {0}")]
    Read(#[from] std::io::Error),

    /// The document is not well-formed XML.
    #[error("malformed document at byte {position}: {reason}")]
    Malformed { position: u64, reason: String },

    /// An element uses a prefix that was never declared.
    #[error("undeclared namespace prefix: {0}")]
    UndeclaredPrefix(String),

    /// The document ended while elements were still open.
    #[error("unexpected end of document ({0} unclosed elements)")]
    UnexpectedEof(usize),

    /// The document contains no element at all.
    #[error("document has no root element")]
    NoRoot,
}

/// Errors related to record extraction from a parsed document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Required field could not be resolved under any lookup tier.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A resolved field could not be converted to its typed form.
    #[error("failed to parse {field} from {value:?}: {reason}")]
    Parse {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors that abort a whole batch run.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The batch root cannot be accessed or enumerated.
    #[error("cannot access batch root {}: {source}", path.display())]
    RootLocation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The batch root exists but is not a directory.
    #[error("batch root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// A date parameter does not match `YYYY-MM-DD`.
    #[error("invalid {name} date {value:?}: expected YYYY-MM-DD")]
    InvalidDate { name: &'static str, value: String },

    /// The start date falls after the end date.
    #[error("start date {start} is after end date {end}")]
    InvertedRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// The document source collaborator failed.
    #[error("document source failed: {0}")]
    Source(String),
}

impl BatchError {
    /// Whether the error concerns the invocation parameters rather than the root.
    pub fn is_invocation_error(&self) -> bool {
        matches!(
            self,
            BatchError::InvalidDate { .. } | BatchError::InvertedRange { .. }
        )
    }
}

/// Classification attached to every per-document failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The file could not be read.
    DocumentRead,
    /// The raw document is not well-formed.
    DocumentParse,
    /// A required field is absent.
    StructuralLookup,
    /// A field value has the wrong shape.
    ValueParse,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DocumentRead => "document_read",
            ErrorKind::DocumentParse => "document_parse",
            ErrorKind::StructuralLookup => "structural_lookup",
            ErrorKind::ValueParse => "value_parse",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&DocumentError> for ErrorKind {
    fn from(err: &DocumentError) -> Self {
        match err {
            DocumentError::Read(_) => ErrorKind::DocumentRead,
            _ => ErrorKind::DocumentParse,
        }
    }
}

impl From<&ExtractionError> for ErrorKind {
    fn from(err: &ExtractionError) -> Self {
        match err {
            ExtractionError::MissingField(_) => ErrorKind::StructuralLookup,
            ExtractionError::Parse { .. } => ErrorKind::ValueParse,
        }
    }
}

/// Result type for the fattura library.
pub type Result<T> = std::result::Result<T, FatturaError>;
