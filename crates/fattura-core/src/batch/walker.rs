//! Directory walker driving the per-document pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern, glob_with};
use tracing::{debug, info, warn};

use crate::document::Document;
use crate::error::{BatchError, ErrorKind};
use crate::invoice::{InvoiceExtractor, RecordExtractor};
use crate::models::config::FatturaConfig;

use super::{
    BatchObserver, BatchResult, DateRange, DocumentFailure, DocumentSource, ExtractionOutcome,
    NoopObserver,
};

/// Options for listing one directory level.
const LISTING: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Walks a directory tree and extracts one record per invoice document.
#[derive(Debug, Clone)]
pub struct BatchWalker<E = RecordExtractor> {
    extractor: E,
    extension: String,
}

impl BatchWalker<RecordExtractor> {
    /// Create a walker for the schema and discovery settings in `config`.
    pub fn new(config: &FatturaConfig) -> Self {
        Self::with_extractor(
            RecordExtractor::from_schema(&config.schema),
            &config.discovery.extension,
        )
    }
}

impl Default for BatchWalker<RecordExtractor> {
    fn default() -> Self {
        Self::new(&FatturaConfig::default())
    }
}

impl<E: InvoiceExtractor> BatchWalker<E> {
    /// Create a walker around any extractor. A leading dot on `extension`
    /// is ignored.
    pub fn with_extractor(extractor: E, extension: &str) -> Self {
        Self {
            extractor,
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Run over every candidate file beneath `root`.
    pub fn run(&self, root: &Path, range: &DateRange) -> Result<BatchResult, BatchError> {
        self.run_with_observer(root, range, &mut NoopObserver)
    }

    /// Same as [`run`](Self::run), reporting progress to `observer`.
    pub fn run_with_observer<O: BatchObserver + ?Sized>(
        &self,
        root: &Path,
        range: &DateRange,
        observer: &mut O,
    ) -> Result<BatchResult, BatchError> {
        check_root(root)?;

        let (files, walk_failures) = self.discover(root)?;
        info!(
            "Found {} candidate files under {} for {}",
            files.len(),
            root.display(),
            range
        );
        observer.on_start(files.len() + walk_failures.len());

        let mut result = BatchResult::default();

        for failure in walk_failures {
            let path = failure.path.clone();
            let status = result.record(ExtractionOutcome::Failed(failure), range);
            observer.on_document(&path, status);
        }

        for path in files {
            let outcome = match fs::read(&path) {
                Ok(bytes) => self.process_document(&path, &bytes),
                Err(e) => {
                    warn!("Failed to read {}: {}", path.display(), e);
                    ExtractionOutcome::Failed(DocumentFailure::new(
                        &path,
                        ErrorKind::DocumentRead,
                        e.to_string(),
                    ))
                }
            };
            let status = result.record(outcome, range);
            observer.on_document(&path, status);
        }

        log_summary(&result);
        observer.on_finish(&result);

        Ok(result)
    }

    /// Run the same pipeline over documents supplied by a collaborator.
    pub fn run_source(
        &self,
        source: &dyn DocumentSource,
        range: &DateRange,
    ) -> Result<BatchResult, BatchError> {
        let documents = source.fetch(range)?;
        info!("Fetched {} documents for {}", documents.len(), range);

        let mut result = BatchResult::default();
        for document in documents {
            let outcome = self.process_document(&document.origin, &document.bytes);
            result.record(outcome, range);
        }

        log_summary(&result);
        Ok(result)
    }

    /// Parse, recognize and extract a single document.
    ///
    /// No date filtering happens here.
    pub fn process_document(&self, origin: &Path, bytes: &[u8]) -> ExtractionOutcome {
        let document = match Document::parse(bytes) {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to parse {}: {}", origin.display(), e);
                return ExtractionOutcome::Failed(DocumentFailure::new(
                    origin,
                    ErrorKind::from(&e),
                    e.to_string(),
                ));
            }
        };

        if !self.extractor.recognizes(&document) {
            debug!(
                "Skipping {}: root element <{}> is not an invoice",
                origin.display(),
                document.root().local_name()
            );
            return ExtractionOutcome::Skipped;
        }

        match self.extractor.extract(&document) {
            Ok(record) => {
                debug!("Extracted {} from {}", record.document_number, origin.display());
                ExtractionOutcome::Extracted(record)
            }
            Err(e) => {
                warn!("Failed to extract {}: {}", origin.display(), e);
                ExtractionOutcome::Failed(DocumentFailure::new(
                    origin,
                    ErrorKind::from(&e),
                    e.to_string(),
                ))
            }
        }
    }

    /// Collect candidate files in stable order, together with the
    /// directories that could not be enumerated.
    ///
    /// Symbolic links to files are kept; symbolic links to directories are
    /// not followed, so link cycles cannot loop the walk.
    fn discover(&self, root: &Path) -> Result<(Vec<PathBuf>, Vec<DocumentFailure>), BatchError> {
        if root.to_str().is_none() {
            return Err(BatchError::RootLocation {
                path: root.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path is not valid UTF-8",
                ),
            });
        }

        let mut files = Vec::new();
        let mut failures = Vec::new();
        self.walk_dir(root, &mut files, &mut failures);

        Ok((files, failures))
    }

    fn walk_dir(&self, dir: &Path, files: &mut Vec<PathBuf>, failures: &mut Vec<DocumentFailure>) {
        if let Err(e) = fs::read_dir(dir) {
            warn!("Cannot enumerate {}: {}", dir.display(), e);
            failures.push(DocumentFailure::new(dir, ErrorKind::DocumentRead, e.to_string()));
            return;
        }

        let Some(dir_str) = dir.to_str() else {
            warn!("Cannot enumerate {}: path is not valid UTF-8", dir.display());
            failures.push(DocumentFailure::new(
                dir,
                ErrorKind::DocumentRead,
                "path is not valid UTF-8",
            ));
            return;
        };

        let pattern = format!("{}/*", Pattern::escape(dir_str));
        let entries = match glob_with(&pattern, LISTING) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot enumerate {}: {}", dir.display(), e);
                failures.push(DocumentFailure::new(dir, ErrorKind::DocumentRead, e.to_string()));
                return;
            }
        };

        for entry in entries {
            match entry {
                Ok(path) => self.visit(path, files, failures),
                Err(e) => {
                    let path = e.path().to_path_buf();
                    warn!("Cannot enumerate {}: {}", path.display(), e.error());
                    let message = e.into_error().to_string();
                    failures.push(DocumentFailure::new(path, ErrorKind::DocumentRead, message));
                }
            }
        }
    }

    fn visit(&self, path: PathBuf, files: &mut Vec<PathBuf>, failures: &mut Vec<DocumentFailure>) {
        let is_link = fs::symlink_metadata(&path).is_ok_and(|m| m.file_type().is_symlink());

        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_dir() => {
                if is_link {
                    debug!("Not following directory link {}", path.display());
                } else {
                    self.walk_dir(&path, files, failures);
                }
            }
            Ok(metadata) if metadata.is_file() => {
                if self.matches_extension(&path) {
                    files.push(path);
                }
            }
            Ok(_) => {}
            // Dangling links.
            Err(e) => debug!("Ignoring {}: {}", path.display(), e),
        }
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
    }
}

fn check_root(root: &Path) -> Result<(), BatchError> {
    let metadata = fs::metadata(root).map_err(|source| BatchError::RootLocation {
        path: root.to_path_buf(),
        source,
    })?;

    if !metadata.is_dir() {
        return Err(BatchError::NotADirectory(root.to_path_buf()));
    }

    fs::read_dir(root).map_err(|source| BatchError::RootLocation {
        path: root.to_path_buf(),
        source,
    })?;

    Ok(())
}

fn log_summary(result: &BatchResult) {
    let stats = &result.stats;
    info!(
        "Batch complete: {} accepted, {} out of range, {} skipped, {} failed",
        stats.accepted(),
        stats.out_of_range,
        stats.skipped,
        stats.failed
    );
}
