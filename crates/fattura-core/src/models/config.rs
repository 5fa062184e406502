//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::FatturaError;

/// Namespace of the FatturaPA v1.2 schema.
pub const FATTURA_PA_NAMESPACE: &str =
    "http://ivaservizi.agenziaentrate.gov.it/docs/xsd/fatture/v1.2";

/// Main configuration for the fattura pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FatturaConfig {
    /// Document schema configuration.
    pub schema: SchemaConfig,

    /// File discovery configuration.
    pub discovery: DiscoveryConfig,

    /// Export configuration.
    pub export: ExportConfig,
}

/// Schema the accessor resolves fields against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Namespace URI used by the qualified lookup tier.
    pub namespace_uri: String,

    /// Local name of the recognized root element.
    pub root_element: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            namespace_uri: FATTURA_PA_NAMESPACE.to_string(),
            root_element: "FatturaElettronica".to_string(),
        }
    }
}

/// File discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// File extension marking candidate documents (compared case-insensitively).
    pub extension: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extension: "xml".to_string(),
        }
    }
}

/// Export defaults used by the CLI sinks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory for output files (current directory when unset).
    pub output_dir: Option<PathBuf>,

    /// File name of the per-supplier summary.
    pub summary_file: String,

    /// File name of the per-record details.
    pub details_file: String,

    /// Sort totals by tax id and name before export.
    pub sort_totals: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            summary_file: "fattura-pa-summary.csv".to_string(),
            details_file: "fattura-pa-details.csv".to_string(),
            sort_totals: true,
        }
    }
}

impl FatturaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| FatturaError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| FatturaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Full path of an export file, honoring `export.output_dir`.
    pub fn export_path(&self, file_name: &str) -> PathBuf {
        match &self.export.output_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}
