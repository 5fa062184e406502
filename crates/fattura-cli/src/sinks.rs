//! Export sinks used by the CLI.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use fattura_core::export::{DETAIL_HEADERS, SUMMARY_HEADERS};
use fattura_core::{DetailRow, ExportBundle, ExportSink, SummaryRow};

/// Writes the summary CSV and, when records are attached, the details CSV.
pub struct CsvSink {
    summary_path: PathBuf,
    details_path: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvSink {
    pub fn new(summary_path: PathBuf, details_path: PathBuf) -> Self {
        Self {
            summary_path,
            details_path,
            written: Vec::new(),
        }
    }

    /// Files produced by the last export.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ExportSink for CsvSink {
    type Error = anyhow::Error;

    fn export(&mut self, bundle: &ExportBundle<'_>) -> anyhow::Result<()> {
        self.written.clear();

        for path in [&self.summary_path, &self.details_path] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }

        let mut wtr = csv::Writer::from_path(&self.summary_path)?;
        wtr.write_record(SUMMARY_HEADERS)?;
        for row in bundle.summary_rows() {
            wtr.write_record(row.fields())?;
        }
        wtr.flush()?;
        debug!("Wrote summary to {}", self.summary_path.display());
        self.written.push(self.summary_path.clone());

        if bundle.records.is_some() {
            let mut wtr = csv::Writer::from_path(&self.details_path)?;
            wtr.write_record(DETAIL_HEADERS)?;
            for row in bundle.detail_rows() {
                wtr.write_record(row.fields())?;
            }
            wtr.flush()?;
            debug!("Wrote details to {}", self.details_path.display());
            self.written.push(self.details_path.clone());
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct JsonExport {
    totals: Vec<SummaryRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<Vec<DetailRow>>,
}

/// Writes one JSON document holding totals and optional records.
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ExportSink for JsonSink<W> {
    type Error = anyhow::Error;

    fn export(&mut self, bundle: &ExportBundle<'_>) -> anyhow::Result<()> {
        let export = JsonExport {
            totals: bundle.summary_rows().collect(),
            records: bundle.records.map(|_| bundle.detail_rows().collect()),
        };

        serde_json::to_writer_pretty(&mut self.writer, &export)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes aligned plain-text tables.
pub struct TextSink<W: Write> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ExportSink for TextSink<W> {
    type Error = anyhow::Error;

    fn export(&mut self, bundle: &ExportBundle<'_>) -> anyhow::Result<()> {
        let summary: Vec<Vec<String>> = bundle
            .summary_rows()
            .map(|r| r.fields().map(str::to_string).to_vec())
            .collect();
        write_table(&mut self.writer, &SUMMARY_HEADERS, &summary)?;

        if bundle.records.is_some() {
            let details: Vec<Vec<String>> = bundle
                .detail_rows()
                .map(|r| r.fields().map(str::to_string).to_vec())
                .collect();
            writeln!(self.writer)?;
            write_table(&mut self.writer, &DETAIL_HEADERS, &details)?;
        }

        self.writer.flush()?;
        Ok(())
    }
}

fn write_table<W: Write>(writer: &mut W, headers: &[&str], rows: &[Vec<String>]) -> std::io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(writer, "{}", line(headers.to_vec()))?;
    for row in rows {
        writeln!(writer, "{}", line(row.iter().map(String::as_str).collect()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fattura_core::AggregatedTotal;
    use rust_decimal::Decimal;

    fn totals() -> Vec<AggregatedTotal> {
        vec![AggregatedTotal {
            supplier_tax_id: "IT12345678901".to_string(),
            supplier_name: "Acme Srl".to_string(),
            total_payment_amount: Decimal::new(35050, 2),
        }]
    }

    #[test]
    fn test_json_sink_omits_records_when_absent() {
        let totals = totals();
        let mut out = Vec::new();
        JsonSink::new(&mut out)
            .export(&ExportBundle::new(&totals))
            .unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["totals"][0]["total_payment_amount"], "350.50");
        assert!(json.get("records").is_none());
    }

    #[test]
    fn test_text_sink_aligns_columns() {
        let totals = totals();
        let mut out = Vec::new();
        TextSink::new(&mut out)
            .export(&ExportBundle::new(&totals))
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Cedente.IdFiscaleIVA"));
        assert!(lines[1].starts_with("IT12345678901         Acme Srl"));
        assert!(lines[1].ends_with("350.50"));
    }

    #[test]
    fn test_csv_sink_writes_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let summary = dir.path().join("out/summary.csv");
        let details = dir.path().join("out/details.csv");
        let totals = totals();

        let mut sink = CsvSink::new(summary.clone(), details.clone());
        sink.export(&ExportBundle::new(&totals)).unwrap();

        assert_eq!(sink.written(), &[summary.clone()]);
        let content = fs::read_to_string(&summary).unwrap();
        assert_eq!(
            content,
            "Cedente.IdFiscaleIVA,Cedente.Anagrafica.Denominazione,DatiPagamento\nIT12345678901,Acme Srl,350.50\n"
        );
        assert!(!details.exists());
    }
}
