//! Export adapter interface.
//!
//! The engine hands totals and, optionally, the accepted records to a sink
//! through a read-only [`ExportBundle`]. Sinks decide on file formats; the
//! row projections here fix the column set and value formatting shared by
//! all of them.

use serde::Serialize;

use crate::invoice::rules::format_amount;
use crate::models::invoice::{AggregatedTotal, InvoiceRecord};

/// Column headers of the per-supplier summary.
pub const SUMMARY_HEADERS: [&str; 3] = [
    "Cedente.IdFiscaleIVA",
    "Cedente.Anagrafica.Denominazione",
    "DatiPagamento",
];

/// Column headers of the per-record details.
pub const DETAIL_HEADERS: [&str; 8] = [
    "Cedente.IdFiscaleIVA",
    "Cedente.Denominazione",
    "Regime Fiscale",
    "Divisa",
    "Data Fattura",
    "Numero Fattura",
    "Data Scadenza",
    "Importo",
];

/// Read-only view of a run's output.
#[derive(Debug, Clone, Copy)]
pub struct ExportBundle<'a> {
    pub totals: &'a [AggregatedTotal],
    /// Accepted records, when the caller wants details exported.
    pub records: Option<&'a [InvoiceRecord]>,
}

impl<'a> ExportBundle<'a> {
    pub fn new(totals: &'a [AggregatedTotal]) -> Self {
        Self {
            totals,
            records: None,
        }
    }

    pub fn with_records(mut self, records: &'a [InvoiceRecord]) -> Self {
        self.records = Some(records);
        self
    }

    pub fn summary_rows(&self) -> impl Iterator<Item = SummaryRow> + 'a {
        self.totals.iter().map(SummaryRow::from)
    }

    /// Detail rows, empty when no records were attached.
    pub fn detail_rows(&self) -> impl Iterator<Item = DetailRow> + 'a {
        self.records.unwrap_or_default().iter().map(DetailRow::from)
    }
}

/// Destination for a run's output.
pub trait ExportSink {
    type Error;

    fn export(&mut self, bundle: &ExportBundle<'_>) -> Result<(), Self::Error>;
}

/// Summary projection: tax id, name and a two-decimal total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub supplier_tax_id: String,
    pub supplier_name: String,
    pub total_payment_amount: String,
}

impl SummaryRow {
    pub fn fields(&self) -> [&str; 3] {
        [
            &self.supplier_tax_id,
            &self.supplier_name,
            &self.total_payment_amount,
        ]
    }
}

impl From<&AggregatedTotal> for SummaryRow {
    fn from(total: &AggregatedTotal) -> Self {
        Self {
            supplier_tax_id: total.supplier_tax_id.clone(),
            supplier_name: total.supplier_name.clone(),
            total_payment_amount: format_amount(total.total_payment_amount),
        }
    }
}

/// Detail projection: every record field as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub supplier_tax_id: String,
    pub supplier_name: String,
    pub supplier_tax_regime: String,
    pub currency_code: String,
    pub issue_date: String,
    pub document_number: String,
    pub payment_due_date: String,
    pub payment_amount: String,
}

impl DetailRow {
    pub fn fields(&self) -> [&str; 8] {
        [
            &self.supplier_tax_id,
            &self.supplier_name,
            &self.supplier_tax_regime,
            &self.currency_code,
            &self.issue_date,
            &self.document_number,
            &self.payment_due_date,
            &self.payment_amount,
        ]
    }
}

impl From<&InvoiceRecord> for DetailRow {
    fn from(record: &InvoiceRecord) -> Self {
        Self {
            supplier_tax_id: record.supplier_tax_id.clone(),
            supplier_name: record.supplier_name.clone(),
            supplier_tax_regime: record.supplier_tax_regime.clone(),
            currency_code: record.currency_code.clone(),
            issue_date: record.issue_date.to_string(),
            document_number: record.document_number.clone(),
            payment_due_date: record.payment_due_date.to_string(),
            payment_amount: format_amount(record.payment_amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn record() -> InvoiceRecord {
        InvoiceRecord {
            supplier_tax_id: "IT12345678901".to_string(),
            supplier_name: "Acme Srl".to_string(),
            supplier_tax_regime: "RF01".to_string(),
            currency_code: "EUR".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            document_number: "FPR 12/24".to_string(),
            payment_due_date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            payment_amount: Decimal::from_str("100.5").unwrap(),
        }
    }

    /// Collects rows in memory.
    #[derive(Default)]
    struct VecSink {
        summary: Vec<Vec<String>>,
        details: Vec<Vec<String>>,
    }

    impl ExportSink for VecSink {
        type Error = std::convert::Infallible;

        fn export(&mut self, bundle: &ExportBundle<'_>) -> Result<(), Self::Error> {
            self.summary = bundle
                .summary_rows()
                .map(|r| r.fields().iter().map(|s| s.to_string()).collect())
                .collect();
            self.details = bundle
                .detail_rows()
                .map(|r| r.fields().iter().map(|s| s.to_string()).collect())
                .collect();
            Ok(())
        }
    }

    #[test]
    fn test_summary_row_formats_total() {
        let total = AggregatedTotal {
            supplier_tax_id: "IT12345678901".to_string(),
            supplier_name: "Acme Srl".to_string(),
            total_payment_amount: Decimal::from_str("350.5").unwrap(),
        };

        assert_eq!(
            SummaryRow::from(&total).fields(),
            ["IT12345678901", "Acme Srl", "350.50"]
        );
    }

    #[test]
    fn test_detail_row_projects_all_fields() {
        let row = DetailRow::from(&record());
        assert_eq!(
            row.fields(),
            [
                "IT12345678901",
                "Acme Srl",
                "RF01",
                "EUR",
                "2024-02-01",
                "FPR 12/24",
                "2024-03-02",
                "100.50",
            ]
        );
        assert_eq!(row.fields().len(), DETAIL_HEADERS.len());
    }

    #[test]
    fn test_sink_sees_bundle() {
        let records = vec![record()];
        let totals = crate::aggregate::aggregate(&records).unwrap();

        let mut sink = VecSink::default();
        sink.export(&ExportBundle::new(&totals)).unwrap();
        assert_eq!(sink.summary.len(), 1);
        assert!(sink.details.is_empty());

        sink.export(&ExportBundle::new(&totals).with_records(&records))
            .unwrap();
        assert_eq!(sink.details.len(), 1);
        assert_eq!(sink.details[0][7], "100.50");
    }
}
