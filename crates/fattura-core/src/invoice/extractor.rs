//! Record extractor mapping one FatturaPA document to one [`InvoiceRecord`].

use tracing::debug;

use crate::document::{Document, DocumentAccessor, FieldPath, Resolved};
use crate::error::{ExtractionError, FatturaError};
use crate::models::config::SchemaConfig;
use crate::models::invoice::InvoiceRecord;

use super::fields::*;
use super::rules::{parse_amount, parse_iso_date};
use super::{InvoiceExtractor, Result};

/// Extractor for the eight fields of an [`InvoiceRecord`].
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    accessor: DocumentAccessor,
    root_element: String,
}

impl RecordExtractor {
    /// Create an extractor for the default FatturaPA schema.
    pub fn new() -> Self {
        Self::from_schema(&SchemaConfig::default())
    }

    /// Create an extractor from schema configuration.
    pub fn from_schema(schema: &SchemaConfig) -> Self {
        Self {
            accessor: DocumentAccessor::new(schema.namespace_uri.clone()),
            root_element: schema.root_element.clone(),
        }
    }

    /// Set the namespace used by the qualified lookup tier.
    pub fn with_namespace(mut self, namespace_uri: impl Into<String>) -> Self {
        self.accessor = DocumentAccessor::new(namespace_uri);
        self
    }

    /// Set the local name of the recognized root element.
    pub fn with_root_element(mut self, root_element: impl Into<String>) -> Self {
        self.root_element = root_element.into();
        self
    }

    pub fn accessor(&self) -> &DocumentAccessor {
        &self.accessor
    }

    /// Parse raw bytes and extract the record, rejecting documents that are
    /// not invoices.
    pub fn extract_bytes(&self, bytes: &[u8]) -> crate::Result<InvoiceRecord> {
        let document = Document::parse(bytes)?;
        if !self.recognizes(&document) {
            return Err(FatturaError::NotAnInvoice {
                root: document.root().local_name().to_string(),
            });
        }
        Ok(self.extract(&document)?)
    }

    /// Report how each required field resolves, without parsing values.
    pub fn explain<'d>(&self, document: &'d Document) -> Vec<FieldReport<'d>> {
        REQUIRED_FIELDS
            .iter()
            .map(|field| FieldReport {
                field: *field,
                resolved: self.accessor.resolve_with_tier(document, field),
            })
            .collect()
    }

    fn require<'d>(&self, document: &'d Document, path: &FieldPath) -> Result<&'d str> {
        self.accessor
            .resolve(document, path)
            .ok_or(ExtractionError::MissingField(path.name()))
    }
}

/// Resolution of one required field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldReport<'d> {
    pub field: FieldPath,
    pub resolved: Option<Resolved<'d>>,
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceExtractor for RecordExtractor {
    fn recognizes(&self, document: &Document) -> bool {
        document.root().local_name() == self.root_element
    }

    fn extract(&self, document: &Document) -> Result<InvoiceRecord> {
        // Resolve every raw value first so a missing field is always reported
        // before any value error.
        let supplier_tax_id = self.require(document, &SUPPLIER_TAX_ID)?;
        let supplier_name = self.require(document, &SUPPLIER_NAME)?;
        let supplier_tax_regime = self.require(document, &SUPPLIER_TAX_REGIME)?;
        let currency_code = self.require(document, &CURRENCY_CODE)?;
        let issue_date = self.require(document, &ISSUE_DATE)?;
        let document_number = self.require(document, &DOCUMENT_NUMBER)?;
        let payment_due_date = self.require(document, &PAYMENT_DUE_DATE)?;
        let payment_amount = self.require(document, &PAYMENT_AMOUNT)?;

        let record = InvoiceRecord {
            supplier_tax_id: supplier_tax_id.to_string(),
            supplier_name: supplier_name.to_string(),
            supplier_tax_regime: supplier_tax_regime.to_string(),
            currency_code: currency_code.to_string(),
            issue_date: parse_iso_date(issue_date)
                .map_err(|reason| value_error(&ISSUE_DATE, issue_date, reason))?,
            document_number: document_number.to_string(),
            payment_due_date: parse_iso_date(payment_due_date)
                .map_err(|reason| value_error(&PAYMENT_DUE_DATE, payment_due_date, reason))?,
            payment_amount: parse_amount(payment_amount)
                .map_err(|reason| value_error(&PAYMENT_AMOUNT, payment_amount, reason))?,
        };

        debug!(
            "Extracted invoice {} from {} dated {}",
            record.document_number, record.supplier_tax_id, record.issue_date
        );

        Ok(record)
    }
}

fn value_error(path: &FieldPath, value: &str, reason: &str) -> ExtractionError {
    ExtractionError::Parse {
        field: path.name(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    use crate::models::config::FATTURA_PA_NAMESPACE;

    const BODY: &str = r#"
        <FatturaElettronicaHeader>
            <CedentePrestatore>
                <DatiAnagrafici>
                    <IdFiscaleIVA><IdPaese>IT</IdPaese><IdCodice>IT12345678901</IdCodice></IdFiscaleIVA>
                    <Anagrafica><Denominazione>Acme Srl</Denominazione></Anagrafica>
                    <RegimeFiscale>RF01</RegimeFiscale>
                </DatiAnagrafici>
            </CedentePrestatore>
            <CessionarioCommittente>
                <DatiAnagrafici>
                    <IdFiscaleIVA><IdPaese>IT</IdPaese><IdCodice>IT99999999999</IdCodice></IdFiscaleIVA>
                    <Anagrafica><Denominazione>Cliente Spa</Denominazione></Anagrafica>
                </DatiAnagrafici>
            </CessionarioCommittente>
        </FatturaElettronicaHeader>
        <FatturaElettronicaBody>
            <DatiGenerali>
                <DatiGeneraliDocumento>
                    <TipoDocumento>TD01</TipoDocumento>
                    <Divisa>EUR</Divisa>
                    <Data>2024-02-01</Data>
                    <Numero>FPR 12/24</Numero>
                </DatiGeneraliDocumento>
            </DatiGenerali>
            <DatiPagamento>
                <CondizioniPagamento>TP02</CondizioniPagamento>
                <DettaglioPagamento>
                    <ModalitaPagamento>MP05</ModalitaPagamento>
                    <DataScadenzaPagamento>2024-03-02</DataScadenzaPagamento>
                    <ImportoPagamento>100.00</ImportoPagamento>
                </DettaglioPagamento>
            </DatiPagamento>
        </FatturaElettronicaBody>"#;

    fn expected() -> InvoiceRecord {
        InvoiceRecord {
            supplier_tax_id: "IT12345678901".to_string(),
            supplier_name: "Acme Srl".to_string(),
            supplier_tax_regime: "RF01".to_string(),
            currency_code: "EUR".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            document_number: "FPR 12/24".to_string(),
            payment_due_date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            payment_amount: Decimal::from_str("100.00").unwrap(),
        }
    }

    fn prefixed(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><p:FatturaElettronica xmlns:p="{}" versione="FPR12">{}</p:FatturaElettronica>"#,
            FATTURA_PA_NAMESPACE, body
        )
    }

    fn default_namespace(body: &str) -> String {
        format!(
            r#"<FatturaElettronica xmlns="{}" versione="FPR12">{}</FatturaElettronica>"#,
            FATTURA_PA_NAMESPACE, body
        )
    }

    fn plain(body: &str) -> String {
        format!("<FatturaElettronica>{}</FatturaElettronica>", body)
    }

    fn extract(xml: &str) -> Result<InvoiceRecord> {
        let doc = Document::from_str(xml).unwrap();
        RecordExtractor::new().extract(&doc)
    }

    #[test]
    fn test_extract_is_dialect_invariant() {
        let flattened = BODY.replace("<DatiGenerali>", "").replace("</DatiGenerali>", "");

        assert_eq!(extract(&prefixed(BODY)).unwrap(), expected());
        assert_eq!(extract(&default_namespace(BODY)).unwrap(), expected());
        assert_eq!(extract(&plain(BODY)).unwrap(), expected());
        assert_eq!(extract(&plain(&flattened)).unwrap(), expected());
    }

    #[test]
    fn test_missing_supplier_tax_id() {
        let body = BODY.replace("<IdCodice>IT12345678901</IdCodice>", "");
        assert_eq!(
            extract(&prefixed(&body)),
            Err(ExtractionError::MissingField("header.supplier.taxId"))
        );
    }

    #[test]
    fn test_each_missing_field_is_reported_alone() {
        let removals = [
            ("<IdCodice>IT12345678901</IdCodice>", "header.supplier.taxId"),
            ("<Denominazione>Acme Srl</Denominazione>", "header.supplier.name"),
            ("<RegimeFiscale>RF01</RegimeFiscale>", "header.supplier.taxRegime"),
            ("<Divisa>EUR</Divisa>", "body.document.currency"),
            ("<Data>2024-02-01</Data>", "body.document.issueDate"),
            ("<Numero>FPR 12/24</Numero>", "body.document.number"),
            ("<DataScadenzaPagamento>2024-03-02</DataScadenzaPagamento>", "body.payment.dueDate"),
            ("<ImportoPagamento>100.00</ImportoPagamento>", "body.payment.amount"),
        ];

        for (element, field) in removals {
            let body = BODY.replace(element, "");
            assert_eq!(
                extract(&default_namespace(&body)),
                Err(ExtractionError::MissingField(field)),
                "removing {element}"
            );
        }
    }

    #[test]
    fn test_missing_field_wins_over_bad_value() {
        let body = BODY
            .replace("2024-02-01", "01/02/2024")
            .replace("<ImportoPagamento>100.00</ImportoPagamento>", "");
        assert_eq!(
            extract(&plain(&body)),
            Err(ExtractionError::MissingField("body.payment.amount"))
        );
    }

    #[test]
    fn test_value_errors() {
        let body = BODY.replace("<Data>2024-02-01</Data>", "<Data>01/02/2024</Data>");
        assert!(matches!(
            extract(&plain(&body)),
            Err(ExtractionError::Parse { field: "body.document.issueDate", .. })
        ));

        let body = BODY.replace("100.00", "-5.00");
        assert!(matches!(
            extract(&plain(&body)),
            Err(ExtractionError::Parse { field: "body.payment.amount", .. })
        ));

        let body = BODY.replace("100.00", "cento");
        assert_eq!(
            extract(&plain(&body)),
            Err(ExtractionError::Parse {
                field: "body.payment.amount",
                value: "cento".to_string(),
                reason: "not a decimal number".to_string(),
            })
        );
    }

    #[test]
    fn test_recognizes_root_element() {
        let extractor = RecordExtractor::new();

        let invoice = Document::from_str(&prefixed(BODY)).unwrap();
        let other = Document::from_str("<Notifica><Esito>EC01</Esito></Notifica>").unwrap();

        assert!(extractor.recognizes(&invoice));
        assert!(!extractor.recognizes(&other));
        assert!(
            RecordExtractor::new()
                .with_root_element("Notifica")
                .recognizes(&other)
        );
    }

    #[test]
    fn test_explain_reports_tiers() {
        use crate::document::LookupTier;

        let body = BODY.replace("<RegimeFiscale>RF01</RegimeFiscale>", "");
        let xml = format!("<Wrapper>{}</Wrapper>", default_namespace(&body));
        let doc = Document::from_str(&xml).unwrap();
        let report = RecordExtractor::new().explain(&doc);

        assert_eq!(report.len(), 8);
        assert_eq!(report[0].field.name(), "header.supplier.taxId");
        assert_eq!(report[0].resolved.map(|r| r.tier), Some(LookupTier::Descendant));
        assert_eq!(report[2].resolved, None);

        let doc = Document::from_str(&default_namespace(BODY)).unwrap();
        assert!(
            RecordExtractor::new()
                .explain(&doc)
                .iter()
                .all(|r| r.resolved.map(|r| r.tier) == Some(LookupTier::Qualified))
        );
    }

    #[test]
    fn test_extract_bytes() {
        let extractor = RecordExtractor::new();

        assert_eq!(extractor.extract_bytes(prefixed(BODY).as_bytes()).unwrap(), expected());
        assert!(matches!(
            extractor.extract_bytes(b"<Notifica/>"),
            Err(FatturaError::NotAnInvoice { root }) if root == "Notifica"
        ));
        assert!(matches!(
            extractor.extract_bytes(b"<FatturaElettronica/>"),
            Err(FatturaError::Extraction(ExtractionError::MissingField(_)))
        ));
        assert!(matches!(
            extractor.extract_bytes(b""),
            Err(FatturaError::Document(_))
        ));
    }

    #[test]
    fn test_custom_namespace() {
        let xml = format!(
            r#"<FatturaElettronica xmlns="urn:custom">{}</FatturaElettronica>"#,
            BODY
        );
        let doc = Document::from_str(&xml).unwrap();
        let extractor = RecordExtractor::new().with_namespace("urn:custom");

        assert_eq!(extractor.accessor().namespace_uri(), "urn:custom");
        assert_eq!(extractor.extract(&doc).unwrap(), expected());
    }
}
