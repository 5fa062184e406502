//! Document retrieval collaborators.

use std::path::PathBuf;

use crate::error::BatchError;

use super::DateRange;

/// Raw bytes of one document together with where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Identifies the document in failure reports.
    pub origin: PathBuf,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(origin: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            origin: origin.into(),
            bytes: bytes.into(),
        }
    }
}

/// Supplies raw documents for a date window.
///
/// Implementations own transport and authentication. The window is a hint:
/// the batch pipeline still filters records by issue date.
pub trait DocumentSource {
    fn fetch(&self, range: &DateRange) -> Result<Vec<SourceDocument>, BatchError>;
}

/// A source backed by documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    documents: Vec<SourceDocument>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, origin: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        self.documents.push(SourceDocument::new(origin, bytes));
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl FromIterator<SourceDocument> for InMemorySource {
    fn from_iter<I: IntoIterator<Item = SourceDocument>>(iter: I) -> Self {
        Self {
            documents: iter.into_iter().collect(),
        }
    }
}

impl DocumentSource for InMemorySource {
    fn fetch(&self, _range: &DateRange) -> Result<Vec<SourceDocument>, BatchError> {
        Ok(self.documents.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchWalker;
    use crate::models::config::FatturaConfig;
    use crate::error::ErrorKind;

    const INVOICE: &str = r#"<FatturaElettronica>
        <FatturaElettronicaHeader><CedentePrestatore><DatiAnagrafici>
            <IdFiscaleIVA><IdCodice>IT12345678901</IdCodice></IdFiscaleIVA>
            <Anagrafica><Denominazione>Acme Srl</Denominazione></Anagrafica>
            <RegimeFiscale>RF01</RegimeFiscale>
        </DatiAnagrafici></CedentePrestatore></FatturaElettronicaHeader>
        <FatturaElettronicaBody>
            <DatiGenerali><DatiGeneraliDocumento>
                <Divisa>EUR</Divisa><Data>2024-02-01</Data><Numero>1</Numero>
            </DatiGeneraliDocumento></DatiGenerali>
            <DatiPagamento><DettaglioPagamento>
                <DataScadenzaPagamento>2024-03-01</DataScadenzaPagamento>
                <ImportoPagamento>100.00</ImportoPagamento>
            </DettaglioPagamento></DatiPagamento>
        </FatturaElettronicaBody>
    </FatturaElettronica>"#;

    struct FailingSource;

    impl DocumentSource for FailingSource {
        fn fetch(&self, _range: &DateRange) -> Result<Vec<SourceDocument>, BatchError> {
            Err(BatchError::Source("authentication rejected".to_string()))
        }
    }

    #[test]
    fn test_run_source_uses_document_pipeline() {
        let source = InMemorySource::new()
            .with_document("sdi/1.xml", INVOICE)
            .with_document("sdi/2.xml", "<FatturaElettronica>")
            .with_document("sdi/receipt.xml", "<RicevutaConsegna/>");
        let range = DateRange::parse("2024-01-01", "2024-12-31").unwrap();

        let walker = BatchWalker::new(&FatturaConfig::default());
        let result = walker.run_source(&source, &range).unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].kind, ErrorKind::DocumentParse);
        assert_eq!(result.failures[0].path, PathBuf::from("sdi/2.xml"));
        assert_eq!(result.stats.skipped, 1);
    }

    #[test]
    fn test_source_failure_is_fatal() {
        let range = DateRange::parse("2024-01-01", "2024-12-31").unwrap();
        let walker = BatchWalker::new(&FatturaConfig::default());
        let err = walker.run_source(&FailingSource, &range);
        assert!(matches!(err, Err(BatchError::Source(_))));
    }
}
