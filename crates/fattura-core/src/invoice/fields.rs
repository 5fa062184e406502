//! Logical paths of the fields consumed from a FatturaPA document.
//!
//! Supplier fields are anchored at `CedentePrestatore` so the buyer block,
//! which reuses the same inner element names, never satisfies them.

use crate::document::FieldPath;

pub const SUPPLIER_TAX_ID: FieldPath = FieldPath::new(
    "header.supplier.taxId",
    &[
        "FatturaElettronicaHeader",
        "CedentePrestatore",
        "DatiAnagrafici",
        "IdFiscaleIVA",
        "IdCodice",
    ],
)
.anchored_at(1);

pub const SUPPLIER_NAME: FieldPath = FieldPath::new(
    "header.supplier.name",
    &[
        "FatturaElettronicaHeader",
        "CedentePrestatore",
        "DatiAnagrafici",
        "Anagrafica",
        "Denominazione",
    ],
)
.anchored_at(1);

pub const SUPPLIER_TAX_REGIME: FieldPath = FieldPath::new(
    "header.supplier.taxRegime",
    &[
        "FatturaElettronicaHeader",
        "CedentePrestatore",
        "DatiAnagrafici",
        "RegimeFiscale",
    ],
)
.anchored_at(1);

pub const CURRENCY_CODE: FieldPath = FieldPath::new(
    "body.document.currency",
    &[
        "FatturaElettronicaBody",
        "DatiGenerali",
        "DatiGeneraliDocumento",
        "Divisa",
    ],
)
.anchored_at(2);

pub const ISSUE_DATE: FieldPath = FieldPath::new(
    "body.document.issueDate",
    &[
        "FatturaElettronicaBody",
        "DatiGenerali",
        "DatiGeneraliDocumento",
        "Data",
    ],
)
.anchored_at(2);

pub const DOCUMENT_NUMBER: FieldPath = FieldPath::new(
    "body.document.number",
    &[
        "FatturaElettronicaBody",
        "DatiGenerali",
        "DatiGeneraliDocumento",
        "Numero",
    ],
)
.anchored_at(2);

pub const PAYMENT_DUE_DATE: FieldPath = FieldPath::new(
    "body.payment.dueDate",
    &[
        "FatturaElettronicaBody",
        "DatiPagamento",
        "DettaglioPagamento",
        "DataScadenzaPagamento",
    ],
)
.anchored_at(2);

pub const PAYMENT_AMOUNT: FieldPath = FieldPath::new(
    "body.payment.amount",
    &[
        "FatturaElettronicaBody",
        "DatiPagamento",
        "DettaglioPagamento",
        "ImportoPagamento",
    ],
)
.anchored_at(2);

/// Required fields in resolution order: supplier block, general document
/// block, payment detail block.
pub const REQUIRED_FIELDS: [FieldPath; 8] = [
    SUPPLIER_TAX_ID,
    SUPPLIER_NAME,
    SUPPLIER_TAX_REGIME,
    CURRENCY_CODE,
    ISSUE_DATE,
    DOCUMENT_NUMBER,
    PAYMENT_DUE_DATE,
    PAYMENT_AMOUNT,
];
