//! Invoice data models extracted from FatturaPA documents.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One fully populated invoice record.
///
/// Records are only ever built by the extractor once all eight fields have
/// been resolved and parsed, so a value of this type is never partial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Supplier VAT code (IdFiscaleIVA/IdCodice).
    pub supplier_tax_id: String,

    /// Supplier legal name (Anagrafica/Denominazione).
    pub supplier_name: String,

    /// Supplier tax regime code (RegimeFiscale, e.g. RF01).
    pub supplier_tax_regime: String,

    /// Document currency (Divisa). Expected to be ISO 4217, not validated.
    pub currency_code: String,

    /// Date the invoice was issued.
    pub issue_date: NaiveDate,

    /// Invoice number.
    pub document_number: String,

    /// Payment due date.
    pub payment_due_date: NaiveDate,

    /// Payment amount, never negative.
    pub payment_amount: Decimal,
}

impl InvoiceRecord {
    /// Aggregation identity of the issuing party.
    pub fn supplier_key(&self) -> SupplierKey {
        SupplierKey {
            tax_id: self.supplier_tax_id.clone(),
            name: self.supplier_name.clone(),
        }
    }
}

/// Identity of an issuing party for aggregation.
///
/// Both the tax id and the declared name take part: the same tax id spelled
/// with two different names yields two keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SupplierKey {
    pub tax_id: String,
    pub name: String,
}

/// Payment total for one issuing party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedTotal {
    pub supplier_tax_id: String,
    pub supplier_name: String,
    pub total_payment_amount: Decimal,
}

impl AggregatedTotal {
    pub fn from_key(key: SupplierKey, total_payment_amount: Decimal) -> Self {
        Self {
            supplier_tax_id: key.tax_id,
            supplier_name: key.name,
            total_payment_amount,
        }
    }
}
