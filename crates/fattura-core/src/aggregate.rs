//! Per-supplier payment totals.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::error::FatturaError;
use crate::models::invoice::{AggregatedTotal, InvoiceRecord, SupplierKey};

/// Sum payment amounts per issuing party.
///
/// Parties are identified by tax id and name together. Sums are exact; a
/// total that leaves the decimal range is an error rather than a rounded
/// value. Totals come out in the order each party is first seen; callers
/// that need a stable presentation order use [`sort_totals`].
pub fn aggregate(records: &[InvoiceRecord]) -> crate::Result<Vec<AggregatedTotal>> {
    let mut index: HashMap<SupplierKey, usize> = HashMap::new();
    let mut totals: Vec<(SupplierKey, Decimal)> = Vec::new();

    for record in records {
        let key = record.supplier_key();
        match index.get(&key) {
            Some(&i) => {
                let (key, total) = &mut totals[i];
                *total = total.checked_add(record.payment_amount).ok_or_else(|| {
                    FatturaError::TotalOverflow {
                        tax_id: key.tax_id.clone(),
                        name: key.name.clone(),
                    }
                })?;
            }
            None => {
                index.insert(key.clone(), totals.len());
                totals.push((key, record.payment_amount));
            }
        }
    }

    Ok(totals
        .into_iter()
        .map(|(key, total)| AggregatedTotal::from_key(key, total))
        .collect())
}

/// Order totals by tax id, then name.
pub fn sort_totals(totals: &mut [AggregatedTotal]) {
    totals.sort_by(|a, b| {
        a.supplier_tax_id
            .cmp(&b.supplier_tax_id)
            .then_with(|| a.supplier_name.cmp(&b.supplier_name))
    });
}
