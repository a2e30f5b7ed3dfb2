//! Join engine: folds the payment and product reports into one
//! [`ConsolidatedSale`] per invoice.
//!
//! 1. Every payment row is keyed by its [`InvoiceKey`]. The first row seen
//!    for a key creates the sale and fixes its header; every row (first or
//!    not) appends one payment detail.
//! 2. Every product row is looked up by key and appended to the matching
//!    sale. Rows with no matching sale are dropped and logged.
//! 3. Sales come back in first-seen order of their key in the payment
//!    report.
//!
//! The join is pure and synchronous; each call owns its own state.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::models::{
    ConsolidatedSale, InvoiceKey, PaymentDetail, ProductDetail, RawPaymentRecord,
    RawProductRecord,
};

/// Counters describing one join pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinStats {
    pub payment_records: usize,
    pub product_records: usize,
    pub sales: usize,
    pub attached_products: usize,
    pub orphan_products: usize,
    /// Distinct keys of dropped product rows, first-seen order.
    pub orphan_keys: Vec<String>,
}

/// Sales plus the stats of the pass that produced them.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub sales: Vec<ConsolidatedSale>,
    pub stats: JoinStats,
}

/// Joins both reports into consolidated sales.
pub fn join(payments: &[RawPaymentRecord], products: &[RawProductRecord]) -> Vec<ConsolidatedSale> {
    join_with_stats(payments, products).sales
}

/// Same as [`join`], also reporting what happened to every input row.
pub fn join_with_stats(
    payments: &[RawPaymentRecord],
    products: &[RawProductRecord],
) -> JoinOutcome {
    let mut sales: IndexMap<InvoiceKey, ConsolidatedSale> = IndexMap::new();

    for payment in payments {
        sales
            .entry(payment.invoice_key())
            .or_insert_with(|| ConsolidatedSale::from_header(payment))
            .detalle_fp
            .push(PaymentDetail::from(payment));
    }

    let mut attached_products = 0usize;
    let mut orphan_products = 0usize;
    let mut orphan_keys: IndexSet<InvoiceKey> = IndexSet::new();

    for product in products {
        let key = product.invoice_key();
        match sales.get_mut(&key) {
            Some(sale) => {
                sale.detalle_venta.push(ProductDetail::from(product));
                attached_products += 1;
            }
            None => {
                tracing::warn!(
                    "Dropping product {:?} for invoice {}: no payment row with that key",
                    product.codigo.as_ref().map(|c| c.to_string()),
                    key
                );
                orphan_products += 1;
                orphan_keys.insert(key);
            }
        }
    }

    let stats = JoinStats {
        payment_records: payments.len(),
        product_records: products.len(),
        sales: sales.len(),
        attached_products,
        orphan_products,
        orphan_keys: orphan_keys.iter().map(InvoiceKey::to_string).collect(),
    };

    tracing::info!(
        "Join complete: {} payment rows, {} product rows -> {} sales ({} attached, {} orphaned)",
        stats.payment_records,
        stats.product_records,
        stats.sales,
        stats.attached_products,
        stats.orphan_products
    );

    JoinOutcome {
        sales: sales.into_values().collect(),
        stats,
    }
}
