//! Invoice pricing
//!
//! The only place line totals and invoice totals are computed on write.

use crate::contract::{InvoiceLineItem, LineItemDraft, ShopError};
use rust_decimal::Decimal;
use uuid::Uuid;

/// quantity x unit price
pub fn line_total(quantity: Decimal, unit_price: Decimal) -> Result<Decimal, ShopError> {
    quantity.checked_mul(unit_price).ok_or_else(|| {
        ShopError::validation(format!(
            "line total overflows: {} x {}",
            quantity, unit_price
        ))
    })
}

/// Price drafts into line items belonging to `invoice_id`, keeping their order.
///
/// Every item gets a fresh id; replacing an invoice's items never reuses ids.
pub fn price_line_items(
    invoice_id: &str,
    drafts: Vec<LineItemDraft>,
) -> Result<Vec<InvoiceLineItem>, ShopError> {
    drafts
        .into_iter()
        .map(|draft| {
            Ok(InvoiceLineItem {
                id: Uuid::new_v4().to_string(),
                invoice_id: invoice_id.to_string(),
                total_price: line_total(draft.quantity, draft.unit_price)?,
                description: draft.description,
                quantity: draft.quantity,
                unit_price: draft.unit_price,
            })
        })
        .collect()
}

pub fn invoice_total(items: &[InvoiceLineItem]) -> Result<Decimal, ShopError> {
    items.iter().try_fold(Decimal::ZERO, |acc, item| {
        acc.checked_add(item.total_price)
            .ok_or_else(|| ShopError::validation("invoice total overflows"))
    })
}
