//! Totals engine.
//!
//! Keeps the `Items` and `Total` totalizers consistent with a mutable list of
//! line items. Shipping, discounts and taxes are opaque inputs from the external
//! checkout; they are passed through and only read to derive `Total`:
//!
//! `Total = Items + Shipping + Σ taxes − Discounts`
//!
//! Sums that leave the decimal range fail with `InvariantViolation`.

use orderquote_core::{DomainError, DomainResult, Money, SellerId, SkuId};

use crate::line_item::LineItem;
use crate::totalizer::{TotalizerEntry, TotalizerKind, Totalizers};

/// Recompute the full totalizer set.
///
/// Output order: `Items`, the external entries in their original order, `Total`.
/// Any `Items`/`Total` entry among `external` is discarded. Absent shipping or
/// discount entries count as zero; every other kind is a tax contribution.
pub fn recompute(line_items: &[LineItem], external: &Totalizers) -> DomainResult<Totalizers> {
    let items = sum_line_totals(line_items.iter())?;

    let mut out = Totalizers::new();
    out.upsert(TotalizerEntry::new(TotalizerKind::Items, items));
    for entry in external.iter().filter(|e| !e.id.is_derived()) {
        out.upsert(entry.clone());
    }

    let total = items
        .checked_add(external.shipping())?
        .checked_add(external.taxes()?)?
        .checked_sub(external.discounts())?;
    out.upsert(TotalizerEntry::new(TotalizerKind::Total, total));
    Ok(out)
}

fn sum_line_totals<'a>(mut items: impl Iterator<Item = &'a LineItem>) -> DomainResult<Money> {
    items.try_fold(Money::ZERO, |acc, item| acc.checked_add(item.line_total()?))
}

/// Replace the unit price of the item with id `item_id`.
///
/// An unmatched id leaves the list unchanged (not an error). A negative price is
/// rejected. Callers recompute totals afterwards.
pub fn set_unit_price(
    line_items: &[LineItem],
    item_id: &SkuId,
    new_price: Money,
) -> DomainResult<Vec<LineItem>> {
    if new_price.is_negative() {
        return Err(DomainError::validation("unit price must not be negative"));
    }

    Ok(line_items
        .iter()
        .map(|item| {
            if &item.id == item_id {
                LineItem {
                    unit_price: new_price,
                    ..item.clone()
                }
            } else {
                item.clone()
            }
        })
        .collect())
}

/// Replace the quantity of the item with id `item_id`.
///
/// Same unmatched-id semantics as [`set_unit_price`]; quantity must be at least 1.
pub fn set_quantity(
    line_items: &[LineItem],
    item_id: &SkuId,
    quantity: u32,
) -> DomainResult<Vec<LineItem>> {
    if quantity == 0 {
        return Err(DomainError::validation("quantity must be positive"));
    }

    Ok(line_items
        .iter()
        .map(|item| {
            if &item.id == item_id {
                LineItem {
                    quantity,
                    ..item.clone()
                }
            } else {
                item.clone()
            }
        })
        .collect())
}

/// Sum of line totals for one seller's items.
pub fn seller_subtotal(line_items: &[LineItem], seller: &SellerId) -> DomainResult<Money> {
    sum_line_totals(line_items.iter().filter(|item| &item.seller == seller))
}
