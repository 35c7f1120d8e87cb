//! Editable line-item list held by the quotation form before submission.

use serde::{Deserialize, Serialize};

use orderquote_core::{DomainResult, Money, SellerId, SkuId};

use crate::line_item::LineItem;
use crate::totalizer::Totalizers;
use crate::totals::{recompute, set_quantity, set_unit_price};

/// Line items copied from the buyer's cart plus the cart's external totalizers.
///
/// Every edit recomputes the totalizers, so `totalizers()` is always consistent
/// with `line_items()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationDraft {
    line_items: Vec<LineItem>,
    external: Totalizers,
    totalizers: Totalizers,
}

impl QuotationDraft {
    pub fn new(line_items: Vec<LineItem>, external: Totalizers) -> DomainResult<Self> {
        let totalizers = recompute(&line_items, &external)?;
        Ok(Self {
            line_items,
            external,
            totalizers,
        })
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn totalizers(&self) -> &Totalizers {
        &self.totalizers
    }

    /// Opaque entries supplied by the checkout (shipping, discounts, taxes).
    pub fn external_totalizers(&self) -> &Totalizers {
        &self.external
    }

    /// See [`set_unit_price`]: unknown ids leave the draft unchanged.
    pub fn set_unit_price(&mut self, item_id: &SkuId, price: Money) -> DomainResult<()> {
        let line_items = set_unit_price(&self.line_items, item_id, price)?;
        self.replace_items(line_items)
    }

    pub fn set_quantity(&mut self, item_id: &SkuId, quantity: u32) -> DomainResult<()> {
        let line_items = set_quantity(&self.line_items, item_id, quantity)?;
        self.replace_items(line_items)
    }

    /// Commit edited items only if their totals can be computed.
    fn replace_items(&mut self, line_items: Vec<LineItem>) -> DomainResult<()> {
        self.totalizers = recompute(&line_items, &self.external)?;
        self.line_items = line_items;
        Ok(())
    }

    /// Distinct sellers in first-appearance order.
    pub fn sellers(&self) -> Vec<SellerId> {
        let mut sellers: Vec<SellerId> = Vec::new();
        for item in &self.line_items {
            if !sellers.contains(&item.seller) {
                sellers.push(item.seller.clone());
            }
        }
        sellers
    }

    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    pub fn into_parts(self) -> (Vec<LineItem>, Totalizers) {
        (self.line_items, self.external)
    }
}
