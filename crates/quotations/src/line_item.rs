//! Quotation line items.

use serde::{Deserialize, Serialize};

use orderquote_core::{DomainResult, Entity, Money, SellerId, SkuId};

/// One product entry of a quotation.
///
/// Field names follow the checkout platform's order-form item shape, so the
/// serialized form is what gets stored in a quotation's `products` blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// SKU id; unique within a quotation.
    pub id: SkuId,
    pub product_id: String,
    pub name: String,
    pub sku_name: String,
    #[serde(default)]
    pub ref_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub list_price: Money,
    /// Negotiated unit price; editable until the quotation is submitted.
    #[serde(rename = "sellingPrice")]
    pub unit_price: Money,
    pub quantity: u32,
    pub seller: SellerId,
}

impl LineItem {
    /// `unit_price × quantity`; fails when the product leaves the decimal range.
    pub fn line_total(&self) -> DomainResult<Money> {
        self.unit_price.times(self.quantity)
    }

    /// Display name: `name` alone when it equals the SKU name, otherwise both.
    pub fn display_name(&self) -> String {
        if self.sku_name == self.name {
            self.sku_name.clone()
        } else {
            format!("{} ({})", self.name, self.sku_name)
        }
    }
}

impl Entity for LineItem {
    type Id = SkuId;

    fn id(&self) -> &SkuId {
        &self.id
    }
}
