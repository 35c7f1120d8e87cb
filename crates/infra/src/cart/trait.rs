use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use orderquote_core::{DomainResult, OrderFormId, SellerId, SkuId};
use orderquote_quotations::LineItem;

/// Identifier the cart service assigns to a saved cart.
pub type CartId = String;

#[derive(Debug, Clone, Error)]
pub enum CartError {
    #[error("cart service rejected request: {0}")]
    Rejected(String),

    #[error("cart service unavailable: {0}")]
    Unavailable(String),
}

/// A seller present in the buyer's order form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    pub id: SellerId,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Item of a saved cart; prices in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCartItem {
    pub id: SkuId,
    pub product_id: String,
    pub name: String,
    pub sku_name: String,
    pub ref_id: Option<String>,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub list_price: i64,
    pub selling_price: i64,
    pub seller: SellerId,
}

impl SavedCartItem {
    pub fn from_line_item(item: &LineItem) -> DomainResult<Self> {
        Ok(Self {
            id: item.id.clone(),
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            sku_name: item.sku_name.clone(),
            ref_id: item.ref_id.clone(),
            image_url: item.image_url.clone(),
            quantity: item.quantity,
            list_price: item.list_price.to_minor_units()?,
            selling_price: item.unit_price.to_minor_units()?,
            seller: item.seller.clone(),
        })
    }
}

/// One seller's share of a quotation, saved as a named cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSpec {
    pub email: String,
    pub cart_name: String,
    pub description: String,
    pub items: Vec<SavedCartItem>,
    pub creation_date: DateTime<Utc>,
    /// Seller subtotal in minor units.
    pub total: i64,
    pub seller: SellerId,
    pub address: Option<ShippingAddress>,
}

/// Item pushed into a live order form; `selling_price` in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: SkuId,
    pub quantity: u32,
    pub selling_price: i64,
    pub seller: SellerId,
}

impl CartItem {
    pub fn from_line_item(item: &LineItem) -> DomainResult<Self> {
        Ok(Self {
            id: item.id.clone(),
            quantity: item.quantity,
            selling_price: item.unit_price.to_minor_units()?,
            seller: item.seller.clone(),
        })
    }
}

/// Async cart/checkout service.
#[async_trait::async_trait]
pub trait CartService: Send + Sync {
    /// Save a named cart and return its id.
    async fn save_cart(&self, cart: CartSpec) -> Result<CartId, CartError>;

    /// Remove every item from a live order form.
    async fn clear_cart(&self, order_form_id: &OrderFormId) -> Result<(), CartError>;

    /// Add items to a live order form.
    async fn add_items_to_cart(
        &self,
        order_form_id: &OrderFormId,
        items: Vec<CartItem>,
    ) -> Result<(), CartError>;
}

#[async_trait::async_trait]
impl<C> CartService for Arc<C>
where
    C: CartService + ?Sized,
{
    async fn save_cart(&self, cart: CartSpec) -> Result<CartId, CartError> {
        (**self).save_cart(cart).await
    }

    async fn clear_cart(&self, order_form_id: &OrderFormId) -> Result<(), CartError> {
        (**self).clear_cart(order_form_id).await
    }

    async fn add_items_to_cart(
        &self,
        order_form_id: &OrderFormId,
        items: Vec<CartItem>,
    ) -> Result<(), CartError> {
        (**self).add_items_to_cart(order_form_id, items).await
    }
}
