use std::collections::HashSet;
use std::sync::Mutex;

use orderquote_core::{OrderFormId, SellerId};

use super::r#trait::{CartError, CartId, CartItem, CartService, CartSpec};

/// A call received by [`InMemoryCartService`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartCall {
    SaveCart(CartSpec),
    ClearCart(OrderFormId),
    AddItems(OrderFormId, Vec<CartItem>),
}

#[derive(Debug, Default)]
struct Failures {
    sellers: HashSet<SellerId>,
    clear: bool,
    add_items: bool,
}

/// Recording cart service for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCartService {
    calls: Mutex<Vec<CartCall>>,
    failures: Mutex<Failures>,
}

impl InMemoryCartService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `save_cart` fail for carts of this seller.
    pub fn fail_seller(&self, seller: SellerId) {
        if let Ok(mut f) = self.failures.lock() {
            f.sellers.insert(seller);
        }
    }

    pub fn fail_clear(&self) {
        if let Ok(mut f) = self.failures.lock() {
            f.clear = true;
        }
    }

    pub fn fail_add_items(&self) {
        if let Ok(mut f) = self.failures.lock() {
            f.add_items = true;
        }
    }

    pub fn calls(&self) -> Vec<CartCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn saved_carts(&self) -> Vec<CartSpec> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                CartCall::SaveCart(spec) => Some(spec),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: CartCall) -> usize {
        match self.calls.lock() {
            Ok(mut calls) => {
                calls.push(call);
                calls.len()
            }
            Err(_) => 0,
        }
    }

    fn check<F: Fn(&Failures) -> bool>(&self, failing: F) -> bool {
        self.failures.lock().map(|f| failing(&f)).unwrap_or(false)
    }
}

#[async_trait::async_trait]
impl CartService for InMemoryCartService {
    async fn save_cart(&self, cart: CartSpec) -> Result<CartId, CartError> {
        let seller = cart.seller.clone();
        let n = self.record(CartCall::SaveCart(cart));
        if self.check(|f| f.sellers.contains(&seller)) {
            return Err(CartError::Unavailable(format!("save_cart for seller {seller}")));
        }
        Ok(format!("cart-{n}"))
    }

    async fn clear_cart(&self, order_form_id: &OrderFormId) -> Result<(), CartError> {
        self.record(CartCall::ClearCart(order_form_id.clone()));
        if self.check(|f| f.clear) {
            return Err(CartError::Unavailable(format!("clear_cart {order_form_id}")));
        }
        Ok(())
    }

    async fn add_items_to_cart(
        &self,
        order_form_id: &OrderFormId,
        items: Vec<CartItem>,
    ) -> Result<(), CartError> {
        self.record(CartCall::AddItems(order_form_id.clone(), items));
        if self.check(|f| f.add_items) {
            return Err(CartError::Rejected(format!("add_items_to_cart {order_form_id}")));
        }
        Ok(())
    }
}
