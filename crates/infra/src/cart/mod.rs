//! Cart/checkout service boundary.
//!
//! Saved carts and live order forms belong to the platform. Every price crossing
//! this boundary is in minor currency units (decimal amount × 100).

pub mod in_memory;
pub mod r#trait;

pub use in_memory::{CartCall, InMemoryCartService};
pub use r#trait::{
    CartError, CartId, CartItem, CartService, CartSpec, SavedCartItem, Seller, ShippingAddress,
};
