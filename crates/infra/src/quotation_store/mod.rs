//! Quotation document store boundary.
//!
//! The platform's document store is a plain key/value service with
//! search/create/patch/delete. This module types its contract and ships an
//! in-memory implementation for tests/dev.

pub mod document;
pub mod in_memory;
pub mod r#trait;

pub use document::{DocumentError, QUOTATION_FIELDS, QuotationDocument, QuotationPatch};
pub use in_memory::{InMemoryQuotationStore, StoreOp};
pub use r#trait::{QuotationStore, StoreError};
