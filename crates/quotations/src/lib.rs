//! Quotations domain module.
//!
//! Business rules for buyer-submitted quotations: the totals engine that keeps
//! totalizers consistent while prices are edited, and the approval lifecycle
//! (`Pending` → `Approved` | `Rejected`). Pure deterministic logic: no IO, no
//! HTTP, no storage.

pub mod draft;
pub mod filter;
pub mod line_item;
pub mod quotation;
pub mod status;
pub mod totalizer;
pub mod totals;

pub use draft::QuotationDraft;
pub use filter::{QuotationFilter, StatusFilter, owned_by};
pub use line_item::LineItem;
pub use quotation::{
    BuyerIdentity, DecideQuotation, Decision, Quotation, QuotationApproved, QuotationCommand,
    QuotationEvent, QuotationRejected, QuotationSnapshot, QuotationSubmitted, SellerInfo,
    SubmitQuotation, DESCRIPTION_MAX_LEN,
};
pub use status::{QuotationStatus, status_color};
pub use totalizer::{TotalizerEntry, TotalizerKind, Totalizers};
pub use totals::{recompute, seller_subtotal, set_quantity, set_unit_price};
