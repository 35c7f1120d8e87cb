//! Typed schema of quotation documents in the platform's document store.
//!
//! Documents are validated here, at the boundary. Line items travel as a JSON
//! string blob (`products`); a blob that does not decode is reported as a
//! [`DocumentError`], never patched up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use orderquote_core::{DomainResult, Money, OrderFormId, QuotationId};
use orderquote_quotations::{
    Decision, LineItem, Quotation, QuotationSnapshot, QuotationStatus, SellerInfo,
    TotalizerEntry, TotalizerKind, Totalizers, recompute,
};

/// Fields requested by list/detail searches.
pub const QUOTATION_FIELDS: &[&str] = &[
    "id",
    "quotationName",
    "comment",
    "responseComment",
    "cartTotal",
    "isPending",
    "isApproved",
    "isRejected",
    "orderFormId",
    "products",
    "totalizers",
    "sellerName",
    "sellerEmail",
    "userEmail",
    "createdAt",
];

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document {id}: invalid id: {reason}")]
    InvalidId { id: String, reason: String },

    #[error("document {id}: malformed products blob: {reason}")]
    MalformedProducts { id: String, reason: String },

    #[error("document {id}: malformed totalizers blob: {reason}")]
    MalformedTotalizers { id: String, reason: String },

    #[error("document {id}: amounts out of range: {reason}")]
    AmountOutOfRange { id: String, reason: String },

    #[error("document {id}: missing field {field}")]
    MissingField { id: String, field: &'static str },

    #[error("failed to encode document: {0}")]
    Encode(String),
}

/// A quotation as stored by the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationDocument {
    pub id: String,
    pub quotation_name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub response_comment: Option<String>,
    pub cart_total: Money,
    #[serde(default)]
    pub is_pending: bool,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub is_rejected: bool,
    pub order_form_id: String,
    /// JSON array of line items.
    pub products: String,
    /// JSON array of totalizer entries; absent on older documents.
    #[serde(default)]
    pub totalizers: Option<String>,
    #[serde(default)]
    pub seller_name: String,
    #[serde(default)]
    pub seller_email: String,
    pub user_email: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl QuotationDocument {
    pub fn from_quotation(quotation: &Quotation) -> Result<Self, DocumentError> {
        let snapshot = quotation
            .snapshot()
            .ok_or_else(|| DocumentError::Encode("quotation was never submitted".to_string()))?;
        Self::from_snapshot(&snapshot)
    }

    pub fn from_snapshot(snapshot: &QuotationSnapshot) -> Result<Self, DocumentError> {
        let products = serde_json::to_string(&snapshot.line_items)
            .map_err(|e| DocumentError::Encode(e.to_string()))?;
        let totalizers = serde_json::to_string(&snapshot.totalizers)
            .map_err(|e| DocumentError::Encode(e.to_string()))?;

        Ok(Self {
            id: snapshot.id.to_string(),
            quotation_name: snapshot.name.clone(),
            comment: snapshot.description.clone(),
            response_comment: snapshot.response_comment.clone(),
            cart_total: snapshot.totalizers.total(),
            is_pending: snapshot.status == QuotationStatus::Pending,
            is_approved: snapshot.status == QuotationStatus::Approved,
            is_rejected: snapshot.status == QuotationStatus::Rejected,
            order_form_id: snapshot.order_form_id.to_string(),
            products,
            totalizers: Some(totalizers),
            seller_name: snapshot.seller.name.clone(),
            seller_email: snapshot.seller.email.clone(),
            user_email: snapshot.buyer_email.clone(),
            created_at: Some(snapshot.created_at),
        })
    }

    /// Status from the stored flags; pending wins, then approved, then rejected.
    pub fn status(&self) -> QuotationStatus {
        if self.is_pending {
            QuotationStatus::Pending
        } else if self.is_approved {
            QuotationStatus::Approved
        } else if self.is_rejected {
            QuotationStatus::Rejected
        } else {
            QuotationStatus::Unknown
        }
    }

    pub fn into_quotation(self) -> Result<Quotation, DocumentError> {
        let status = self.status();

        let id = self
            .id
            .parse::<QuotationId>()
            .map_err(|e| DocumentError::InvalidId {
                id: self.id.clone(),
                reason: e.to_string(),
            })?;

        let order_form_id =
            OrderFormId::new(self.order_form_id.clone()).map_err(|e| DocumentError::InvalidId {
                id: self.id.clone(),
                reason: e.to_string(),
            })?;

        let created_at = self.created_at.ok_or_else(|| DocumentError::MissingField {
            id: self.id.clone(),
            field: "createdAt",
        })?;

        let line_items: Vec<LineItem> =
            serde_json::from_str(&self.products).map_err(|e| DocumentError::MalformedProducts {
                id: self.id.clone(),
                reason: e.to_string(),
            })?;

        let totalizers = match self.totalizers.as_deref() {
            Some(blob) => serde_json::from_str::<Totalizers>(blob).map_err(|e| {
                DocumentError::MalformedTotalizers {
                    id: self.id.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => legacy_totalizers(&line_items, self.cart_total).map_err(|e| {
                DocumentError::AmountOutOfRange {
                    id: self.id.clone(),
                    reason: e.to_string(),
                }
            })?,
        };

        Ok(Quotation::restore(QuotationSnapshot {
            id,
            name: self.quotation_name,
            description: self.comment,
            line_items,
            totalizers,
            buyer_email: self.user_email,
            seller: SellerInfo {
                email: self.seller_email,
                name: self.seller_name,
            },
            status,
            response_comment: self.response_comment,
            order_form_id,
            created_at,
        }))
    }
}

/// Documents written before totalizers were stored only carry `cartTotal`.
fn legacy_totalizers(line_items: &[LineItem], cart_total: Money) -> DomainResult<Totalizers> {
    let mut totalizers = recompute(line_items, &Totalizers::new())?;
    totalizers.upsert(TotalizerEntry::new(TotalizerKind::Total, cart_total));
    Ok(totalizers)
}

/// Partial update written when an approver decides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationPatch {
    pub is_approved: bool,
    pub is_rejected: bool,
    pub is_pending: bool,
    pub response_comment: String,
}

impl QuotationPatch {
    pub fn decision(decision: Decision, response_comment: impl Into<String>) -> Self {
        Self {
            is_approved: decision == Decision::Approve,
            is_rejected: decision == Decision::Reject,
            is_pending: false,
            response_comment: response_comment.into(),
        }
    }

    pub fn apply_to(&self, doc: &mut QuotationDocument) {
        doc.is_approved = self.is_approved;
        doc.is_rejected = self.is_rejected;
        doc.is_pending = self.is_pending;
        doc.response_comment = Some(self.response_comment.clone());
    }
}
