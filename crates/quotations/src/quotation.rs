//! Quotation aggregate: submission, approval and rejection.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use orderquote_core::{Aggregate, AggregateRoot, DomainError, OrderFormId, QuotationId};

use crate::line_item::LineItem;
use crate::status::QuotationStatus;
use crate::totalizer::Totalizers;
use crate::totals::recompute;

/// Maximum length (in characters) of a quotation's description.
pub const DESCRIPTION_MAX_LEN: usize = 100;

/// Who is submitting: the session's authentication flag and email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerIdentity {
    pub authenticated: bool,
    pub email: String,
}

/// Seller side of a quotation, supplied by the host (never scraped from a page).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerInfo {
    /// Operator (sales agent) email; empty when the buyer submits alone.
    pub email: String,
    /// Display name of the seller(s), comma separated when several.
    pub name: String,
}

/// Approver decision on a pending quotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

/// Plain record of a quotation's state, used to rehydrate from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationSnapshot {
    pub id: QuotationId,
    pub name: String,
    pub description: String,
    pub line_items: Vec<LineItem>,
    pub totalizers: Totalizers,
    pub buyer_email: String,
    pub seller: SellerInfo,
    pub status: QuotationStatus,
    pub response_comment: Option<String>,
    pub order_form_id: OrderFormId,
    pub created_at: DateTime<Utc>,
}

/// Aggregate root: Quotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quotation {
    id: QuotationId,
    name: String,
    description: String,
    line_items: Vec<LineItem>,
    totalizers: Totalizers,
    buyer_email: String,
    seller: SellerInfo,
    status: QuotationStatus,
    response_comment: Option<String>,
    order_form_id: Option<OrderFormId>,
    created_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Quotation {
    /// Create an empty, not-yet-submitted aggregate instance.
    pub fn empty(id: QuotationId) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
            line_items: Vec::new(),
            totalizers: Totalizers::new(),
            buyer_email: String::new(),
            seller: SellerInfo::default(),
            status: QuotationStatus::Pending,
            response_comment: None,
            order_form_id: None,
            created_at: None,
            version: 0,
            created: false,
        }
    }

    /// Rebuild a persisted quotation.
    pub fn restore(snapshot: QuotationSnapshot) -> Self {
        let version = if snapshot.status.is_terminal() { 2 } else { 1 };
        Self {
            id: snapshot.id,
            name: snapshot.name,
            description: snapshot.description,
            line_items: snapshot.line_items,
            totalizers: snapshot.totalizers,
            buyer_email: snapshot.buyer_email,
            seller: snapshot.seller,
            status: snapshot.status,
            response_comment: snapshot.response_comment,
            order_form_id: Some(snapshot.order_form_id),
            created_at: Some(snapshot.created_at),
            version,
            created: true,
        }
    }

    /// `None` until the quotation has been submitted.
    pub fn snapshot(&self) -> Option<QuotationSnapshot> {
        if !self.created {
            return None;
        }
        Some(QuotationSnapshot {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            line_items: self.line_items.clone(),
            totalizers: self.totalizers.clone(),
            buyer_email: self.buyer_email.clone(),
            seller: self.seller.clone(),
            status: self.status,
            response_comment: self.response_comment.clone(),
            order_form_id: self.order_form_id.clone()?,
            created_at: self.created_at?,
        })
    }

    pub fn id_typed(&self) -> QuotationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn totalizers(&self) -> &Totalizers {
        &self.totalizers
    }

    pub fn buyer_email(&self) -> &str {
        &self.buyer_email
    }

    pub fn seller(&self) -> &SellerInfo {
        &self.seller
    }

    pub fn status(&self) -> QuotationStatus {
        self.status
    }

    pub fn response_comment(&self) -> Option<&str> {
        self.response_comment.as_deref()
    }

    pub fn order_form_id(&self) -> Option<&OrderFormId> {
        self.order_form_id.as_ref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn is_submitted(&self) -> bool {
        self.created
    }

    pub fn is_decidable(&self) -> bool {
        self.created && self.status == QuotationStatus::Pending
    }

    /// Last day the quotation's prices are honoured.
    pub fn expires_at(&self, cart_life_span_days: u32) -> Option<DateTime<Utc>> {
        self.created_at
            .map(|created| created + Duration::days(i64::from(cart_life_span_days)))
    }
}

impl AggregateRoot for Quotation {
    type Id = QuotationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: SubmitQuotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitQuotation {
    pub quotation_id: QuotationId,
    pub name: String,
    pub description: String,
    pub buyer: BuyerIdentity,
    pub seller: SellerInfo,
    pub line_items: Vec<LineItem>,
    /// Totalizers as last shown to the buyer; `Items`/`Total` are recomputed.
    pub totalizers: Totalizers,
    pub order_form_id: OrderFormId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DecideQuotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecideQuotation {
    pub quotation_id: QuotationId,
    pub decision: Decision,
    pub response_comment: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotationCommand {
    SubmitQuotation(SubmitQuotation),
    DecideQuotation(DecideQuotation),
}

/// Event: QuotationSubmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationSubmitted {
    pub quotation_id: QuotationId,
    pub name: String,
    pub description: String,
    pub buyer_email: String,
    pub seller: SellerInfo,
    pub line_items: Vec<LineItem>,
    pub totalizers: Totalizers,
    pub order_form_id: OrderFormId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuotationApproved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationApproved {
    pub quotation_id: QuotationId,
    pub response_comment: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuotationRejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationRejected {
    pub quotation_id: QuotationId,
    pub response_comment: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotationEvent {
    QuotationSubmitted(QuotationSubmitted),
    QuotationApproved(QuotationApproved),
    QuotationRejected(QuotationRejected),
}

impl QuotationEvent {
    /// Stable event name (e.g. "quotation.approved").
    pub fn event_type(&self) -> &'static str {
        match self {
            QuotationEvent::QuotationSubmitted(_) => "quotation.submitted",
            QuotationEvent::QuotationApproved(_) => "quotation.approved",
            QuotationEvent::QuotationRejected(_) => "quotation.rejected",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            QuotationEvent::QuotationSubmitted(e) => e.occurred_at,
            QuotationEvent::QuotationApproved(e) => e.occurred_at,
            QuotationEvent::QuotationRejected(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Quotation {
    type Command = QuotationCommand;
    type Event = QuotationEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            QuotationEvent::QuotationSubmitted(e) => {
                self.id = e.quotation_id;
                self.name = e.name.clone();
                self.description = e.description.clone();
                self.buyer_email = e.buyer_email.clone();
                self.seller = e.seller.clone();
                self.line_items = e.line_items.clone();
                self.totalizers = e.totalizers.clone();
                self.order_form_id = Some(e.order_form_id.clone());
                self.created_at = Some(e.occurred_at);
                self.status = QuotationStatus::Pending;
                self.response_comment = None;
                self.created = true;
            }
            QuotationEvent::QuotationApproved(e) => {
                self.status = QuotationStatus::Approved;
                self.response_comment = Some(e.response_comment.clone());
            }
            QuotationEvent::QuotationRejected(e) => {
                self.status = QuotationStatus::Rejected;
                self.response_comment = Some(e.response_comment.clone());
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            QuotationCommand::SubmitQuotation(cmd) => self.handle_submit(cmd),
            QuotationCommand::DecideQuotation(cmd) => self.handle_decide(cmd),
        }
    }
}

impl Quotation {
    fn handle_submit(&self, cmd: &SubmitQuotation) -> Result<Vec<QuotationEvent>, DomainError> {
        if self.created {
            return Err(DomainError::invalid_state("quotation already submitted"));
        }

        if cmd.line_items.is_empty() {
            return Err(DomainError::validation("quotation has no line items"));
        }

        if !cmd.buyer.authenticated {
            return Err(DomainError::validation("buyer is not authenticated"));
        }

        if cmd.buyer.email.trim().is_empty() {
            return Err(DomainError::validation("buyer email is required"));
        }

        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("quotation name is required"));
        }

        if cmd.description.chars().count() > DESCRIPTION_MAX_LEN {
            return Err(DomainError::validation(format!(
                "description exceeds {DESCRIPTION_MAX_LEN} characters"
            )));
        }

        for (i, item) in cmd.line_items.iter().enumerate() {
            if item.quantity == 0 {
                return Err(DomainError::validation(format!(
                    "line item {} has zero quantity",
                    item.id
                )));
            }
            if item.unit_price.is_negative() {
                return Err(DomainError::validation(format!(
                    "line item {} has a negative unit price",
                    item.id
                )));
            }
            if cmd.line_items[..i].iter().any(|other| other.id == item.id) {
                return Err(DomainError::validation(format!(
                    "duplicate line item {}",
                    item.id
                )));
            }
        }

        Ok(vec![QuotationEvent::QuotationSubmitted(QuotationSubmitted {
            quotation_id: cmd.quotation_id,
            name: cmd.name.trim().to_string(),
            description: cmd.description.clone(),
            buyer_email: cmd.buyer.email.clone(),
            seller: cmd.seller.clone(),
            line_items: cmd.line_items.clone(),
            totalizers: recompute(&cmd.line_items, &cmd.totalizers)?,
            order_form_id: cmd.order_form_id.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_decide(&self, cmd: &DecideQuotation) -> Result<Vec<QuotationEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }

        if self.id != cmd.quotation_id {
            return Err(DomainError::invariant("quotation_id mismatch"));
        }

        if self.status != QuotationStatus::Pending {
            return Err(DomainError::invalid_state(format!(
                "quotation is {} and can no longer be decided",
                self.status
            )));
        }

        let event = match cmd.decision {
            Decision::Approve => QuotationEvent::QuotationApproved(QuotationApproved {
                quotation_id: cmd.quotation_id,
                response_comment: cmd.response_comment.clone(),
                occurred_at: cmd.occurred_at,
            }),
            Decision::Reject => QuotationEvent::QuotationRejected(QuotationRejected {
                quotation_id: cmd.quotation_id,
                response_comment: cmd.response_comment.clone(),
                occurred_at: cmd.occurred_at,
            }),
        };

        Ok(vec![event])
    }
}
