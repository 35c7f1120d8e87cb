//! Quotation workflow orchestration.
//!
//! `QuotationService` drives the pure `Quotation` aggregate and performs the
//! platform calls around it:
//!
//! ```text
//! submit:  session check → handle(Submit) → store.create → save_cart per seller (concurrent)
//! decide:  store lookup  → handle(Decide) → store.patch  → [approve] clear_cart → add_items
//! list:    store.search  → decode → filter in memory
//! remove:  store.delete  (missing document counts as removed)
//! ```
//!
//! Multi-step operations are best-effort, not atomic: a failure after the store
//! write is returned as `ServiceError::External` and the written record stays.

mod errors;
mod gate;

pub use errors::ServiceError;
pub use gate::{Action, ActionGate, GateGuard};

use chrono::{DateTime, Utc};
use futures_util::future::join_all;

use orderquote_core::{Aggregate, DomainResult, OrderFormId, QuotationId, SellerId};
use orderquote_quotations::{
    DecideQuotation, Decision, Quotation, QuotationCommand, QuotationDraft, QuotationFilter,
    SellerInfo, SubmitQuotation, owned_by, seller_subtotal,
};

use crate::cart::{CartItem, CartService, CartSpec, SavedCartItem, Seller, ShippingAddress};
use crate::config::SetupConfigProvider;
use crate::quotation_store::{QUOTATION_FIELDS, QuotationDocument, QuotationPatch, QuotationStore, StoreError};
use crate::session::{SessionCache, SessionProvider, SessionSnapshot};

use errors::{cart_err, store_err};

/// Everything the quotation form collects before "save".
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub name: String,
    pub description: String,
    pub draft: QuotationDraft,
    /// The buyer's live order form the items were copied from.
    pub order_form_id: OrderFormId,
    /// Sellers of the order form, used to name the per-seller carts.
    pub sellers: Vec<Seller>,
    /// Email of the operator submitting on the buyer's behalf, supplied by the host.
    pub operator_email: Option<String>,
    pub shipping_address: Option<ShippingAddress>,
    /// Empty the buyer's live cart once the quotation is saved.
    pub clear_cart_after: bool,
}

/// A quotation with the display data of its detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotationDetail {
    pub quotation: Quotation,
    pub expires_at: Option<DateTime<Utc>>,
    pub logo_url: Option<String>,
}

pub struct QuotationService<S, C, P, G> {
    store: S,
    carts: C,
    session: P,
    setup: G,
    session_cache: SessionCache,
    gate: ActionGate,
}

impl<S, C, P, G> QuotationService<S, C, P, G>
where
    S: QuotationStore,
    C: CartService,
    P: SessionProvider,
    G: SetupConfigProvider,
{
    pub fn new(store: S, carts: C, session: P, setup: G) -> Self {
        Self {
            store,
            carts,
            session,
            setup,
            session_cache: SessionCache::new(),
            gate: ActionGate::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn carts(&self) -> &C {
        &self.carts
    }

    pub fn session_cache(&self) -> &SessionCache {
        &self.session_cache
    }

    pub fn gate(&self) -> &ActionGate {
        &self.gate
    }

    /// Ask the provider, then mirror the answer into the cache.
    async fn fresh_session(&self) -> Result<SessionSnapshot, ServiceError> {
        let session = self.session.current_session().await?;
        self.session_cache.record(&session);
        Ok(session)
    }

    /// Validate and persist a new pending quotation, then save one cart per seller.
    #[tracing::instrument(skip(self, request), fields(order_form_id = %request.order_form_id))]
    pub async fn submit(&self, request: SubmitRequest) -> Result<Quotation, ServiceError> {
        let _guard = self
            .gate
            .try_acquire(Action::Submit, request.order_form_id.as_str())?;

        let session = self.fresh_session().await?;

        let SubmitRequest {
            name,
            description,
            draft,
            order_form_id,
            sellers: known_sellers,
            operator_email,
            shipping_address,
            clear_cart_after,
        } = request;
        let sellers = draft.sellers();
        let (line_items, external) = draft.into_parts();

        let quotation_id = QuotationId::new();
        let mut quotation = Quotation::empty(quotation_id);
        let command = QuotationCommand::SubmitQuotation(SubmitQuotation {
            quotation_id,
            name,
            description,
            buyer: session.buyer_identity(),
            seller: SellerInfo {
                email: operator_email.unwrap_or_default(),
                name: seller_names(&sellers, &known_sellers),
            },
            line_items,
            totalizers: external,
            order_form_id: order_form_id.clone(),
            occurred_at: Utc::now(),
        });

        let events = quotation.handle(&command).map_err(|e| {
            tracing::warn!(error = %e, "quotation rejected");
            ServiceError::from(e)
        })?;
        for event in &events {
            quotation.apply(event);
        }

        let carts = seller_carts(&quotation, &sellers, &known_sellers, shipping_address.as_ref())?;
        let document = QuotationDocument::from_quotation(&quotation)?;
        let expected_id = document.id.clone();

        let document_id = self
            .store
            .create(document)
            .await
            .map_err(store_err("store.create"))?;
        if document_id != expected_id {
            tracing::error!(%quotation_id, %document_id, "store keyed the quotation under another id");
            return Err(ServiceError::External {
                operation: "store.create",
                message: format!("store returned id {document_id} for quotation {expected_id}"),
            });
        }
        tracing::info!(%quotation_id, "quotation submitted");

        let results = join_all(carts.into_iter().map(|cart| async move {
            let seller = cart.seller.clone();
            (seller, self.carts.save_cart(cart).await)
        }))
        .await;

        let failed: Vec<String> = results
            .iter()
            .filter_map(|(seller, result)| {
                result.as_ref().err().map(|e| format!("seller {seller}: {e}"))
            })
            .collect();

        if !failed.is_empty() {
            tracing::error!(%quotation_id, ?failed, "saving seller carts failed; quotation kept");
            return Err(ServiceError::External {
                operation: "cart.save_cart",
                message: format!(
                    "quotation {quotation_id} was saved but {} of {} seller carts failed: {}",
                    failed.len(),
                    results.len(),
                    failed.join("; ")
                ),
            });
        }

        if clear_cart_after {
            self.carts
                .clear_cart(&order_form_id)
                .await
                .map_err(cart_err("cart.clear_cart"))?;
            tracing::debug!(%quotation_id, "buyer cart cleared after submit");
        }

        Ok(quotation)
    }

    /// Approve or reject a pending quotation.
    ///
    /// Approval then loads the quotation's items into its order form (clear, then
    /// add). A cart failure at that point leaves the quotation approved.
    #[tracing::instrument(skip(self, response_comment))]
    pub async fn decide(
        &self,
        quotation_id: QuotationId,
        decision: Decision,
        response_comment: &str,
    ) -> Result<Quotation, ServiceError> {
        let key = quotation_id.to_string();
        let _guard = self.gate.try_acquire(Action::Decide, &key)?;

        let mut quotation = self.load(&key).await?;

        let events = quotation
            .handle(&QuotationCommand::DecideQuotation(DecideQuotation {
                quotation_id,
                decision,
                response_comment: response_comment.to_string(),
                occurred_at: Utc::now(),
            }))
            .map_err(|e| {
                tracing::warn!(error = %e, "decision rejected");
                ServiceError::from(e)
            })?;

        let cart_items = match decision {
            Decision::Approve => Some(cart_items(&quotation)?),
            Decision::Reject => None,
        };

        self.store
            .patch(&key, QuotationPatch::decision(decision, response_comment))
            .await
            .map_err(store_err("store.patch"))?;

        for event in &events {
            quotation.apply(event);
            tracing::info!(event_type = event.event_type(), "quotation decided");
        }

        if let Some(items) = cart_items {
            let order_form_id = quotation.order_form_id().cloned().ok_or_else(|| {
                ServiceError::external("cart.clear_cart", "quotation has no order form")
            })?;
            self.load_into_cart(&order_form_id, items).await?;
        }

        Ok(quotation)
    }

    async fn load_into_cart(
        &self,
        order_form_id: &OrderFormId,
        items: Vec<CartItem>,
    ) -> Result<(), ServiceError> {
        self.carts
            .clear_cart(order_form_id)
            .await
            .map_err(|e| {
                tracing::error!(%order_form_id, error = %e, "clearing cart failed");
                ServiceError::external("cart.clear_cart", e)
            })?;

        let count = items.len();
        self.carts
            .add_items_to_cart(order_form_id, items)
            .await
            .map_err(|e| {
                tracing::error!(%order_form_id, error = %e, "adding quotation items failed");
                ServiceError::external("cart.add_items", e)
            })?;

        tracing::info!(%order_form_id, count, "order form loaded with quotation items");
        Ok(())
    }

    /// All quotations matching `filter`; one store search, filtered in memory.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, filter: &QuotationFilter) -> Result<Vec<Quotation>, ServiceError> {
        let all = self.fetch_all().await?;
        Ok(filter.apply(&all))
    }

    /// The current buyer's own quotations.
    #[tracing::instrument(skip(self))]
    pub async fn my_quotations(&self) -> Result<Vec<Quotation>, ServiceError> {
        let session = self.fresh_session().await?;
        let email = match session.email.as_deref() {
            Some(email) if session.authenticated && !email.is_empty() => email.to_string(),
            _ => return Err(ServiceError::Validation("buyer is not authenticated".to_string())),
        };

        let all = self.fetch_all().await?;
        Ok(owned_by(&all, &email))
    }

    #[tracing::instrument(skip(self))]
    pub async fn detail(&self, quotation_id: QuotationId) -> Result<QuotationDetail, ServiceError> {
        let quotation = self.load(&quotation_id.to_string()).await?;
        let setup = self.setup.setup_config().await?;

        Ok(QuotationDetail {
            expires_at: quotation.expires_at(setup.cart_life_span_days),
            logo_url: setup.store_logo_url,
            quotation,
        })
    }

    /// Delete a quotation whatever its status. Deleting a missing one succeeds.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, quotation_id: QuotationId) -> Result<(), ServiceError> {
        let key = quotation_id.to_string();
        let _guard = self.gate.try_acquire(Action::Remove, &key)?;

        match self.store.delete(&key).await {
            Ok(()) => {
                tracing::info!("quotation removed");
                Ok(())
            }
            Err(StoreError::NotFound(_)) => {
                tracing::debug!("quotation already removed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "removing quotation failed");
                Err(ServiceError::external("store.delete", e))
            }
        }
    }

    async fn fetch_all(&self) -> Result<Vec<Quotation>, ServiceError> {
        let documents = self
            .store
            .search(QUOTATION_FIELDS)
            .await
            .map_err(store_err("store.search"))?;

        let quotations = documents
            .into_iter()
            .map(QuotationDocument::into_quotation)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(quotations)
    }

    async fn load(&self, key: &str) -> Result<Quotation, ServiceError> {
        let document = self
            .store
            .get(key, QUOTATION_FIELDS)
            .await
            .map_err(store_err("store.search"))?
            .ok_or_else(|| ServiceError::NotFound(key.to_string()))?;
        Ok(document.into_quotation()?)
    }
}

/// Names of the sellers present in the quotation, comma separated.
fn seller_names(present: &[SellerId], known: &[Seller]) -> String {
    present
        .iter()
        .map(|id| {
            known
                .iter()
                .find(|s| &s.id == id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| id.to_string())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// One saved cart per seller, holding only that seller's items.
fn seller_carts(
    quotation: &Quotation,
    sellers: &[SellerId],
    known: &[Seller],
    address: Option<&ShippingAddress>,
) -> Result<Vec<CartSpec>, ServiceError> {
    let creation_date = quotation.created_at().unwrap_or_else(Utc::now);

    sellers
        .iter()
        .map(|seller| {
            let items = quotation
                .line_items()
                .iter()
                .filter(|item| &item.seller == seller)
                .map(SavedCartItem::from_line_item)
                .collect::<DomainResult<Vec<_>>>()?;
            let total = seller_subtotal(quotation.line_items(), seller)?.to_minor_units()?;

            Ok(CartSpec {
                email: quotation.buyer_email().to_string(),
                cart_name: format!(
                    "{} (seller {})",
                    quotation.name(),
                    seller_names(std::slice::from_ref(seller), known)
                ),
                description: quotation.description().to_string(),
                items,
                creation_date,
                total,
                seller: seller.clone(),
                address: address.cloned(),
            })
        })
        .collect()
}

fn cart_items(quotation: &Quotation) -> Result<Vec<CartItem>, ServiceError> {
    Ok(quotation
        .line_items()
        .iter()
        .map(CartItem::from_line_item)
        .collect::<DomainResult<Vec<_>>>()?)
}
