//! Integration tests for the quotation workflow.
//!
//! Tests: QuotationService → QuotationStore / CartService / SessionProvider
//!
//! Verifies:
//! - Submissions are validated before anything is written
//! - Platform calls happen in the documented order
//! - Failures after a store write leave that write in place

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use rust_decimal_macros::dec;

    use orderquote_core::{Money, OrderFormId, QuotationId, SellerId, SkuId};
    use orderquote_quotations::{
        Decision, LineItem, QuotationDraft, QuotationFilter, QuotationStatus, TotalizerEntry,
        TotalizerKind, Totalizers,
    };

    use crate::cart::{CartCall, CartItem, InMemoryCartService, Seller};
    use crate::config::{SetupConfig, StaticSetupConfig};
    use crate::quotation_store::{
        InMemoryQuotationStore, QuotationDocument, QuotationPatch, QuotationStore, StoreError,
        StoreOp,
    };
    use crate::service::{Action, QuotationService, ServiceError, SubmitRequest};
    use crate::session::{SessionSnapshot, StaticSessionProvider};

    type TestService = QuotationService<
        Arc<InMemoryQuotationStore>,
        Arc<InMemoryCartService>,
        Arc<StaticSessionProvider>,
        StaticSetupConfig,
    >;

    struct Harness {
        service: TestService,
        store: Arc<InMemoryQuotationStore>,
        carts: Arc<InMemoryCartService>,
        session: Arc<StaticSessionProvider>,
    }

    fn setup_with(session: StaticSessionProvider, setup: SetupConfig) -> Harness {
        orderquote_observability::tracing::init_with_filter("warn");

        let store = Arc::new(InMemoryQuotationStore::new());
        let carts = Arc::new(InMemoryCartService::new());
        let session = Arc::new(session);
        let service = QuotationService::new(
            store.clone(),
            carts.clone(),
            session.clone(),
            StaticSetupConfig(setup),
        );
        Harness {
            service,
            store,
            carts,
            session,
        }
    }

    fn setup() -> Harness {
        setup_with(
            StaticSessionProvider::new(SessionSnapshot::authenticated("alice@buyer.com")),
            SetupConfig::default(),
        )
    }

    fn seller(id: &str) -> SellerId {
        SellerId::new(id).unwrap()
    }

    fn order_form() -> OrderFormId {
        OrderFormId::new("of-1").unwrap()
    }

    fn item(id: &str, seller_id: &str, price: Money, quantity: u32) -> LineItem {
        LineItem {
            id: SkuId::new(id).unwrap(),
            product_id: format!("p-{id}"),
            name: format!("Product {id}"),
            sku_name: format!("Product {id}"),
            ref_id: None,
            image_url: None,
            list_price: price,
            unit_price: price,
            quantity,
            seller: seller(seller_id),
        }
    }

    fn shipping(amount: i64) -> Totalizers {
        Totalizers::from(vec![TotalizerEntry::new(
            TotalizerKind::Shipping,
            Money::from_major(amount),
        )])
    }

    fn request(draft: QuotationDraft) -> SubmitRequest {
        SubmitRequest {
            name: "Spring order".to_string(),
            description: "Tools for the new site".to_string(),
            draft,
            order_form_id: order_form(),
            sellers: vec![
                Seller {
                    id: seller("1"),
                    name: "Main Store".to_string(),
                },
                Seller {
                    id: seller("2"),
                    name: "Partner".to_string(),
                },
            ],
            operator_email: Some("agent@store.com".to_string()),
            shipping_address: None,
            clear_cart_after: false,
        }
    }

    fn two_seller_draft() -> QuotationDraft {
        QuotationDraft::new(
            vec![
                item("a", "1", Money::from_major(10), 2),
                item("b", "2", Money::from_major(5), 1),
            ],
            shipping(3),
        )
        .unwrap()
    }

    fn single_item_draft(price: Money) -> QuotationDraft {
        QuotationDraft::new(vec![item("a", "1", price, 2)], Totalizers::new()).unwrap()
    }

    #[tokio::test]
    async fn submit_persists_pending_quotation_and_saves_cart_per_seller() -> anyhow::Result<()> {
        let h = setup();

        let quotation = h.service.submit(request(two_seller_draft())).await?;

        assert_eq!(quotation.status(), QuotationStatus::Pending);
        assert_eq!(quotation.buyer_email(), "alice@buyer.com");
        assert_eq!(quotation.seller().name, "Main Store, Partner");
        assert_eq!(quotation.seller().email, "agent@store.com");
        assert_eq!(quotation.totalizers().total(), Money::from_major(28));

        let documents = h.store.snapshot();
        assert_eq!(documents.len(), 1);
        assert!(documents[0].is_pending);
        assert_eq!(documents[0].id, quotation.id_typed().to_string());
        assert_eq!(documents[0].cart_total, Money::from_major(28));

        let carts = h.carts.saved_carts();
        assert_eq!(carts.len(), 2);

        let main = carts.iter().find(|c| c.seller == seller("1")).unwrap();
        assert_eq!(main.cart_name, "Spring order (seller Main Store)");
        assert_eq!(main.total, 2000);
        assert_eq!(main.items.len(), 1);
        assert_eq!(main.items[0].selling_price, 1000);
        assert_eq!(main.email, "alice@buyer.com");

        let partner = carts.iter().find(|c| c.seller == seller("2")).unwrap();
        assert_eq!(partner.cart_name, "Spring order (seller Partner)");
        assert_eq!(partner.total, 500);

        assert!(!h.carts.calls().iter().any(|c| matches!(c, CartCall::ClearCart(_))));
        Ok(())
    }

    #[tokio::test]
    async fn submit_with_empty_draft_writes_nothing() {
        let h = setup();
        let draft = QuotationDraft::new(Vec::new(), shipping(3)).unwrap();

        let err = h.service.submit(request(draft)).await.unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(h.store.count(StoreOp::Create), 0);
        assert!(h.carts.calls().is_empty());
    }

    #[tokio::test]
    async fn submit_requires_authenticated_buyer() {
        let h = setup_with(
            StaticSessionProvider::new(SessionSnapshot::anonymous()),
            SetupConfig::default(),
        );

        let err = h.service.submit(request(two_seller_draft())).await.unwrap_err();

        match err {
            ServiceError::Validation(msg) if msg.contains("authenticated") => {}
            other => panic!("expected authentication failure, got {other:?}"),
        }
        assert_eq!(h.service.session_cache().last_known_authenticated(), Some(false));
        assert_eq!(h.store.count(StoreOp::Create), 0);
    }

    #[tokio::test]
    async fn submit_fails_when_session_is_unavailable() {
        let h = setup_with(StaticSessionProvider::unavailable(), SetupConfig::default());

        let err = h.service.submit(request(two_seller_draft())).await.unwrap_err();

        assert!(err.is_external());
        assert_eq!(h.service.session_cache().last_known_authenticated(), None);
        assert!(h.store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn submit_store_failure_skips_carts() {
        let h = setup();
        h.store.fail(StoreOp::Create);

        let err = h.service.submit(request(two_seller_draft())).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::External {
                operation: "store.create",
                ..
            }
        ));
        assert!(h.carts.calls().is_empty());
    }

    #[tokio::test]
    async fn cart_failure_after_submit_keeps_the_document() {
        let h = setup();
        h.carts.fail_seller(seller("2"));

        let err = h.service.submit(request(two_seller_draft())).await.unwrap_err();

        match &err {
            ServiceError::External { operation, message } => {
                assert_eq!(*operation, "cart.save_cart");
                assert!(message.contains("1 of 2"));
            }
            other => panic!("expected external error, got {other:?}"),
        }
        assert_eq!(h.store.snapshot().len(), 1);
        assert_eq!(h.carts.saved_carts().len(), 2);
    }

    #[tokio::test]
    async fn submit_can_clear_the_buyer_cart_afterwards() -> anyhow::Result<()> {
        let h = setup();
        let mut req = request(two_seller_draft());
        req.clear_cart_after = true;

        h.service.submit(req).await?;

        let calls = h.carts.calls();
        assert_eq!(calls.last(), Some(&CartCall::ClearCart(order_form())));
        Ok(())
    }

    #[tokio::test]
    async fn approve_loads_items_into_order_form_in_minor_units() -> anyhow::Result<()> {
        let h = setup();
        let submitted = h
            .service
            .submit(request(single_item_draft(Money::new(dec!(12.34)))))
            .await?;
        let before = h.carts.calls().len();

        let approved = h
            .service
            .decide(submitted.id_typed(), Decision::Approve, "deal")
            .await?;

        assert_eq!(approved.status(), QuotationStatus::Approved);
        assert_eq!(approved.response_comment(), Some("deal"));

        let calls = h.carts.calls()[before..].to_vec();
        assert_eq!(
            calls,
            vec![
                CartCall::ClearCart(order_form()),
                CartCall::AddItems(
                    order_form(),
                    vec![CartItem {
                        id: SkuId::new("a").unwrap(),
                        quantity: 2,
                        selling_price: 1234,
                        seller: seller("1"),
                    }]
                ),
            ]
        );

        let doc = &h.store.snapshot()[0];
        assert!(doc.is_approved && !doc.is_pending && !doc.is_rejected);
        assert_eq!(doc.response_comment.as_deref(), Some("deal"));
        Ok(())
    }

    #[tokio::test]
    async fn reject_leaves_the_cart_alone() -> anyhow::Result<()> {
        let h = setup();
        let submitted = h.service.submit(request(two_seller_draft())).await?;
        let before = h.carts.calls().len();

        let rejected = h
            .service
            .decide(submitted.id_typed(), Decision::Reject, "too low")
            .await?;

        assert_eq!(rejected.status(), QuotationStatus::Rejected);
        assert_eq!(h.carts.calls().len(), before);
        assert!(h.store.snapshot()[0].is_rejected);
        Ok(())
    }

    #[tokio::test]
    async fn deciding_twice_is_rejected_and_keeps_first_decision() -> anyhow::Result<()> {
        let h = setup();
        let submitted = h.service.submit(request(two_seller_draft())).await?;
        h.service
            .decide(submitted.id_typed(), Decision::Approve, "ok")
            .await?;

        let err = h
            .service
            .decide(submitted.id_typed(), Decision::Reject, "changed my mind")
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(h.store.count(StoreOp::Patch), 1);
        let doc = &h.store.snapshot()[0];
        assert!(doc.is_approved);
        assert_eq!(doc.response_comment.as_deref(), Some("ok"));
        Ok(())
    }

    #[tokio::test]
    async fn cart_failure_after_approval_keeps_status() -> anyhow::Result<()> {
        let h = setup();
        let submitted = h.service.submit(request(two_seller_draft())).await?;
        h.carts.fail_add_items();

        let err = h
            .service
            .decide(submitted.id_typed(), Decision::Approve, "")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::External {
                operation: "cart.add_items",
                ..
            }
        ));
        assert!(h.store.snapshot()[0].is_approved);
        Ok(())
    }

    #[tokio::test]
    async fn deciding_unknown_quotation_is_not_found() {
        let h = setup();

        let err = h
            .service
            .decide(QuotationId::new(), Decision::Approve, "")
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(h.store.count(StoreOp::Patch), 0);
    }

    #[tokio::test]
    async fn concurrent_decision_on_same_quotation_is_busy() -> anyhow::Result<()> {
        let h = setup();
        let submitted = h.service.submit(request(two_seller_draft())).await?;
        let key = submitted.id_typed().to_string();

        let held = h.service.gate().try_acquire(Action::Decide, &key)?;
        let err = h
            .service
            .decide(submitted.id_typed(), Decision::Approve, "")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Busy { action: "decide", .. }));
        assert_eq!(h.store.count(StoreOp::Patch), 0);

        drop(held);
        h.service
            .decide(submitted.id_typed(), Decision::Approve, "")
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn list_composes_status_and_search_filters() -> anyhow::Result<()> {
        let h = setup();
        let alice = h.service.submit(request(two_seller_draft())).await?;

        h.session
            .set(SessionSnapshot::authenticated("bob@other.com"));
        let bob = h.service.submit(request(two_seller_draft())).await?;
        h.service.decide(bob.id_typed(), Decision::Approve, "").await?;

        let all = h.service.list(&QuotationFilter::all()).await?;
        assert_eq!(all.len(), 2);

        let pending = h
            .service
            .list(&QuotationFilter::all().with_status(QuotationStatus::Pending))
            .await?;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id_typed(), alice.id_typed());

        let bobs = h.service.list(&QuotationFilter::all().with_search("BOB")).await?;
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].id_typed(), bob.id_typed());

        let none = h
            .service
            .list(
                &QuotationFilter::all()
                    .with_status(QuotationStatus::Pending)
                    .with_search("bob"),
            )
            .await?;
        assert!(none.is_empty());

        let by_operator = h.service.list(&QuotationFilter::all().with_search("agent@")).await?;
        assert_eq!(by_operator.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn my_quotations_only_returns_the_current_buyers() -> anyhow::Result<()> {
        let h = setup();
        let alice = h.service.submit(request(two_seller_draft())).await?;
        h.session
            .set(SessionSnapshot::authenticated("bob@other.com"));
        h.service.submit(request(two_seller_draft())).await?;

        h.session
            .set(SessionSnapshot::authenticated("Alice@Buyer.com"));
        let mine = h.service.my_quotations().await?;
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id_typed(), alice.id_typed());

        h.session.set(SessionSnapshot::anonymous());
        assert!(matches!(
            h.service.my_quotations().await,
            Err(ServiceError::Validation(_))
        ));
        Ok(())
    }

    /// A service over a store seeded with one legacy document (no totalizers blob).
    fn service_over_legacy_document(h: &Harness, products: &str) -> TestService {
        let store = Arc::new(InMemoryQuotationStore::with_documents(vec![QuotationDocument {
            id: QuotationId::new().to_string(),
            quotation_name: "legacy".to_string(),
            comment: String::new(),
            response_comment: None,
            cart_total: Money::from_major(1),
            is_pending: true,
            is_approved: false,
            is_rejected: false,
            order_form_id: "of-1".to_string(),
            products: products.to_string(),
            totalizers: None,
            seller_name: String::new(),
            seller_email: String::new(),
            user_email: "alice@buyer.com".to_string(),
            created_at: Some(chrono::Utc::now()),
        }]));
        QuotationService::new(
            store,
            h.carts.clone(),
            h.session.clone(),
            StaticSetupConfig::default(),
        )
    }

    #[tokio::test]
    async fn list_fails_on_malformed_document() {
        let h = setup();
        let service = service_over_legacy_document(&h, "not json");

        let err = service.list(&QuotationFilter::all()).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::External {
                operation: "document.decode",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn list_reports_document_with_out_of_range_amounts() {
        let h = setup();
        let service = service_over_legacy_document(
            &h,
            r#"[{"id":"a","productId":"p","name":"n","skuName":"n","listPrice":1,"sellingPrice":5e28,"quantity":2,"seller":"1"}]"#,
        );

        let err = service.list(&QuotationFilter::all()).await.unwrap_err();

        match err {
            ServiceError::External {
                operation: "document.decode",
                message,
            } => assert!(message.contains("out of range")),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_with_price_beyond_minor_unit_range_writes_nothing() {
        let h = setup();
        let draft = single_item_draft(Money::new(dec!(100000000000000000)));

        let err = h.service.submit(request(draft)).await.unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(h.store.count(StoreOp::Create), 0);
        assert!(h.carts.calls().is_empty());
    }

    /// Store that ignores the document id and keys documents itself.
    struct SelfKeyingStore(InMemoryQuotationStore);

    #[async_trait::async_trait]
    impl QuotationStore for SelfKeyingStore {
        async fn search(&self, fields: &[&str]) -> Result<Vec<QuotationDocument>, StoreError> {
            self.0.search(fields).await
        }

        async fn create(&self, mut document: QuotationDocument) -> Result<String, StoreError> {
            document.id = format!("doc-{}", self.0.count(StoreOp::Create) + 1);
            self.0.create(document).await
        }

        async fn patch(&self, id: &str, patch: QuotationPatch) -> Result<(), StoreError> {
            self.0.patch(id, patch).await
        }

        async fn delete(&self, id: &str) -> Result<(), StoreError> {
            self.0.delete(id).await
        }
    }

    #[tokio::test]
    async fn submit_rejects_store_that_assigns_its_own_ids() {
        let h = setup();
        let service = QuotationService::new(
            SelfKeyingStore(InMemoryQuotationStore::new()),
            h.carts.clone(),
            h.session.clone(),
            StaticSetupConfig::default(),
        );

        let err = service.submit(request(two_seller_draft())).await.unwrap_err();

        match err {
            ServiceError::External {
                operation: "store.create",
                message,
            } => assert!(message.contains("doc-1")),
            other => panic!("expected store.create error, got {other:?}"),
        }
        assert!(h.carts.saved_carts().is_empty());
    }

    #[tokio::test]
    async fn detail_reports_expiry_and_logo() -> anyhow::Result<()> {
        let h = setup_with(
            StaticSessionProvider::new(SessionSnapshot::authenticated("alice@buyer.com")),
            SetupConfig {
                cart_life_span_days: 10,
                store_logo_url: Some("https://cdn/logo.png".to_string()),
            },
        );
        let submitted = h.service.submit(request(two_seller_draft())).await?;

        let detail = h.service.detail(submitted.id_typed()).await?;

        let created = detail.quotation.created_at().unwrap();
        assert_eq!(detail.expires_at, Some(created + Duration::days(10)));
        assert_eq!(detail.logo_url.as_deref(), Some("https://cdn/logo.png"));
        assert_eq!(detail.quotation.line_items(), submitted.line_items());
        assert_eq!(detail.quotation.totalizers(), submitted.totalizers());

        assert!(matches!(
            h.service.detail(QuotationId::new()).await,
            Err(ServiceError::NotFound(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn remove_is_idempotent() -> anyhow::Result<()> {
        let h = setup();
        let submitted = h.service.submit(request(two_seller_draft())).await?;
        h.service
            .decide(submitted.id_typed(), Decision::Approve, "")
            .await?;

        h.service.remove(submitted.id_typed()).await?;
        h.service.remove(submitted.id_typed()).await?;

        assert!(h.store.snapshot().is_empty());
        assert_eq!(h.store.count(StoreOp::Delete), 2);
        Ok(())
    }

    #[tokio::test]
    async fn remove_surfaces_store_outage() -> anyhow::Result<()> {
        let h = setup();
        let submitted = h.service.submit(request(two_seller_draft())).await?;
        h.store.fail(StoreOp::Delete);

        let err = h.service.remove(submitted.id_typed()).await.unwrap_err();

        assert!(err.is_external());
        assert_eq!(h.store.snapshot().len(), 1);
        assert!(!h.service.gate().is_busy(Action::Remove, &submitted.id_typed().to_string()));
        Ok(())
    }
}
