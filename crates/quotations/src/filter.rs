//! Read-side filtering over an already fetched set of quotations.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::quotation::Quotation;
use crate::status::QuotationStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Only(QuotationStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: QuotationStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ();

    /// `"All"` or a status label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "All" {
            return Ok(StatusFilter::All);
        }
        s.parse::<QuotationStatus>().map(StatusFilter::Only)
    }
}

/// Status (exact match or all) AND free-text search over buyer/seller emails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationFilter {
    pub status: StatusFilter,
    pub search_text: Option<String>,
}

impl QuotationFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: QuotationStatus) -> Self {
        self.status = StatusFilter::Only(status);
        self
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn matches(&self, quotation: &Quotation) -> bool {
        if !self.status.matches(quotation.status()) {
            return false;
        }

        match self.search_text.as_deref() {
            None | Some("") => true,
            Some(text) => {
                let needle = text.to_lowercase();
                quotation.buyer_email().to_lowercase().contains(&needle)
                    || quotation.seller().email.to_lowercase().contains(&needle)
            }
        }
    }

    /// Matching quotations, in their original order.
    pub fn apply(&self, quotations: &[Quotation]) -> Vec<Quotation> {
        quotations
            .iter()
            .filter(|q| self.matches(q))
            .cloned()
            .collect()
    }
}

/// Quotations owned by one buyer (email compared case-insensitively).
pub fn owned_by(quotations: &[Quotation], buyer_email: &str) -> Vec<Quotation> {
    quotations
        .iter()
        .filter(|q| q.buyer_email().eq_ignore_ascii_case(buyer_email))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_item::LineItem;
    use crate::quotation::{QuotationSnapshot, SellerInfo};
    use crate::totalizer::Totalizers;
    use chrono::Utc;
    use orderquote_core::{Money, OrderFormId, QuotationId, SellerId, SkuId};

    fn quotation(buyer: &str, seller: &str, status: QuotationStatus) -> Quotation {
        Quotation::restore(QuotationSnapshot {
            id: QuotationId::new(),
            name: "q".to_string(),
            description: String::new(),
            line_items: vec![LineItem {
                id: SkuId::new("a").unwrap(),
                product_id: "p".to_string(),
                name: "n".to_string(),
                sku_name: "n".to_string(),
                ref_id: None,
                image_url: None,
                list_price: Money::from_major(1),
                unit_price: Money::from_major(1),
                quantity: 1,
                seller: SellerId::new("1").unwrap(),
            }],
            totalizers: Totalizers::new(),
            buyer_email: buyer.to_string(),
            seller: SellerInfo {
                email: seller.to_string(),
                name: "store".to_string(),
            },
            status,
            response_comment: None,
            order_form_id: OrderFormId::new("of").unwrap(),
            created_at: Utc::now(),
        })
    }

    fn fixture() -> Vec<Quotation> {
        vec![
            quotation("Xavier@buyer.com", "agent@store.com", QuotationStatus::Approved),
            quotation("ana@buyer.com", "max@store.com", QuotationStatus::Approved),
            quotation("ana@buyer.com", "agent@store.com", QuotationStatus::Pending),
            quotation("bob@buyer.com", "agent@store.com", QuotationStatus::Rejected),
            quotation("bob@buyer.com", "agent@store.com", QuotationStatus::Unknown),
        ]
    }

    #[test]
    fn all_without_search_returns_everything() {
        let set = fixture();
        assert_eq!(QuotationFilter::all().apply(&set), set);
    }

    #[test]
    fn status_and_search_compose() {
        let set = fixture();
        let out = QuotationFilter::all()
            .with_status(QuotationStatus::Approved)
            .with_search("X")
            .apply(&set);

        let expected: Vec<Quotation> = set
            .iter()
            .filter(|q| q.status() == QuotationStatus::Approved)
            .filter(|q| {
                q.buyer_email().to_lowercase().contains('x')
                    || q.seller().email.to_lowercase().contains('x')
            })
            .cloned()
            .collect();

        assert_eq!(out, expected);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn search_matches_seller_email() {
        let out = QuotationFilter::all().with_search("AGENT@").apply(&fixture());
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn empty_search_matches_everything() {
        let out = QuotationFilter::all().with_search("").apply(&fixture());
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn status_filter_parses_all_and_labels() {
        assert_eq!("All".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "Rejected".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(QuotationStatus::Rejected))
        );
        assert!("Archived".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn owned_by_scopes_to_buyer() {
        let out = owned_by(&fixture(), "ANA@buyer.com");
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|q| q.buyer_email() == "ana@buyer.com"));
    }
}
