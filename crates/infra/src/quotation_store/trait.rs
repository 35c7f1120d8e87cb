use std::sync::Arc;

use thiserror::Error;

use super::document::{QuotationDocument, QuotationPatch};

/// Document store operation error.
///
/// These are **infrastructure errors** as opposed to domain errors (validation,
/// illegal transitions).
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document already exists: {0}")]
    AlreadyExists(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Async document store holding quotation records.
///
/// Implementations talk to the hosting platform; `fields` is the projection the
/// caller needs and may be ignored by stores that always return whole documents.
#[async_trait::async_trait]
pub trait QuotationStore: Send + Sync {
    /// Fetch every quotation document.
    async fn search(&self, fields: &[&str]) -> Result<Vec<QuotationDocument>, StoreError>;

    /// Persist a new document under `document.id` and return that id.
    ///
    /// The id is the quotation id and later lookups use it, so a store must not
    /// assign its own.
    async fn create(&self, document: QuotationDocument) -> Result<String, StoreError>;

    /// Partially update a document.
    async fn patch(&self, id: &str, patch: QuotationPatch) -> Result<(), StoreError>;

    /// Delete a document.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Fetch one document by id.
    ///
    /// The platform contract has no point lookup, so the default implementation
    /// searches and picks the matching id.
    async fn get(
        &self,
        id: &str,
        fields: &[&str],
    ) -> Result<Option<QuotationDocument>, StoreError> {
        let documents = self.search(fields).await?;
        Ok(documents.into_iter().find(|d| d.id == id))
    }
}

#[async_trait::async_trait]
impl<S> QuotationStore for Arc<S>
where
    S: QuotationStore + ?Sized,
{
    async fn search(&self, fields: &[&str]) -> Result<Vec<QuotationDocument>, StoreError> {
        (**self).search(fields).await
    }

    async fn create(&self, document: QuotationDocument) -> Result<String, StoreError> {
        (**self).create(document).await
    }

    async fn patch(&self, id: &str, patch: QuotationPatch) -> Result<(), StoreError> {
        (**self).patch(id, patch).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        (**self).delete(id).await
    }

    async fn get(
        &self,
        id: &str,
        fields: &[&str],
    ) -> Result<Option<QuotationDocument>, StoreError> {
        (**self).get(id, fields).await
    }
}
