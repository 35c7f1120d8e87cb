use std::collections::HashSet;
use std::sync::RwLock;

use super::document::{QuotationDocument, QuotationPatch};
use super::r#trait::{QuotationStore, StoreError};

/// Store operations, for call recording and failure injection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Search,
    Create,
    Patch,
    Delete,
}

/// In-memory quotation store.
///
/// Intended for tests/dev. Documents keep insertion order. Every call is
/// recorded, and operations can be made to fail with [`StoreError::Unavailable`].
#[derive(Debug, Default)]
pub struct InMemoryQuotationStore {
    documents: RwLock<Vec<QuotationDocument>>,
    failing: RwLock<HashSet<StoreOp>>,
    calls: RwLock<Vec<StoreOp>>,
}

impl InMemoryQuotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed documents directly, bypassing `create`.
    pub fn with_documents(documents: Vec<QuotationDocument>) -> Self {
        Self {
            documents: RwLock::new(documents),
            ..Self::default()
        }
    }

    pub fn fail(&self, op: StoreOp) {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert(op);
        }
    }

    pub fn recover(&self, op: StoreOp) {
        if let Ok(mut failing) = self.failing.write() {
            failing.remove(&op);
        }
    }

    pub fn calls(&self) -> Vec<StoreOp> {
        self.calls.read().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self, op: StoreOp) -> usize {
        self.calls().into_iter().filter(|c| *c == op).count()
    }

    pub fn snapshot(&self) -> Vec<QuotationDocument> {
        self.documents.read().map(|d| d.clone()).unwrap_or_default()
    }

    fn enter(&self, op: StoreOp) -> Result<(), StoreError> {
        if let Ok(mut calls) = self.calls.write() {
            calls.push(op);
        }
        let failing = self
            .failing
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        if failing.contains(&op) {
            return Err(StoreError::Unavailable(format!("{op:?} failed")));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl QuotationStore for InMemoryQuotationStore {
    async fn search(&self, _fields: &[&str]) -> Result<Vec<QuotationDocument>, StoreError> {
        self.enter(StoreOp::Search)?;
        let documents = self
            .documents
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(documents.clone())
    }

    async fn create(&self, document: QuotationDocument) -> Result<String, StoreError> {
        self.enter(StoreOp::Create)?;
        let mut documents = self
            .documents
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        if documents.iter().any(|d| d.id == document.id) {
            return Err(StoreError::AlreadyExists(document.id));
        }

        let id = document.id.clone();
        documents.push(document);
        Ok(id)
    }

    async fn patch(&self, id: &str, patch: QuotationPatch) -> Result<(), StoreError> {
        self.enter(StoreOp::Patch)?;
        let mut documents = self
            .documents
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        let doc = documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply_to(doc);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.enter(StoreOp::Delete)?;
        let mut documents = self
            .documents
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        let before = documents.len();
        documents.retain(|d| d.id != id);
        if documents.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
