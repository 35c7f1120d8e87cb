use thiserror::Error;

use orderquote_core::DomainError;

use crate::cart::CartError;
use crate::config::ConfigError;
use crate::quotation_store::{DocumentError, StoreError};
use crate::session::SessionError;

/// Error returned by [`QuotationService`](super::QuotationService) operations.
///
/// - `Validation`: input rejected before anything was persisted.
/// - `InvalidState`: the quotation's status does not allow the transition.
/// - `External`: a platform call failed (or returned unreadable data). Steps
///   completed before the failure are **not** rolled back.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("quotation not found: {0}")]
    NotFound(String),

    #[error("{action} already in progress for {key}")]
    Busy { action: &'static str, key: String },

    #[error("external service error during {operation}: {message}")]
    External {
        operation: &'static str,
        message: String,
    },
}

impl ServiceError {
    pub fn external(operation: &'static str, err: impl core::fmt::Display) -> Self {
        Self::External {
            operation,
            message: err.to_string(),
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, ServiceError::External { .. })
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::InvariantViolation(msg) => ServiceError::Validation(msg),
            DomainError::InvalidId(msg) => ServiceError::Validation(msg),
            DomainError::InvalidState(msg) => ServiceError::InvalidState(msg),
            DomainError::NotFound => ServiceError::NotFound(String::new()),
        }
    }
}

impl From<DocumentError> for ServiceError {
    fn from(value: DocumentError) -> Self {
        ServiceError::external("document.decode", value)
    }
}

impl From<SessionError> for ServiceError {
    fn from(value: SessionError) -> Self {
        ServiceError::external("session.current", value)
    }
}

impl From<ConfigError> for ServiceError {
    fn from(value: ConfigError) -> Self {
        ServiceError::external("setup.config", value)
    }
}

/// Store failures carry the operation name; use with `map_err(store_err("store.create"))`.
pub(crate) fn store_err(operation: &'static str) -> impl Fn(StoreError) -> ServiceError {
    move |e| ServiceError::external(operation, e)
}

pub(crate) fn cart_err(operation: &'static str) -> impl Fn(CartError) -> ServiceError {
    move |e| ServiceError::external(operation, e)
}
