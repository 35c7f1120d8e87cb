//! Session/identity provider boundary.
//!
//! The session is read fresh for every operation. [`SessionCache`] only mirrors
//! the last observed authentication flag for display hints (e.g. rendering a
//! "please log in" banner before the first check completes); it is written after
//! each fresh check and never used to authorize anything.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use orderquote_quotations::BuyerIdentity;

/// `userType` the checkout reports for call-center operators (sales agents).
pub const CALL_CENTER_OPERATOR: &str = "callCenterOperator";

#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("session provider unavailable: {0}")]
    Unavailable(String),
}

/// What the platform knows about the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub authenticated: bool,
    pub email: Option<String>,
    pub user_type: Option<String>,
}

impl SessionSnapshot {
    pub fn authenticated(email: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            email: Some(email.into()),
            user_type: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_user_type(mut self, user_type: impl Into<String>) -> Self {
        self.user_type = Some(user_type.into());
        self
    }

    pub fn buyer_identity(&self) -> BuyerIdentity {
        BuyerIdentity {
            authenticated: self.authenticated,
            email: self.email.clone().unwrap_or_default(),
        }
    }

    pub fn is_call_center_operator(&self) -> bool {
        self.user_type.as_deref() == Some(CALL_CENTER_OPERATOR)
    }
}

#[async_trait::async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self) -> Result<SessionSnapshot, SessionError>;
}

#[async_trait::async_trait]
impl<P> SessionProvider for Arc<P>
where
    P: SessionProvider + ?Sized,
{
    async fn current_session(&self) -> Result<SessionSnapshot, SessionError> {
        (**self).current_session().await
    }
}

/// Fixed session for tests/dev; swap it with [`StaticSessionProvider::set`].
#[derive(Debug, Default)]
pub struct StaticSessionProvider {
    session: RwLock<Option<SessionSnapshot>>,
}

impl StaticSessionProvider {
    pub fn new(session: SessionSnapshot) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }

    /// A provider whose checks always fail.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn set(&self, session: SessionSnapshot) {
        if let Ok(mut s) = self.session.write() {
            *s = Some(session);
        }
    }
}

#[async_trait::async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn current_session(&self) -> Result<SessionSnapshot, SessionError> {
        self.session
            .read()
            .ok()
            .and_then(|s| s.clone())
            .ok_or_else(|| SessionError::Unavailable("no session configured".to_string()))
    }
}

/// Write-through mirror of the last fresh authentication check.
#[derive(Debug, Default)]
pub struct SessionCache {
    last_authenticated: RwLock<Option<bool>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, session: &SessionSnapshot) {
        if let Ok(mut last) = self.last_authenticated.write() {
            *last = Some(session.authenticated);
        }
    }

    /// `None` until a session check has completed.
    pub fn last_known_authenticated(&self) -> Option<bool> {
        self.last_authenticated.read().ok().and_then(|l| *l)
    }
}
