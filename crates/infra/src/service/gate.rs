//! One in-flight request per action and target.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use super::errors::ServiceError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Submit,
    Decide,
    Remove,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Submit => "submit",
            Action::Decide => "decide",
            Action::Remove => "remove",
        }
    }
}

/// Rejects a second request for an action while the first is still pending,
/// the way a form disables its button until the request settles.
#[derive(Debug, Default, Clone)]
pub struct ActionGate {
    in_flight: Arc<Mutex<HashSet<(Action, String)>>>,
}

impl ActionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self, action: Action, key: &str) -> Result<GateGuard, ServiceError> {
        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|_| ServiceError::external("gate.acquire", "lock poisoned"))?;

        if !in_flight.insert((action, key.to_string())) {
            return Err(ServiceError::Busy {
                action: action.as_str(),
                key: key.to_string(),
            });
        }

        Ok(GateGuard {
            in_flight: Arc::clone(&self.in_flight),
            entry: (action, key.to_string()),
        })
    }

    pub fn is_busy(&self, action: Action, key: &str) -> bool {
        self.in_flight
            .lock()
            .map(|s| s.contains(&(action, key.to_string())))
            .unwrap_or(false)
    }
}

/// Releases the gate entry when dropped.
#[derive(Debug)]
pub struct GateGuard {
    in_flight: Arc<Mutex<HashSet<(Action, String)>>>,
    entry: (Action, String),
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.remove(&self.entry);
        }
    }
}
