//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of a quotation record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuotationId(Uuid);

impl QuotationId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
    /// for determinism.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for QuotationId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for QuotationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for QuotationId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<QuotationId> for Uuid {
    fn from(value: QuotationId) -> Self {
        value.0
    }
}

impl FromStr for QuotationId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid =
            Uuid::from_str(s).map_err(|e| DomainError::invalid_id(format!("QuotationId: {e}")))?;
        Ok(Self(uuid))
    }
}

/// Platform-assigned identifiers are opaque strings (SKU ids, seller ids,
/// order-form ids). They are only required to be non-empty.
macro_rules! impl_string_newtype {
    ($t:ident, $name:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(String);

        impl $t {
            pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(DomainError::invalid_id(format!("{}: empty", $name)));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_string_newtype!(SkuId, "SkuId");
impl_string_newtype!(SellerId, "SellerId");
impl_string_newtype!(OrderFormId, "OrderFormId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotation_id_round_trips_through_display() {
        let id = QuotationId::new();
        let parsed: QuotationId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn quotation_id_rejects_garbage() {
        let err = "not-a-uuid".parse::<QuotationId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(msg) if msg.starts_with("QuotationId")));
    }

    #[test]
    fn string_ids_reject_blank_values() {
        assert!(SkuId::new("  ").is_err());
        assert!(SellerId::new("").is_err());
        assert_eq!(OrderFormId::new("of-1").unwrap().as_str(), "of-1");
    }

    #[test]
    fn string_ids_serialize_transparently() {
        let seller = SellerId::new("1").unwrap();
        assert_eq!(serde_json::to_string(&seller).unwrap(), "\"1\"");
    }
}
