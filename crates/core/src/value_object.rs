//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**. `Money` and totalizer entries are the
//! value objects of this workspace: two amounts of `10.00` are the same amount.

/// Marker trait for value objects.
///
/// To "modify" a value object, build a new one. Recomputing totals replaces
/// totalizer entries instead of editing them in place.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Money(Decimal);
///
/// impl ValueObject for Money {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
