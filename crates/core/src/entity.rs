//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Line items are entities within a quotation: two items with the same SKU id
/// are the same line even when their price or quantity differ.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
