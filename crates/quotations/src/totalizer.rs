//! Totalizers: named monetary aggregates attached to a cart or quotation.

use serde::{Deserialize, Serialize};

use orderquote_core::{DomainResult, Money, ValueObject};

/// Totalizer kind, identified on the wire by its platform id string.
///
/// `Items` and `Total` are owned by the totals engine. `Shipping`, `Discounts`
/// and every other id (taxes, unknown kinds) come from the external checkout and
/// are passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TotalizerKind {
    Items,
    Shipping,
    Discounts,
    Total,
    /// Any other id. Counted as a tax contribution to `Total`.
    Tax(String),
}

impl TotalizerKind {
    pub fn as_id(&self) -> &str {
        match self {
            TotalizerKind::Items => "Items",
            TotalizerKind::Shipping => "Shipping",
            TotalizerKind::Discounts => "Discounts",
            TotalizerKind::Total => "Total",
            TotalizerKind::Tax(id) => id,
        }
    }

    /// Kinds recomputed from line items.
    pub fn is_derived(&self) -> bool {
        matches!(self, TotalizerKind::Items | TotalizerKind::Total)
    }

    pub fn is_tax(&self) -> bool {
        matches!(self, TotalizerKind::Tax(_))
    }

    /// Default label used when the external entry does not carry one.
    pub fn default_name(&self) -> &str {
        match self {
            TotalizerKind::Items => "Subtotal",
            TotalizerKind::Shipping => "Shipping",
            TotalizerKind::Discounts => "Discounts",
            TotalizerKind::Total => "Total",
            TotalizerKind::Tax(id) => id,
        }
    }
}

impl From<String> for TotalizerKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Items" => TotalizerKind::Items,
            "Shipping" => TotalizerKind::Shipping,
            "Discounts" => TotalizerKind::Discounts,
            "Total" => TotalizerKind::Total,
            _ => TotalizerKind::Tax(value),
        }
    }
}

impl From<&str> for TotalizerKind {
    fn from(value: &str) -> Self {
        TotalizerKind::from(value.to_string())
    }
}

impl From<TotalizerKind> for String {
    fn from(value: TotalizerKind) -> Self {
        value.as_id().to_string()
    }
}

impl core::fmt::Display for TotalizerKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalizerEntry {
    pub id: TotalizerKind,
    pub name: String,
    pub value: Money,
}

impl ValueObject for TotalizerEntry {}

impl TotalizerEntry {
    pub fn new(id: TotalizerKind, value: Money) -> Self {
        let name = id.default_name().to_string();
        Self { id, name, value }
    }
}

/// Totalizer set with exactly one entry per kind.
///
/// Insertion order is kept for display. Inserting an entry of a kind already
/// present replaces it in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TotalizerEntry>", into = "Vec<TotalizerEntry>")]
pub struct Totalizers {
    entries: Vec<TotalizerEntry>,
}

impl Totalizers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, entry: TotalizerEntry) {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, kind: &TotalizerKind) -> Option<&TotalizerEntry> {
        self.entries.iter().find(|e| &e.id == kind)
    }

    /// Value of `kind`, or zero when absent.
    pub fn value_of(&self, kind: &TotalizerKind) -> Money {
        self.get(kind).map(|e| e.value).unwrap_or(Money::ZERO)
    }

    pub fn items(&self) -> Money {
        self.value_of(&TotalizerKind::Items)
    }

    pub fn shipping(&self) -> Money {
        self.value_of(&TotalizerKind::Shipping)
    }

    pub fn discounts(&self) -> Money {
        self.value_of(&TotalizerKind::Discounts)
    }

    pub fn total(&self) -> Money {
        self.value_of(&TotalizerKind::Total)
    }

    /// Sum of every tax (and unknown-kind) entry.
    pub fn taxes(&self) -> DomainResult<Money> {
        Money::try_sum(self.entries.iter().filter(|e| e.id.is_tax()).map(|e| e.value))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TotalizerEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<TotalizerEntry>> for Totalizers {
    fn from(entries: Vec<TotalizerEntry>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<Totalizers> for Vec<TotalizerEntry> {
    fn from(value: Totalizers) -> Self {
        value.entries
    }
}

impl FromIterator<TotalizerEntry> for Totalizers {
    fn from_iter<I: IntoIterator<Item = TotalizerEntry>>(iter: I) -> Self {
        let mut totalizers = Totalizers::new();
        for entry in iter {
            totalizers.upsert(entry);
        }
        totalizers
    }
}
