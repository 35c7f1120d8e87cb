//! Quotation status labels and their display colours.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Quotation status lifecycle.
///
/// `Unknown` never results from a transition; it only describes stored records
/// whose status flags are all unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuotationStatus {
    Pending,
    Approved,
    Rejected,
    Unknown,
}

impl QuotationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            QuotationStatus::Pending => "Pending",
            QuotationStatus::Approved => "Approved",
            QuotationStatus::Rejected => "Rejected",
            QuotationStatus::Unknown => "Unknown",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, QuotationStatus::Approved | QuotationStatus::Rejected)
    }

    /// Tag color used by the admin list.
    pub fn color(&self) -> &'static str {
        match self {
            QuotationStatus::Pending => "orange",
            QuotationStatus::Approved => "green",
            QuotationStatus::Rejected => "red",
            QuotationStatus::Unknown => "black",
        }
    }
}

impl core::fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QuotationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(QuotationStatus::Pending),
            "Approved" => Ok(QuotationStatus::Approved),
            "Rejected" => Ok(QuotationStatus::Rejected),
            "Unknown" => Ok(QuotationStatus::Unknown),
            _ => Err(()),
        }
    }
}

/// Tag color for a free-form status label; unrecognised labels are black.
pub fn status_color(label: &str) -> &'static str {
    label
        .parse::<QuotationStatus>()
        .map(|s| s.color())
        .unwrap_or("black")
}
