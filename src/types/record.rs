//! Transaction record types
//!
//! A [`Record`] is one cleaned sales line item. Rows that fail cleaning are
//! dropped, not repaired; [`DropStats`] keeps the per-reason counts so the
//! CLI can report how much of the file was discarded.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One cleaned transaction line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Timestamp of the transaction
    pub date: NaiveDateTime,
    /// Units sold; negative for returns
    pub quantity: i64,
    /// Price per unit, non-negative after cleaning
    pub unit_price: f64,
    /// Country of sale, when the column is present
    pub country: Option<String>,
    /// Product description, when the column is present
    pub description: Option<String>,
    /// Customer identifier, when the column is present
    pub customer_id: Option<String>,
}

impl Record {
    /// Line revenue: quantity times unit price. Always derived, never read
    /// from the file even when the file carries its own revenue column.
    pub fn revenue(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// Why a raw row was discarded during cleaning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Date cell missing or not parseable with any accepted format
    BadDate,
    /// Quantity cell missing, not numeric, or not an integer
    BadQuantity,
    /// Unit price cell missing or not numeric
    BadPrice,
    /// Unit price parsed but was negative
    NegativePrice,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadDate => write!(f, "unparseable date"),
            Self::BadQuantity => write!(f, "unparseable quantity"),
            Self::BadPrice => write!(f, "unparseable unit price"),
            Self::NegativePrice => write!(f, "negative unit price"),
        }
    }
}

/// Per-reason counts of rows discarded during cleaning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DropStats {
    pub bad_date: u64,
    pub bad_quantity: u64,
    pub bad_price: u64,
    pub negative_price: u64,
}

impl DropStats {
    pub fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::BadDate => self.bad_date += 1,
            DropReason::BadQuantity => self.bad_quantity += 1,
            DropReason::BadPrice => self.bad_price += 1,
            DropReason::NegativePrice => self.negative_price += 1,
        }
    }

    /// Total rows discarded across all reasons
    pub fn total(&self) -> u64 {
        self.bad_date + self.bad_quantity + self.bad_price + self.negative_price
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Non-zero reasons with counts, in a stable reporting order
    pub fn breakdown(&self) -> Vec<(DropReason, u64)> {
        [
            (DropReason::BadDate, self.bad_date),
            (DropReason::BadQuantity, self.bad_quantity),
            (DropReason::BadPrice, self.bad_price),
            (DropReason::NegativePrice, self.negative_price),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect()
    }
}

/// Result of loading and cleaning an input file
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Rows that survived cleaning, in file order
    pub records: Vec<Record>,
    /// What was discarded and why
    pub dropped: DropStats,
}
