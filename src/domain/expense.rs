use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type ExpenseId = Uuid;

/// Fixed classification tag for an expense.
/// Declaration order is the canonical enumeration order, used to break ties
/// when category totals are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Accommodation,
    Activities,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Transport,
        Category::Accommodation,
        Category::Activities,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Accommodation => "Accommodation",
            Category::Activities => "Activities",
            Category::Other => "Other",
        }
    }

    /// Parse a category name, case-insensitively. Returns `None` for values
    /// outside the enumeration (e.g. "Utilities" from a receipt suggestion).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "food" => Some(Category::Food),
            "transport" => Some(Category::Transport),
            "accommodation" => Some(Category::Accommodation),
            "activities" => Some(Category::Activities),
            "other" => Some(Category::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single expense recorded against a trip.
/// Expenses are mutated only by full replacement via the ledger's `update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    /// Owning trip identifier, assigned by the ledger and never changed
    pub trip_id: String,
    pub category: Category,
    /// Human-readable description (never empty)
    pub description: String,
    /// Amount in cents (never negative)
    pub amount_cents: Cents,
    /// Calendar date the expense occurred
    pub date: NaiveDate,
    /// Opaque reference to an associated receipt image, owned externally
    pub receipt_image_url: Option<String>,
}

impl Expense {
    /// Display-formatted date, e.g. "Aug 5, 2025".
    pub fn display_date(&self) -> String {
        self.date.format("%b %-d, %Y").to_string()
    }
}

/// Unvalidated field set consumed by the ledger's `add` and `update`.
/// This is the form state of the expense entry screen: it can be filled
/// manually or pre-filled from a receipt suggestion, and it mutates nothing
/// until it is committed through the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub description: String,
    pub amount_cents: Cents,
    pub category: Category,
    pub date: NaiveDate,
    pub receipt_image_url: Option<String>,
}

impl ExpenseDraft {
    pub fn new(
        description: impl Into<String>,
        amount_cents: Cents,
        category: Category,
        date: NaiveDate,
    ) -> Self {
        Self {
            description: description.into(),
            amount_cents,
            category,
            date,
            receipt_image_url: None,
        }
    }

    /// An empty form: no description, zero amount, category Other, dated today.
    pub fn blank() -> Self {
        Self {
            description: String::new(),
            amount_cents: 0,
            category: Category::Other,
            date: Local::now().date_naive(),
            receipt_image_url: None,
        }
    }

    pub fn with_receipt_url(mut self, url: impl Into<String>) -> Self {
        self.receipt_image_url = Some(url.into());
        self
    }
}
