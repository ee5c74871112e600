use serde::Serialize;

use crate::domain::{Category, Cents, ExpenseLedger};

/// Budget position of a ledger at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetSummary {
    pub trip_id: String,
    pub budget_cents: Cents,
    pub total_spent_cents: Cents,
    pub remaining_cents: Cents,
    pub spent_percentage: f64,
    pub expense_count: usize,
}

impl BudgetSummary {
    pub fn of(ledger: &ExpenseLedger) -> Self {
        Self {
            trip_id: ledger.trip_id().to_string(),
            budget_cents: ledger.budget(),
            total_spent_cents: ledger.total_spent(),
            remaining_cents: ledger.remaining_budget(),
            spent_percentage: ledger.spent_percentage(),
            expense_count: ledger.len(),
        }
    }
}

/// One row of the spending-by-category breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub total_cents: Cents,
    pub count: usize,
    /// Share of total spend, 0-100. Zero when nothing is spent.
    pub percentage: f64,
}

/// Category breakdown rows, largest spend first (same order as
/// `ExpenseLedger::by_category`), enriched with counts and spend share.
pub fn category_summaries(ledger: &ExpenseLedger) -> Vec<CategorySummary> {
    let total = ledger.total_spent();
    ledger
        .by_category()
        .into_iter()
        .map(|entry| {
            let count = ledger
                .expenses()
                .iter()
                .filter(|e| e.category == entry.category)
                .count();
            let percentage = if total > 0 {
                entry.total_cents as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            CategorySummary {
                category: entry.category,
                total_cents: entry.total_cents,
                count,
                percentage,
            }
        })
        .collect()
}
