use std::collections::BTreeMap;

use uuid::Uuid;

use super::{Category, Cents, Expense, ExpenseDraft, ExpenseId, Trip};

/// Total spent in one category. Produced by `ExpenseLedger::by_category`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total_cents: Cents,
}

/// In-memory expense ledger for a single trip.
///
/// Owns the trip's expense records plus a private copy of the trip budget,
/// and lives for the duration of an expense-tracking session. The ledger
/// holds no lock: callers must serialize mutations themselves.
///
/// Records are kept sorted by date descending. Among equal dates the most
/// recently inserted record comes first.
#[derive(Debug, Clone)]
pub struct ExpenseLedger {
    trip_id: String,
    budget_cents: Cents,
    expenses: Vec<Expense>,
}

impl ExpenseLedger {
    /// Create an empty ledger. Fails if the initial budget is negative.
    pub fn new(trip_id: impl Into<String>, budget_cents: Cents) -> Result<Self, LedgerError> {
        if budget_cents < 0 {
            return Err(LedgerError::Validation(format!(
                "budget must be non-negative, got {}",
                budget_cents
            )));
        }
        Ok(Self {
            trip_id: trip_id.into(),
            budget_cents,
            expenses: Vec::new(),
        })
    }

    /// Create a ledger for a trip, copying its budget. The trip record itself
    /// is never mutated through the ledger.
    pub fn for_trip(trip: &Trip) -> Result<Self, LedgerError> {
        Self::new(trip.id.clone(), trip.budget_cents)
    }

    pub fn trip_id(&self) -> &str {
        &self.trip_id
    }

    pub fn budget(&self) -> Cents {
        self.budget_cents
    }

    /// All expenses, most recent date first.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn get(&self, id: ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    // ========================
    // Mutations
    // ========================

    /// Insert a new expense with a fresh id. Returns the id on success.
    /// The draft is validated before anything is touched, so a failed add
    /// leaves the ledger exactly as it was.
    pub fn add(&mut self, draft: ExpenseDraft) -> Result<ExpenseId, LedgerError> {
        self.add_with_id(Uuid::new_v4(), draft)
    }

    /// Insert an expense under a caller-supplied id. The session loader uses
    /// this so re-reading the same file yields the same ids; everything else
    /// goes through `add`.
    pub(crate) fn add_with_id(
        &mut self,
        id: ExpenseId,
        draft: ExpenseDraft,
    ) -> Result<ExpenseId, LedgerError> {
        validate_draft(&draft)?;

        let expense = Expense {
            id,
            trip_id: self.trip_id.clone(),
            category: draft.category,
            description: draft.description,
            amount_cents: draft.amount_cents,
            date: draft.date,
            receipt_image_url: draft.receipt_image_url,
        };

        // Front insertion + stable sort puts the new record ahead of any
        // existing record with the same date.
        self.expenses.insert(0, expense);
        self.sort_by_date();
        Ok(id)
    }

    /// Replace every field of the expense matching `id`, preserving the id
    /// and owning trip. The record keeps its slot among equal dates.
    pub fn update(&mut self, id: ExpenseId, draft: ExpenseDraft) -> Result<(), LedgerError> {
        let index = self
            .expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or(LedgerError::NotFound(id))?;
        validate_draft(&draft)?;

        self.expenses[index] = Expense {
            id,
            trip_id: self.trip_id.clone(),
            category: draft.category,
            description: draft.description,
            amount_cents: draft.amount_cents,
            date: draft.date,
            receipt_image_url: draft.receipt_image_url,
        };
        self.sort_by_date();
        Ok(())
    }

    /// Delete the expense matching `id`, returning it. Fails with `NotFound`
    /// when the id is absent so callers can tell a stale delete from a real
    /// one; callers that prefer the legacy silent no-op can ignore the error.
    pub fn remove(&mut self, id: ExpenseId) -> Result<Expense, LedgerError> {
        let index = self
            .expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or(LedgerError::NotFound(id))?;
        Ok(self.expenses.remove(index))
    }

    /// Replace the budget. Fails when the new value is negative.
    pub fn set_budget(&mut self, budget_cents: Cents) -> Result<(), LedgerError> {
        if budget_cents < 0 {
            return Err(LedgerError::Validation(format!(
                "budget must be non-negative, got {}",
                budget_cents
            )));
        }
        self.budget_cents = budget_cents;
        Ok(())
    }

    // ========================
    // Aggregates
    // ========================

    /// Sum of all expense amounts. Zero for an empty ledger.
    pub fn total_spent(&self) -> Cents {
        self.expenses.iter().map(|e| e.amount_cents).sum()
    }

    /// Budget minus total spent. Negative when over budget; never clamped.
    pub fn remaining_budget(&self) -> Cents {
        self.budget_cents - self.total_spent()
    }

    /// Spend as a percentage of budget, capped at 100.
    /// A zero budget yields 0 rather than a division by zero.
    pub fn spent_percentage(&self) -> f64 {
        if self.budget_cents == 0 {
            return 0.0;
        }
        let pct = self.total_spent() as f64 / self.budget_cents as f64 * 100.0;
        pct.min(100.0)
    }

    /// Per-category totals, largest first. Equal totals fall back to
    /// enumeration order. Categories with no expenses are omitted.
    pub fn by_category(&self) -> Vec<CategoryTotal> {
        let mut totals: BTreeMap<Category, Cents> = BTreeMap::new();
        for expense in &self.expenses {
            *totals.entry(expense.category).or_insert(0) += expense.amount_cents;
        }

        let mut breakdown: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(category, total_cents)| CategoryTotal {
                category,
                total_cents,
            })
            .collect();
        // BTreeMap iterates in enumeration order, so the stable sort keeps
        // that order for equal totals.
        breakdown.sort_by(|a, b| b.total_cents.cmp(&a.total_cents));
        breakdown
    }

    fn sort_by_date(&mut self) {
        self.expenses.sort_by(|a, b| b.date.cmp(&a.date));
    }
}

fn validate_draft(draft: &ExpenseDraft) -> Result<(), LedgerError> {
    if draft.amount_cents < 0 {
        return Err(LedgerError::Validation(format!(
            "amount must be non-negative, got {}",
            draft.amount_cents
        )));
    }
    if draft.description.trim().is_empty() {
        return Err(LedgerError::Validation(
            "description must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    Validation(String),
    NotFound(ExpenseId),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::Validation(reason) => write!(f, "invalid expense data: {}", reason),
            LedgerError::NotFound(id) => write!(f, "no expense with id {}", id),
        }
    }
}

impl std::error::Error for LedgerError {}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn draft(description: &str, amount_cents: Cents, category: Category) -> ExpenseDraft {
        ExpenseDraft::new(description, amount_cents, category, date("2025-08-10"))
    }

    fn ledger() -> ExpenseLedger {
        ExpenseLedger::new("trip-1", 100_000).unwrap()
    }

    #[test]
    fn test_empty_ledger_aggregates() {
        let ledger = ExpenseLedger::new("trip-1", 100_000).unwrap();
        assert_eq!(ledger.total_spent(), 0);
        assert_eq!(ledger.remaining_budget(), 100_000);
        assert_eq!(ledger.spent_percentage(), 0.0);
        assert!(ledger.by_category().is_empty());
    }

    #[test]
    fn test_add_and_total() {
        let mut ledger = ledger();
        ledger.add(draft("Lunch", 5000, Category::Food)).unwrap();
        ledger.add(draft("Dinner", 3000, Category::Food)).unwrap();
        ledger.add(draft("Taxi", 2000, Category::Transport)).unwrap();

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.total_spent(), 10_000);
        assert_eq!(ledger.remaining_budget(), 90_000);
    }

    #[test]
    fn test_add_rejects_negative_amount() {
        let mut ledger = ledger();
        let result = ledger.add(draft("Refund?", -100, Category::Other));
        assert!(matches!(result, Err(LedgerError::Validation(_))));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_add_accepts_zero_amount() {
        let mut ledger = ledger();
        ledger.add(draft("Free museum", 0, Category::Activities)).unwrap();
        assert_eq!(ledger.total_spent(), 0);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_add_rejects_blank_description() {
        let mut ledger = ledger();
        assert!(matches!(
            ledger.add(draft("", 100, Category::Food)),
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            ledger.add(draft("   ", 100, Category::Food)),
            Err(LedgerError::Validation(_))
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_expenses_sorted_by_date_descending() {
        let mut ledger = ledger();
        let mut d = draft("Older", 100, Category::Food);
        d.date = date("2025-08-01");
        ledger.add(d).unwrap();

        let mut d = draft("Newest", 100, Category::Food);
        d.date = date("2025-08-15");
        ledger.add(d).unwrap();

        let mut d = draft("Middle", 100, Category::Food);
        d.date = date("2025-08-07");
        ledger.add(d).unwrap();

        let descriptions: Vec<&str> = ledger
            .expenses()
            .iter()
            .map(|e| e.description.as_str())
            .collect();
        assert_eq!(descriptions, ["Newest", "Middle", "Older"]);
    }

    #[test]
    fn test_equal_dates_newest_insertion_first() {
        let mut ledger = ledger();
        ledger.add(draft("First", 100, Category::Food)).unwrap();
        ledger.add(draft("Second", 100, Category::Food)).unwrap();
        ledger.add(draft("Third", 100, Category::Food)).unwrap();

        let descriptions: Vec<&str> = ledger
            .expenses()
            .iter()
            .map(|e| e.description.as_str())
            .collect();
        assert_eq!(descriptions, ["Third", "Second", "First"]);
    }

    #[test]
    fn test_add_with_id_keeps_caller_id() {
        let mut ledger = ledger();
        let id = Uuid::new_v4();
        let got = ledger
            .add_with_id(id, draft("Lunch", 5000, Category::Food))
            .unwrap();
        assert_eq!(got, id);
        assert_eq!(ledger.get(id).unwrap().description, "Lunch");
    }

    #[test]
    fn test_update_replaces_fields_and_preserves_identity() {
        let mut ledger = ledger();
        let id = ledger.add(draft("Lunch", 5000, Category::Food)).unwrap();

        let mut replacement = draft("Hotel night", 12_000, Category::Accommodation);
        replacement.date = date("2025-08-12");
        ledger.update(id, replacement).unwrap();

        assert_eq!(ledger.len(), 1);
        let expense = ledger.get(id).unwrap();
        assert_eq!(expense.id, id);
        assert_eq!(expense.trip_id, "trip-1");
        assert_eq!(expense.description, "Hotel night");
        assert_eq!(expense.amount_cents, 12_000);
        assert_eq!(expense.category, Category::Accommodation);
        assert_eq!(expense.date, date("2025-08-12"));
    }

    #[test]
    fn test_update_missing_id() {
        let mut ledger = ledger();
        ledger.add(draft("Lunch", 5000, Category::Food)).unwrap();

        let result = ledger.update(Uuid::new_v4(), draft("Nope", 100, Category::Other));
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
        assert_eq!(ledger.expenses()[0].description, "Lunch");
    }

    #[test]
    fn test_update_validation_leaves_state_unchanged() {
        let mut ledger = ledger();
        let id = ledger.add(draft("Lunch", 5000, Category::Food)).unwrap();

        let result = ledger.update(id, draft("", 100, Category::Other));
        assert!(matches!(result, Err(LedgerError::Validation(_))));
        assert_eq!(ledger.get(id).unwrap().description, "Lunch");
        assert_eq!(ledger.get(id).unwrap().amount_cents, 5000);
    }

    #[test]
    fn test_update_never_changes_id_set() {
        let mut ledger = ledger();
        let a = ledger.add(draft("A", 100, Category::Food)).unwrap();
        let b = ledger.add(draft("B", 200, Category::Food)).unwrap();

        ledger.update(a, draft("A2", 300, Category::Transport)).unwrap();

        let mut ids: Vec<ExpenseId> = ledger.expenses().iter().map(|e| e.id).collect();
        ids.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_remove() {
        let mut ledger = ledger();
        let a = ledger.add(draft("A", 100, Category::Food)).unwrap();
        let b = ledger.add(draft("B", 200, Category::Food)).unwrap();

        let removed = ledger.remove(a).unwrap();
        assert_eq!(removed.id, a);
        assert_eq!(ledger.len(), 1);
        assert!(ledger.get(a).is_none());
        assert!(ledger.get(b).is_some());

        // Second remove of the same id reports the absence
        assert!(matches!(ledger.remove(a), Err(LedgerError::NotFound(_))));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_set_budget() {
        let mut ledger = ledger();
        ledger.set_budget(50_000).unwrap();
        assert_eq!(ledger.budget(), 50_000);

        assert!(matches!(
            ledger.set_budget(-1),
            Err(LedgerError::Validation(_))
        ));
        assert_eq!(ledger.budget(), 50_000);
    }

    #[test]
    fn test_negative_initial_budget_rejected() {
        assert!(matches!(
            ExpenseLedger::new("trip-1", -500),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_remaining_budget_can_go_negative() {
        let mut ledger = ExpenseLedger::new("trip-1", 10_000).unwrap();
        ledger.add(draft("Splurge", 15_000, Category::Activities)).unwrap();
        assert_eq!(ledger.remaining_budget(), -5_000);
    }

    #[test]
    fn test_spent_percentage_capped_at_100() {
        let mut ledger = ExpenseLedger::new("trip-1", 10_000).unwrap();
        ledger.add(draft("Splurge", 25_000, Category::Other)).unwrap();
        assert_eq!(ledger.spent_percentage(), 100.0);
    }

    #[test]
    fn test_spent_percentage_zero_budget() {
        let mut ledger = ExpenseLedger::new("trip-1", 0).unwrap();
        ledger.add(draft("Coffee", 1_000, Category::Food)).unwrap();
        // Deliberate policy: no division by zero, no NaN
        assert_eq!(ledger.spent_percentage(), 0.0);
    }

    #[test]
    fn test_spent_percentage_in_range() {
        let mut ledger = ExpenseLedger::new("trip-1", 40_000).unwrap();
        ledger.add(draft("Lunch", 10_000, Category::Food)).unwrap();
        assert_eq!(ledger.spent_percentage(), 25.0);
    }

    #[test]
    fn test_by_category_breakdown() {
        let mut ledger = ledger();
        ledger.add(draft("Lunch", 5000, Category::Food)).unwrap();
        ledger.add(draft("Dinner", 3000, Category::Food)).unwrap();
        ledger.add(draft("Taxi", 2000, Category::Transport)).unwrap();

        let breakdown = ledger.by_category();
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category, Category::Food);
        assert_eq!(breakdown[0].total_cents, 8000);
        assert_eq!(breakdown[1].category, Category::Transport);
        assert_eq!(breakdown[1].total_cents, 2000);
    }

    #[test]
    fn test_by_category_ties_use_enumeration_order() {
        let mut ledger = ledger();
        ledger.add(draft("Museum", 3000, Category::Activities)).unwrap();
        ledger.add(draft("Taxi", 3000, Category::Transport)).unwrap();
        ledger.add(draft("Lunch", 3000, Category::Food)).unwrap();

        let categories: Vec<Category> = ledger.by_category().iter().map(|c| c.category).collect();
        assert_eq!(
            categories,
            [Category::Food, Category::Transport, Category::Activities]
        );
    }

    #[test]
    fn test_by_category_sums_to_total() {
        let mut ledger = ledger();
        ledger.add(draft("Lunch", 5137, Category::Food)).unwrap();
        ledger.add(draft("Hotel", 23_499, Category::Accommodation)).unwrap();
        ledger.add(draft("Taxi", 901, Category::Transport)).unwrap();
        ledger.add(draft("Souvenir", 1250, Category::Other)).unwrap();

        let breakdown_total: Cents = ledger.by_category().iter().map(|c| c.total_cents).sum();
        assert_eq!(breakdown_total, ledger.total_spent());
    }
}
