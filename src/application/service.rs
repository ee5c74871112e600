use tracing::debug;

use crate::domain::{Cents, Expense, ExpenseDraft, ExpenseId, ExpenseLedger, Trip};
use crate::extraction::{ReceiptExtractor, ReceiptImage};

use super::{AppError, BudgetSummary, CategorySummary, apply_suggestion, category_summaries};

/// Session-scoped owner of one trip's expense ledger.
///
/// Mirrors the expense screen's lifecycle: constructed when the screen
/// opens (copying the trip's budget), dropped when it closes. All
/// mutations run synchronously on the caller's flow; the only suspending
/// operation is `suggest_from_receipt`, which reads nothing from and
/// writes nothing to the ledger. Dropping that future cancels the
/// suggestion with no ledger state left behind.
pub struct TripSession {
    ledger: ExpenseLedger,
}

impl TripSession {
    /// Open a session for a trip with an empty ledger.
    pub fn start(trip: &Trip) -> Result<Self, AppError> {
        debug!(trip_id = %trip.id, "starting expense session");
        Ok(Self {
            ledger: ExpenseLedger::for_trip(trip)?,
        })
    }

    /// Open a session over an already-populated ledger (e.g. loaded from a
    /// session file).
    pub fn with_ledger(ledger: ExpenseLedger) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &ExpenseLedger {
        &self.ledger
    }

    // ========================
    // Ledger operations
    // ========================

    pub fn add_expense(&mut self, draft: ExpenseDraft) -> Result<ExpenseId, AppError> {
        Ok(self.ledger.add(draft)?)
    }

    pub fn update_expense(&mut self, id: ExpenseId, draft: ExpenseDraft) -> Result<(), AppError> {
        Ok(self.ledger.update(id, draft)?)
    }

    pub fn delete_expense(&mut self, id: ExpenseId) -> Result<Expense, AppError> {
        Ok(self.ledger.remove(id)?)
    }

    pub fn set_budget(&mut self, budget_cents: Cents) -> Result<(), AppError> {
        Ok(self.ledger.set_budget(budget_cents)?)
    }

    // ========================
    // Reports
    // ========================

    pub fn summary(&self) -> BudgetSummary {
        BudgetSummary::of(&self.ledger)
    }

    pub fn breakdown(&self) -> Vec<CategorySummary> {
        category_summaries(&self.ledger)
    }

    // ========================
    // Receipt-assisted entry
    // ========================

    /// Run receipt extraction and return a pre-filled draft.
    ///
    /// Suspends while the extractor works; the ledger stays readable and
    /// untouched throughout. On failure the caller gets the error once and
    /// falls back to manual entry. Committing the draft still requires an
    /// explicit `add_expense` or `update_expense`.
    pub async fn suggest_from_receipt(
        &self,
        extractor: &dyn ReceiptExtractor,
        image: &ReceiptImage,
    ) -> Result<ExpenseDraft, AppError> {
        let suggestion = extractor.extract(image).await?;
        let mut draft = ExpenseDraft::blank();
        apply_suggestion(&mut draft, &suggestion);
        Ok(draft)
    }
}
