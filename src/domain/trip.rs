use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Cents;

/// Trip data supplied by the trip collaborator when a ledger session starts.
/// The ledger copies `budget_cents` at construction and works on its own
/// copy; the trip record is never written back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub destination: String,
    pub budget_cents: Cents,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Trip {
    pub fn new(id: impl Into<String>, destination: impl Into<String>, budget_cents: Cents) -> Self {
        Self {
            id: id.into(),
            destination: destination.into(),
            budget_cents,
            start_date: None,
            end_date: None,
        }
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }
}
