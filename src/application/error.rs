use thiserror::Error;

use crate::domain::{ExpenseId, LedgerError};
use crate::extraction::ExtractionError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Expense not found: {0}")]
    ExpenseNotFound(ExpenseId),

    #[error("Receipt suggestion unavailable: {0}")]
    Extraction(#[from] ExtractionError),
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(reason) => AppError::Validation(reason),
            LedgerError::NotFound(id) => AppError::ExpenseNotFound(id),
        }
    }
}
