use chrono::NaiveDate;

use crate::domain::{Category, ExpenseDraft, from_major_units};
use crate::extraction::ReceiptSuggestion;

/// Description used when the extractor cannot name the merchant.
const SCANNED_RECEIPT: &str = "Scanned Receipt";

/// Pre-fill a draft from a receipt suggestion.
///
/// Every field is validated before use: a category outside the fixed
/// enumeration is dropped, an unparseable date leaves the draft's date
/// untouched (never defaulted to "now"), and a negative or non-finite
/// amount is ignored. The draft commits nothing until the caller passes
/// it to the ledger's add or update.
pub fn apply_suggestion(draft: &mut ExpenseDraft, suggestion: &ReceiptSuggestion) {
    if let Ok(cents) = from_major_units(suggestion.amount) {
        if cents >= 0 {
            draft.amount_cents = cents;
        }
    }

    let merchant = suggestion.merchant.trim();
    draft.description = if merchant.is_empty() {
        SCANNED_RECEIPT.to_string()
    } else {
        merchant.to_string()
    };

    if let Some(name) = &suggestion.category {
        if let Some(category) = Category::from_str(name) {
            draft.category = category;
        }
    }

    if let Some(date) = parse_suggested_date(&suggestion.date) {
        draft.date = date;
    }
}

/// Defensive parse of the extractor's ISO-like date string.
fn parse_suggested_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    None
}
