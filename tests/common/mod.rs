// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::io::Write;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tempfile::NamedTempFile;
use tripnest::application::TripSession;
use tripnest::domain::{Category, Cents, ExpenseDraft, Trip};
use tripnest::extraction::{ExtractionError, ReceiptExtractor, ReceiptImage, ReceiptSuggestion};

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Draft with a fixed mid-trip date
pub fn draft(description: &str, amount_cents: Cents, category: Category) -> ExpenseDraft {
    dated_draft(description, amount_cents, category, "2025-08-10")
}

pub fn dated_draft(
    description: &str,
    amount_cents: Cents,
    category: Category,
    date_str: &str,
) -> ExpenseDraft {
    ExpenseDraft::new(description, amount_cents, category, parse_date(date_str))
}

/// Test fixture: a week in Lisbon with a 3000.00 budget
pub fn lisbon_trip() -> Trip {
    Trip::new("trip-1", "Lisbon", 300_000)
        .with_dates(parse_date("2025-08-04"), parse_date("2025-08-11"))
}

pub fn test_session() -> Result<TripSession> {
    Ok(TripSession::start(&lisbon_trip())?)
}

/// Write a session file to a temp path and return its handle
pub fn write_session_file(json: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    Ok(file)
}

pub const SAMPLE_SESSION_JSON: &str = r#"{
    "trip": {
        "id": "trip-1",
        "destination": "Lisbon",
        "budget": 3000,
        "startDate": "2025-08-04",
        "endDate": "2025-08-11"
    },
    "expenses": [
        {
            "id": "exp-1",
            "tripId": "trip-1",
            "category": "Food",
            "description": "Dinner at Time Out Market",
            "amount": 42.5,
            "date": "Aug 7, 2025"
        },
        {
            "id": "exp-2",
            "tripId": "trip-1",
            "category": "Accommodation",
            "description": "Hotel Alfama",
            "amount": 380,
            "date": "2025-08-04",
            "receiptImageUrl": "receipts/exp-2.jpg"
        },
        {
            "id": "exp-3",
            "tripId": "trip-1",
            "category": "Transport",
            "description": "Metro pass",
            "amount": 7,
            "date": "2025-08-04"
        }
    ]
}"#;

/// Extractor that always returns the same suggestion
pub struct FixedExtractor {
    pub suggestion: ReceiptSuggestion,
}

impl FixedExtractor {
    pub fn returning(suggestion: ReceiptSuggestion) -> Self {
        Self { suggestion }
    }
}

#[async_trait]
impl ReceiptExtractor for FixedExtractor {
    async fn extract(&self, _image: &ReceiptImage) -> Result<ReceiptSuggestion, ExtractionError> {
        Ok(self.suggestion.clone())
    }
}

/// Extractor that always fails, as a timeout or bad response would
pub struct FailingExtractor;

#[async_trait]
impl ReceiptExtractor for FailingExtractor {
    async fn extract(&self, _image: &ReceiptImage) -> Result<ReceiptSuggestion, ExtractionError> {
        Err(ExtractionError::MalformedResponse(
            "no candidate text in response".to_string(),
        ))
    }
}

pub fn cafe_suggestion() -> ReceiptSuggestion {
    ReceiptSuggestion {
        merchant: "Cafe Lisboa".to_string(),
        amount: 18.4,
        date: "2025-08-05".to_string(),
        category: Some("Food".to_string()),
    }
}

pub fn sample_image() -> ReceiptImage {
    ReceiptImage::jpeg(vec![0xff, 0xd8, 0xff, 0xe0])
}
