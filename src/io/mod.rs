//! Session-file input and report output.
//!
//! A session file is the JSON the app exports for one trip: the trip record
//! plus its expense records, with decimal amounts. Loading is read-only;
//! nothing is ever written back (the ledger is session-scoped by design).

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::application::{BudgetSummary, CategorySummary};
use crate::domain::{
    Category, Expense, ExpenseDraft, ExpenseLedger, Trip, format_cents, from_major_units,
};

/// Wire format of a session file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFile {
    pub trip: TripRecord,
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    pub id: String,
    #[serde(default)]
    pub destination: String,
    /// Budget in major units (e.g. 3000.0)
    pub budget: f64,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub id: String,
    pub trip_id: String,
    pub category: String,
    pub description: String,
    /// Amount in major units (e.g. 42.5)
    pub amount: f64,
    /// Either ISO ("2025-08-05") or display-formatted ("Aug 5, 2025")
    pub date: String,
    #[serde(default)]
    pub receipt_image_url: Option<String>,
}

/// A problem found in one record of a session file.
#[derive(Debug, Clone)]
pub struct RecordIssue {
    pub record_id: String,
    pub problem: String,
}

impl std::fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.record_id, self.problem)
    }
}

#[derive(Debug)]
pub struct LoadedSession {
    pub trip: Trip,
    pub ledger: ExpenseLedger,
}

/// Read and parse a session file from disk.
pub fn read_session_file(path: &Path) -> Result<SessionFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file: {}", path.display()))?;
    let file: SessionFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse session file: {}", path.display()))?;
    debug!(
        trip_id = %file.trip.id,
        expenses = file.expenses.len(),
        "parsed session file"
    );
    Ok(file)
}

/// Load a session file and build a populated ledger from it.
/// Strict: the first invalid record aborts the load with a named error.
pub fn load_session(path: &Path) -> Result<LoadedSession> {
    let file = read_session_file(path)?;
    build_session(file)
}

pub fn build_session(file: SessionFile) -> Result<LoadedSession> {
    let budget_cents = from_major_units(file.trip.budget)
        .ok()
        .filter(|b| *b >= 0)
        .with_context(|| format!("Trip {} has an invalid budget", file.trip.id))?;

    let mut trip = Trip::new(file.trip.id.clone(), file.trip.destination.clone(), budget_cents);
    trip.start_date = file.trip.start_date;
    trip.end_date = file.trip.end_date;

    let mut ledger = ExpenseLedger::for_trip(&trip)
        .with_context(|| format!("Cannot open a ledger for trip {}", trip.id))?;

    // Records are inserted newest-last so same-date records keep their
    // file order (the ledger puts the latest insertion first among ties).
    // Ids are derived from the record ids, so loading the same file twice
    // yields the same ids and exports stay stable.
    for record in file.expenses.iter().rev() {
        let draft = draft_from_record(record)
            .with_context(|| format!("Invalid expense record {}", record.id))?;
        let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, record.id.as_bytes());
        ledger
            .add_with_id(id, draft)
            .with_context(|| format!("Invalid expense record {}", record.id))?;
    }

    Ok(LoadedSession { trip, ledger })
}

fn draft_from_record(record: &ExpenseRecord) -> Result<ExpenseDraft> {
    let category = Category::from_str(&record.category)
        .with_context(|| format!("unknown category '{}'", record.category))?;
    let amount_cents =
        from_major_units(record.amount).with_context(|| "unparseable amount".to_string())?;
    let date = parse_record_date(&record.date)
        .with_context(|| format!("unparseable date '{}'", record.date))?;

    let mut draft = ExpenseDraft::new(record.description.clone(), amount_cents, category, date);
    if let Some(url) = &record.receipt_image_url {
        draft = draft.with_receipt_url(url.clone());
    }
    Ok(draft)
}

/// Check every record of a session file without building a ledger.
/// Returns one issue per problem found; an empty list means a clean file.
pub fn validate_records(file: &SessionFile) -> Vec<RecordIssue> {
    let mut issues = Vec::new();
    let mut push = |record_id: &str, problem: String| {
        issues.push(RecordIssue {
            record_id: record_id.to_string(),
            problem,
        });
    };

    if from_major_units(file.trip.budget).map(|b| b < 0).unwrap_or(true) {
        push(&file.trip.id, format!("invalid budget {}", file.trip.budget));
    }

    for record in &file.expenses {
        if record.trip_id != file.trip.id {
            push(
                &record.id,
                format!("belongs to trip '{}', not '{}'", record.trip_id, file.trip.id),
            );
        }
        if Category::from_str(&record.category).is_none() {
            push(&record.id, format!("unknown category '{}'", record.category));
        }
        match from_major_units(record.amount) {
            Ok(cents) if cents < 0 => push(&record.id, format!("negative amount {}", record.amount)),
            Ok(_) => {}
            Err(_) => push(&record.id, format!("unparseable amount {}", record.amount)),
        }
        if record.description.trim().is_empty() {
            push(&record.id, "empty description".to_string());
        }
        if parse_record_date(&record.date).is_none() {
            push(&record.id, format!("unparseable date '{}'", record.date));
        }
    }

    issues
}

/// Session files carry dates either ISO or display-formatted, depending on
/// whether the record came from the API or from the entry form.
fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for format in ["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    None
}

// ========================
// Report output
// ========================

/// Full summary report for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub summary: BudgetSummary,
    pub categories: Vec<CategorySummary>,
}

pub fn write_summary_json<W: Write>(report: &SummaryReport, mut writer: W) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Export expenses to CSV in the given order. Returns the row count.
pub fn write_expenses_csv<W: Write>(expenses: &[Expense], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "id",
        "date",
        "description",
        "category",
        "amount",
        "receipt_image_url",
    ])?;

    let mut count = 0;
    for expense in expenses {
        csv_writer.write_record([
            expense.id.to_string(),
            expense.date.to_string(),
            expense.description.clone(),
            expense.category.as_str().to_string(),
            format_cents(expense.amount_cents),
            expense.receipt_image_url.clone().unwrap_or_default(),
        ])?;
        count += 1;
    }

    csv_writer.flush()?;
    Ok(count)
}

/// Export the category breakdown to CSV. Returns the row count.
pub fn write_breakdown_csv<W: Write>(rows: &[CategorySummary], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(["category", "total", "count", "percentage"])?;

    let mut count = 0;
    for row in rows {
        csv_writer.write_record([
            row.category.as_str().to_string(),
            format_cents(row.total_cents),
            row.count.to_string(),
            format!("{:.1}", row.percentage),
        ])?;
        count += 1;
    }

    csv_writer.flush()?;
    Ok(count)
}
