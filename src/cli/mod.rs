use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::application::{BudgetSummary, apply_suggestion, category_summaries};
use crate::domain::{Category, Cents, Expense, ExpenseDraft, format_cents, parse_cents};
use crate::extraction::{GeminiExtractor, ReceiptExtractor, ReceiptImage};
use crate::io::{
    SummaryReport, load_session, read_session_file, validate_records, write_breakdown_csv,
    write_expenses_csv, write_summary_json,
};

/// TripNest - travel expense ledger
#[derive(Parser)]
#[command(name = "tripnest")]
#[command(about = "Session-scoped travel expense ledger with AI receipt scanning")]
#[command(version)]
pub struct Cli {
    /// Enable verbose (debug) logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the budget summary and category breakdown for a trip session
    Summary {
        /// Session file exported by the app (JSON)
        session: PathBuf,

        /// Override the trip budget with a decimal amount, e.g. "2500.00"
        #[arg(short, long)]
        budget: Option<String>,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// List a trip's expenses, most recent first
    Expenses {
        /// Session file exported by the app (JSON)
        session: PathBuf,

        /// Filter by category (Food, Transport, Accommodation, Activities, Other)
        #[arg(short, long)]
        category: Option<String>,

        /// Maximum number of expenses to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format: table, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Scan a receipt image and print the suggested expense entry
    Scan {
        /// Receipt image file (JPEG, PNG or GIF)
        image: PathBuf,

        /// Gemini model to use (default: gemini-2.5-flash)
        #[arg(long)]
        model: Option<String>,
    },

    /// Validate the records of a session file
    Check {
        /// Session file exported by the app (JSON)
        session: PathBuf,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let filter = if self.verbose {
            EnvFilter::new("tripnest=debug")
        } else {
            EnvFilter::from_default_env()
        };
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();

        match self.command {
            Commands::Summary {
                session,
                budget,
                format,
            } => run_summary_command(&session, budget.as_deref(), &format),

            Commands::Expenses {
                session,
                category,
                limit,
                format,
            } => run_expenses_command(&session, category.as_deref(), limit, &format),

            Commands::Scan { image, model } => run_scan_command(&image, model).await,

            Commands::Check { session } => run_check_command(&session),
        }
    }
}

fn run_summary_command(session_path: &Path, budget: Option<&str>, format: &str) -> Result<()> {
    let mut session = load_session(session_path)?;
    if let Some(raw) = budget {
        session.ledger.set_budget(parse_budget_arg(raw)?)?;
    }
    let report = SummaryReport {
        summary: BudgetSummary::of(&session.ledger),
        categories: category_summaries(&session.ledger),
    };

    match format {
        "json" => write_summary_json(&report, std::io::stdout())?,
        "csv" => {
            write_breakdown_csv(&report.categories, std::io::stdout())?;
        }
        "table" => {
            let summary = &report.summary;
            if session.trip.destination.is_empty() {
                println!("Trip: {}", session.trip.id);
            } else {
                println!("Trip: {} ({})", session.trip.destination, session.trip.id);
            }
            println!("  Budget:    {}", format_cents(summary.budget_cents));
            println!(
                "  Spent:     {} ({:.1}% of budget)",
                format_cents(summary.total_spent_cents),
                summary.spent_percentage
            );
            println!("  Remaining: {}", format_cents(summary.remaining_cents));
            println!();

            if report.categories.is_empty() {
                println!("No spending to categorize yet.");
            } else {
                println!("{:<16} {:>10} {:>7} {:>7}", "CATEGORY", "TOTAL", "COUNT", "SHARE");
                println!("{}", "-".repeat(43));
                for row in &report.categories {
                    println!(
                        "{:<16} {:>10} {:>7} {:>6.1}%",
                        row.category.as_str(),
                        format_cents(row.total_cents),
                        row.count,
                        row.percentage
                    );
                }
            }
        }
        other => bail!("Unknown format '{}'. Use: table, json, csv", other),
    }

    Ok(())
}

fn run_expenses_command(
    session_path: &Path,
    category: Option<&str>,
    limit: Option<usize>,
    format: &str,
) -> Result<()> {
    let session = load_session(session_path)?;

    let filter = category
        .map(|name| {
            Category::from_str(name).with_context(|| {
                format!(
                    "Unknown category '{}'. Valid: Food, Transport, Accommodation, Activities, Other",
                    name
                )
            })
        })
        .transpose()?;

    let expenses: Vec<Expense> = session
        .ledger
        .expenses()
        .iter()
        .filter(|e| filter.is_none_or(|c| e.category == c))
        .take(limit.unwrap_or(usize::MAX))
        .cloned()
        .collect();

    match format {
        "csv" => {
            write_expenses_csv(&expenses, std::io::stdout())?;
        }
        "table" => {
            if expenses.is_empty() {
                println!("No expenses logged for this trip yet.");
                return Ok(());
            }
            println!(
                "{:<14} {:<14} {:<30} {:>10}",
                "DATE", "CATEGORY", "DESCRIPTION", "AMOUNT"
            );
            println!("{}", "-".repeat(71));
            for expense in &expenses {
                let receipt_marker = if expense.receipt_image_url.is_some() {
                    " [receipt]"
                } else {
                    ""
                };
                println!(
                    "{:<14} {:<14} {:<30} {:>10}{}",
                    expense.display_date(),
                    expense.category.as_str(),
                    expense.description,
                    format_cents(expense.amount_cents),
                    receipt_marker
                );
            }
        }
        other => bail!("Unknown format '{}'. Use: table, csv", other),
    }

    Ok(())
}

async fn run_scan_command(image_path: &Path, model: Option<String>) -> Result<()> {
    let bytes = std::fs::read(image_path)
        .with_context(|| format!("Failed to read image file: {}", image_path.display()))?;
    let image = ReceiptImage::new(bytes, mime_for(image_path)?);

    let mut extractor =
        GeminiExtractor::from_env().context("Set GEMINI_API_KEY to use receipt scanning")?;
    if let Some(model) = model {
        extractor = extractor.with_model(model);
    }

    // Extraction failure is never fatal: report it once and leave the user
    // to manual entry, exactly like the app's expense form.
    match extractor.extract(&image).await {
        Ok(suggestion) => {
            let mut draft = ExpenseDraft::blank();
            apply_suggestion(&mut draft, &suggestion);

            println!("Suggested entry:");
            println!("  Description: {}", draft.description);
            println!("  Amount:      {}", format_cents(draft.amount_cents));
            println!("  Category:    {}", draft.category);
            println!("  Date:        {}", draft.date);
        }
        Err(err) => {
            warn!(error = %err, "receipt extraction failed");
            println!("Could not automatically extract details ({}).", err);
            println!("Please enter them manually.");
        }
    }

    Ok(())
}

fn run_check_command(session_path: &Path) -> Result<()> {
    let file = read_session_file(session_path)?;
    let issues = validate_records(&file);

    if issues.is_empty() {
        println!(
            "Session file OK: trip {} with {} expense record(s).",
            file.trip.id,
            file.expenses.len()
        );
        return Ok(());
    }

    println!("Found {} problem(s):", issues.len());
    for issue in &issues {
        println!("  {}", issue);
    }
    bail!("Session file has invalid records")
}

fn parse_budget_arg(raw: &str) -> Result<Cents> {
    let cents =
        parse_cents(raw).with_context(|| format!("Invalid budget amount '{}'", raw))?;
    if cents < 0 {
        bail!("Budget must be non-negative, got '{}'", raw);
    }
    Ok(cents)
}

fn mime_for(path: &Path) -> Result<&'static str> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => Ok("image/jpeg"),
        Some("png") => Ok("image/png"),
        Some("gif") => Ok("image/gif"),
        _ => bail!(
            "Unsupported image type: {} (expected .jpg, .jpeg, .png or .gif)",
            path.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_budget_arg() {
        assert_eq!(parse_budget_arg("2500.00").unwrap(), 250_000);
        assert_eq!(parse_budget_arg("2500").unwrap(), 250_000);
        assert_eq!(parse_budget_arg("0").unwrap(), 0);
        assert!(parse_budget_arg("-10").is_err());
        assert!(parse_budget_arg("a lot").is_err());
    }

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for(Path::new("receipt.jpg")).unwrap(), "image/jpeg");
        assert_eq!(mime_for(Path::new("receipt.JPEG")).unwrap(), "image/jpeg");
        assert_eq!(mime_for(Path::new("receipt.png")).unwrap(), "image/png");
        assert!(mime_for(Path::new("receipt.pdf")).is_err());
        assert!(mime_for(Path::new("receipt")).is_err());
    }
}
