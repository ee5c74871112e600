//! Receipt-extraction collaborator boundary.
//!
//! The ledger never talks to the AI service directly: it consumes a
//! best-effort [`ReceiptSuggestion`] produced by a [`ReceiptExtractor`].
//! Extraction failures are non-fatal and degrade to manual entry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod gemini;

pub use gemini::GeminiExtractor;

/// Captured or selected receipt image, as an opaque encoded payload.
#[derive(Debug, Clone)]
pub struct ReceiptImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ReceiptImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self::new(bytes, "image/jpeg")
    }
}

/// Structured field suggestion extracted from a receipt image.
///
/// Everything here is untrusted until the pre-fill step validates it:
/// `category` may be outside the fixed enumeration and `date` may not parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptSuggestion {
    pub merchant: String,
    /// Total amount paid, in major units (e.g. 42.50)
    pub amount: f64,
    /// Transaction date, ISO-like (e.g. "2025-08-05")
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("Receipt service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Receipt service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Malformed receipt response: {0}")]
    MalformedResponse(String),
}

/// External service that converts a receipt image into field suggestions.
///
/// Calls may suspend the caller but must never block ledger operations;
/// cancellation is simply dropping the future and discarding its result.
#[async_trait]
pub trait ReceiptExtractor: Send + Sync {
    async fn extract(&self, image: &ReceiptImage) -> Result<ReceiptSuggestion, ExtractionError>;
}
