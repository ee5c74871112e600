use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::{ExtractionError, ReceiptExtractor, ReceiptImage, ReceiptSuggestion};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const REQUEST_TIMEOUT_SECS: u64 = 30;

const EXTRACTION_PROMPT: &str = "Analyze this receipt image. Extract the merchant name, the \
final total amount paid, and the transaction date. Also, based on the merchant name or items, \
suggest a category for this expense from the following list: 'Food', 'Transport', \
'Accommodation', 'Activities', 'Other'. If you cannot determine a category, omit the category \
field. Respond in a JSON format.";

/// Receipt extractor backed by the Gemini `generateContent` REST API.
/// Sends the image inline as base64 and constrains the reply to a JSON
/// schema matching [`ReceiptSuggestion`].
pub struct GeminiExtractor {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiExtractor {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Build an extractor from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, ExtractionError> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| ExtractionError::MissingApiKey)?;
        Self::new(api_key)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn request_body(&self, image: &ReceiptImage) -> serde_json::Value {
        json!({
            "contents": [{
                "parts": [
                    { "text": EXTRACTION_PROMPT },
                    {
                        "inline_data": {
                            "mime_type": image.mime_type,
                            "data": BASE64_STANDARD.encode(&image.bytes),
                        }
                    }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "merchant": { "type": "STRING" },
                        "amount": { "type": "NUMBER" },
                        "date": { "type": "STRING" },
                        "category": { "type": "STRING" }
                    },
                    "required": ["merchant", "amount", "date"]
                }
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl ReceiptExtractor for GeminiExtractor {
    async fn extract(&self, image: &ReceiptImage) -> Result<ReceiptSuggestion, ExtractionError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(
            model = %self.model,
            image_bytes = image.bytes.len(),
            "requesting receipt extraction"
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.request_body(image))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "receipt extraction request rejected");
            return Err(ExtractionError::Status(status));
        }

        let payload: GenerateContentResponse = response.json().await?;
        let text = payload
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.trim())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ExtractionError::MalformedResponse("no candidate text in response".to_string())
            })?;

        let suggestion: ReceiptSuggestion = serde_json::from_str(text)
            .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;

        debug!(merchant = %suggestion.merchant, "receipt extraction succeeded");
        Ok(suggestion)
    }
}
