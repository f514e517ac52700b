// Free text -> backtest parameters
pub mod extractor;
pub mod openai;

pub use extractor::{Extraction, ParameterExtractor};
pub use openai::OpenAIParameterSource;

use crate::models::{BacktestParameters, PARAMETER_KEYS};
use async_trait::async_trait;
use thiserror::Error;

/// Fixed instruction sent ahead of the user's text
pub const SYSTEM_PROMPT: &str = "You translate plain English into a JSON object of POP backtest parameters.
Fields: GapPct (number), MinRVOL (number), MaxFloat (millions), PriceMax (number),
DateStart (YYYY-MM-DD), DateEnd (YYYY-MM-DD).
Only output valid JSON with those keys (omit if not specified).";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected API response: {0}")]
    Envelope(String),

    #[error("API returned no completion")]
    EmptyResponse,

    #[error("Response is not a parameter object: {reason} (text: {text})")]
    Malformed { reason: String, text: String },
}

/// Anything that can turn free text into backtest parameters
#[async_trait]
pub trait ParameterSource: Send + Sync {
    async fn extract(&self, text: &str) -> Result<BacktestParameters, ExtractionError>;

    fn name(&self) -> &str;
}

/// Parse a completion into parameters
///
/// Accepts a bare JSON object or one wrapped in a markdown code block. Keys
/// outside the recognized set are dropped; a recognized key with the wrong
/// type makes the whole payload malformed.
pub fn parse_parameters(raw: &str) -> Result<BacktestParameters, ExtractionError> {
    let text = strip_code_fence(raw);
    let malformed = |reason: String| ExtractionError::Malformed {
        reason,
        text: text.to_string(),
    };

    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;

    let mut object = match value {
        serde_json::Value::Object(object) => object,
        other => return Err(malformed(format!("expected a JSON object, got {}", other))),
    };

    let unknown: Vec<String> = object
        .keys()
        .filter(|k| !PARAMETER_KEYS.contains(&k.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        tracing::debug!("Dropping unrecognized parameter keys: {:?}", unknown);
        object.retain(|k, _| PARAMETER_KEYS.contains(&k.as_str()));
    }

    serde_json::from_value(serde_json::Value::Object(object)).map_err(|e| malformed(e.to_string()))
}

/// Strip markdown code blocks (```json ... ``` or ``` ... ```)
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    if !text.starts_with("```") {
        return text;
    }

    text.trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
