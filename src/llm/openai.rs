//! Parameter extraction backed by the OpenAI chat completions API
//!
//! One request per call: no retry, no cache, no rate limiting.

use crate::llm::{parse_parameters, ExtractionError, ParameterSource, SYSTEM_PROMPT};
use crate::models::BacktestParameters;
use crate::settings::Settings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: Option<String>,
}

pub struct OpenAIParameterSource {
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAIParameterSource {
    pub fn new(api_key: String, settings: &Settings) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            api_key,
            endpoint: format!("{}/chat/completions", settings.api_base.trim_end_matches('/')),
            model: settings.model.clone(),
            temperature: settings.temperature,
            client,
        })
    }

    fn build_request(&self, text: &str) -> OpenAIRequest {
        OpenAIRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
        }
    }
}

#[async_trait]
impl ParameterSource for OpenAIParameterSource {
    async fn extract(&self, text: &str) -> Result<BacktestParameters, ExtractionError> {
        let request = self.build_request(text);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let openai_response: OpenAIResponse =
            serde_json::from_str(&body).map_err(|e| ExtractionError::Envelope(e.to_string()))?;

        let content = openai_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ExtractionError::EmptyResponse)?;

        tracing::debug!("Completion from {}: {}", self.model, content);

        parse_parameters(&content)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
