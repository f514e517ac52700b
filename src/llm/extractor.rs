use crate::llm::{OpenAIParameterSource, ParameterSource};
use crate::models::BacktestParameters;
use crate::settings::Settings;
use serde::Serialize;

/// Result of one extraction attempt
///
/// `params` is empty whenever extraction was unavailable or failed; each
/// failure adds exactly one entry to `warnings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extraction {
    pub params: BacktestParameters,
    pub warnings: Vec<String>,
}

/// Turns free text into backtest parameters without ever failing
///
/// The capability is decided once when the extractor is built: with no
/// source every call returns empty parameters and makes no request.
pub struct ParameterExtractor {
    source: Option<Box<dyn ParameterSource>>,
}

impl ParameterExtractor {
    pub fn new(source: Box<dyn ParameterSource>) -> Self {
        Self {
            source: Some(source),
        }
    }

    pub fn disabled() -> Self {
        Self { source: None }
    }

    /// Build from settings: enabled only when an API key is configured
    pub fn from_settings(settings: &Settings) -> Self {
        let Some(api_key) = settings.api_key.clone() else {
            tracing::info!("No API key configured, parameter extraction disabled");
            return Self::disabled();
        };

        match OpenAIParameterSource::new(api_key, settings) {
            Ok(source) => {
                tracing::info!("Parameter extraction enabled ({})", settings.model);
                Self::new(Box::new(source))
            }
            Err(e) => {
                tracing::warn!("Could not build API client, parameter extraction disabled: {}", e);
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.source.is_some()
    }

    pub async fn extract(&self, text: &str) -> Extraction {
        let Some(source) = &self.source else {
            return Extraction::default();
        };

        match source.extract(text).await {
            Ok(params) => {
                tracing::info!("Extracted {} parameter(s) via {}", params.len(), source.name());
                Extraction {
                    params,
                    warnings: vec![],
                }
            }
            Err(e) => {
                let warning = format!("{} extraction error: {}", source.name(), e);
                tracing::warn!("{}", warning);
                Extraction {
                    params: BacktestParameters::default(),
                    warnings: vec![warning],
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{parse_parameters, ExtractionError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Replays a canned completion through the real parser
    struct CannedSource {
        completion: Result<String, u16>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ParameterSource for CannedSource {
        async fn extract(&self, _text: &str) -> Result<BacktestParameters, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.completion {
                Ok(text) => parse_parameters(text),
                Err(status) => Err(ExtractionError::Status {
                    status: *status,
                    body: "quota exceeded".to_string(),
                }),
            }
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    fn canned(completion: Result<&str, u16>) -> (ParameterExtractor, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CannedSource {
            completion: completion.map(str::to_string),
            calls: calls.clone(),
        };
        (ParameterExtractor::new(Box::new(source)), calls)
    }

    #[test]
    fn test_disabled_extractor_returns_empty() {
        let extractor = ParameterExtractor::disabled();
        let extraction = tokio_test::block_on(
            extractor.extract("gap up stocks under $5 with float under 10 million"),
        );

        assert!(!extractor.is_enabled());
        assert!(extraction.params.is_empty());
        assert!(extraction.warnings.is_empty());
    }

    #[test]
    fn test_from_settings_without_key_is_disabled() {
        let extractor = ParameterExtractor::from_settings(&Settings::default());
        assert!(!extractor.is_enabled());
    }

    #[test]
    fn test_from_settings_with_key_is_enabled() {
        let extractor = ParameterExtractor::from_settings(&Settings::default().with_api_key("sk-test"));
        assert!(extractor.is_enabled());
    }

    #[test]
    fn test_valid_completion_passes_through() {
        let (extractor, calls) = canned(Ok(r#"{"GapPct": 10, "PriceMax": 5}"#));
        let extraction = tokio_test::block_on(extractor.extract("gap ups under $5"));

        assert_eq!(
            serde_json::to_value(&extraction.params).unwrap(),
            serde_json::json!({"GapPct": 10.0, "PriceMax": 5.0})
        );
        assert!(extraction.warnings.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_prose_completion_yields_one_warning() {
        let (extractor, calls) = canned(Ok("sure, here are your parameters"));
        let extraction = tokio_test::block_on(extractor.extract("gap ups"));

        assert!(extraction.params.is_empty());
        assert_eq!(extraction.warnings.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1, "No retry on malformed output");
    }

    #[test]
    fn test_api_failure_yields_one_warning() {
        let (extractor, _) = canned(Err(429));
        let extraction = tokio_test::block_on(extractor.extract("gap ups"));

        assert!(extraction.params.is_empty());
        assert_eq!(extraction.warnings.len(), 1);
        assert!(extraction.warnings[0].contains("429"));
    }
}
