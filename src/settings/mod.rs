use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Runtime settings, resolved once at startup
///
/// Sources, lowest precedence first: built-in defaults, an optional
/// `popbot.toml` in the working directory, then `POPBOT_*` environment
/// variables. The API key is read from `OPENAI_API_KEY` only; when it is
/// missing the parameter extractor stays disabled.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    pub seed: u64,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings: Settings = Config::builder()
            .set_default("api_base", DEFAULT_API_BASE)?
            .set_default("model", DEFAULT_MODEL)?
            .set_default("temperature", DEFAULT_TEMPERATURE as f64)?
            .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS as i64)?
            .set_default("seed", crate::backtest::synthetic::DEFAULT_SEED as i64)?
            .add_source(File::with_name("popbot").required(false))
            .add_source(Environment::with_prefix("POPBOT"))
            .build()?
            .try_deserialize()?;

        settings.api_key = non_empty(std::env::var(API_KEY_VAR).ok());

        tracing::debug!(
            "Loaded settings: model={}, api_base={}, extractor {}",
            settings.model,
            settings.api_base,
            if settings.api_key.is_some() { "enabled" } else { "disabled" }
        );

        Ok(settings)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = non_empty(Some(api_key.into()));
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Whether the text-to-parameters capability can be used at all
    pub fn extractor_available(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            seed: crate::backtest::synthetic::DEFAULT_SEED,
            api_key: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
