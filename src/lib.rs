// Core modules
pub mod backtest;
pub mod settings;
pub mod llm;
pub mod models;

// Re-export commonly used types
pub use backtest::{BacktestMetrics, BacktestResult, ScenarioGenerator};
pub use settings::Settings;
pub use llm::{Extraction, ParameterExtractor, ParameterSource};
pub use models::*;
