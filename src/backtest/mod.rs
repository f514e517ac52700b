pub mod metrics;
pub mod synthetic;

pub use metrics::BacktestMetrics;
pub use synthetic::{BacktestResult, ScenarioGenerator};
