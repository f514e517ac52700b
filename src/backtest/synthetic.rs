use crate::backtest::metrics::{round_to, BacktestMetrics};
use crate::models::{BacktestParameters, EquityPoint, EquitySeries, Trade};
use chrono::{Duration, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEED: u64 = 42;
pub const EQUITY_POINTS: usize = 60;
pub const TRADE_COUNT: usize = 15;

const STARTING_EQUITY: f64 = 10_000.0;
const DAILY_EQUITY_STEP: f64 = 50.0;
const TICKERS: [&str; 7] = ["AAPL", "TSLA", "NVDA", "PLTR", "AMD", "SIDU", "BURU"];

/// Everything one backtest run hands to the display layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub equity: EquitySeries,
    pub metrics: BacktestMetrics,
}

/// Placeholder POP backtest: produces a random but reproducible result set
/// in place of a real strategy engine
pub struct ScenarioGenerator {
    seed: u64,
}

impl ScenarioGenerator {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run the placeholder backtest ending on today's local date
    pub fn generate(&self, params: &BacktestParameters) -> BacktestResult {
        self.generate_as_of(params, Local::now().date_naive())
    }

    /// Run the placeholder backtest ending on `as_of`
    ///
    /// Every call starts from a fresh RNG seeded with `self.seed`, so two
    /// calls with the same date return identical results.
    pub fn generate_as_of(&self, params: &BacktestParameters, as_of: NaiveDate) -> BacktestResult {
        let mut rng = StdRng::seed_from_u64(self.seed);
        Self::generate_with_rng(params, as_of, &mut rng)
    }

    /// Run the placeholder backtest drawing from a caller-supplied RNG
    ///
    /// `params` is accepted for interface parity with a real engine and is
    /// not consulted.
    pub fn generate_with_rng<R: Rng>(
        _params: &BacktestParameters,
        as_of: NaiveDate,
        rng: &mut R,
    ) -> BacktestResult {
        let equity = Self::generate_equity(as_of, rng);
        let trades = Self::generate_trades(&equity, rng);
        let metrics = BacktestMetrics::from_results(&trades, &equity);

        tracing::debug!(
            "Generated {} equity points and {} trades ending {}",
            equity.len(),
            trades.len(),
            as_of
        );

        BacktestResult {
            trades,
            equity,
            metrics,
        }
    }

    /// Random walk around the starting equity, one point per calendar day
    fn generate_equity<R: Rng>(as_of: NaiveDate, rng: &mut R) -> EquitySeries {
        let mut equity = Vec::with_capacity(EQUITY_POINTS);
        let mut cumulative = 0.0;

        for i in 0..EQUITY_POINTS {
            let days_back = (EQUITY_POINTS - 1 - i) as i64;
            let step: f64 = rng.sample(StandardNormal);
            cumulative += step * DAILY_EQUITY_STEP;

            equity.push(EquityPoint {
                date: as_of - Duration::days(days_back),
                equity: STARTING_EQUITY + cumulative,
            });
        }

        equity
    }

    /// Trades on distinct days of the equity series, sorted by date
    fn generate_trades<R: Rng>(equity: &[EquityPoint], rng: &mut R) -> Vec<Trade> {
        let count = TRADE_COUNT.min(equity.len());
        let dates: Vec<NaiveDate> = rand::seq::index::sample(&mut *rng, equity.len(), count)
            .into_iter()
            .map(|i| equity[i].date)
            .collect();

        let mut trades: Vec<Trade> = dates
            .into_iter()
            .map(|date| Trade {
                date,
                ticker: TICKERS[rng.gen_range(0..TICKERS.len())].to_string(),
                entry_price: round_to(rng.gen_range(1.0..100.0), 2),
                exit_price: round_to(rng.gen_range(1.0..110.0), 2),
                pnl_pct: round_to(rng.gen_range(-15.0..25.0), 2),
            })
            .collect();

        trades.sort_by_key(|t| t.date);
        trades
    }
}

impl Default for ScenarioGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_generate_shape() {
        let result = ScenarioGenerator::default().generate_as_of(&BacktestParameters::default(), as_of());

        assert_eq!(result.equity.len(), EQUITY_POINTS);
        assert_eq!(result.trades.len(), TRADE_COUNT);
        assert_eq!(result.metrics.total_trades, TRADE_COUNT);
        assert_eq!(result.metrics.entries().len(), 5);
    }

    #[test]
    fn test_equity_anchored_to_as_of_date() {
        let result = ScenarioGenerator::default().generate_as_of(&BacktestParameters::default(), as_of());

        assert_eq!(result.equity.last().unwrap().date, as_of());
        assert_eq!(result.equity.first().unwrap().date, as_of() - Duration::days(59));

        for pair in result.equity.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let generator = ScenarioGenerator::new(7);
        let first = generator.generate_as_of(&BacktestParameters::default(), as_of());
        let second = generator.generate_as_of(&BacktestParameters::default(), as_of());

        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seeds_differ() {
        let params = BacktestParameters::default();
        let a = ScenarioGenerator::new(1).generate_as_of(&params, as_of());
        let b = ScenarioGenerator::new(2).generate_as_of(&params, as_of());

        assert_ne!(a.equity, b.equity);
    }

    #[test]
    fn test_parameters_are_ignored() {
        let generator = ScenarioGenerator::default();
        let filtered = BacktestParameters {
            gap_pct: Some(10.0),
            price_max: Some(5.0),
            ..Default::default()
        };

        assert_eq!(
            generator.generate_as_of(&BacktestParameters::default(), as_of()),
            generator.generate_as_of(&filtered, as_of())
        );
    }

    #[test]
    fn test_trades_sorted_on_distinct_series_dates() {
        let result = ScenarioGenerator::default().generate_as_of(&BacktestParameters::default(), as_of());

        for pair in result.trades.windows(2) {
            assert!(pair[0].date < pair[1].date, "Trade dates should be unique and ascending");
        }
        for trade in &result.trades {
            assert!(result.equity.iter().any(|p| p.date == trade.date));
            assert!(TICKERS.contains(&trade.ticker.as_str()));
        }
    }

    #[test]
    fn test_trade_value_ranges() {
        let result = ScenarioGenerator::new(99).generate_as_of(&BacktestParameters::default(), as_of());

        for trade in &result.trades {
            assert!((1.0..=100.0).contains(&trade.entry_price));
            assert!((1.0..=110.0).contains(&trade.exit_price));
            assert!((-15.0..=25.0).contains(&trade.pnl_pct));
        }
    }

    #[test]
    fn test_metric_invariants_across_seeds() {
        for seed in 0..25 {
            let result = ScenarioGenerator::new(seed).generate_as_of(&BacktestParameters::default(), as_of());

            assert!((0.0..=100.0).contains(&result.metrics.win_rate));
            assert!(result.metrics.max_drawdown_pct >= 0.0);
            assert_eq!(result.metrics.total_trades, result.trades.len());
        }
    }
}
