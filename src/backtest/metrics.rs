use crate::models::{EquityPoint, Trade};
use serde::{Deserialize, Serialize};

/// Summary of one backtest run, keyed the way the results screen labels them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestMetrics {
    #[serde(rename = "Total Return %")]
    pub total_return_pct: f64,
    #[serde(rename = "Win Rate %")]
    pub win_rate: f64,
    #[serde(rename = "Avg Trade %")]
    pub avg_trade_pct: f64,
    #[serde(rename = "Max Drawdown %")]
    pub max_drawdown_pct: f64,
    #[serde(rename = "Trades")]
    pub total_trades: usize,
}

impl BacktestMetrics {
    /// Derive the summary from a trade list and the equity curve
    pub fn from_results(trades: &[Trade], equity: &[EquityPoint]) -> Self {
        let total_trades = trades.len();

        let (win_rate, avg_trade_pct) = if total_trades > 0 {
            let winners = trades.iter().filter(|t| t.is_winner()).count();
            let total_pnl: f64 = trades.iter().map(|t| t.pnl_pct).sum();
            (
                winners as f64 / total_trades as f64 * 100.0,
                total_pnl / total_trades as f64,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            total_return_pct: round_to(Self::calculate_total_return(equity), 2),
            win_rate: round_to(win_rate, 1),
            avg_trade_pct: round_to(avg_trade_pct, 2),
            max_drawdown_pct: round_to(Self::calculate_max_drawdown(equity), 2),
            total_trades,
        }
    }

    fn calculate_total_return(equity: &[EquityPoint]) -> f64 {
        match (equity.first(), equity.last()) {
            (Some(first), Some(last)) if first.equity != 0.0 => {
                (last.equity / first.equity - 1.0) * 100.0
            }
            _ => 0.0,
        }
    }

    /// Largest shortfall below the running peak, as a percentage of the
    /// highest equity value seen over the whole series
    fn calculate_max_drawdown(equity: &[EquityPoint]) -> f64 {
        let mut peak = f64::NEG_INFINITY;
        let mut max_dd: f64 = 0.0;

        for point in equity {
            peak = peak.max(point.equity);
            max_dd = max_dd.max(peak - point.equity);
        }

        if peak > 0.0 {
            max_dd / peak * 100.0
        } else {
            0.0
        }
    }

    /// Label/value pairs in display order
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Return %", format!("{:.2}", self.total_return_pct)),
            ("Win Rate %", format!("{:.1}", self.win_rate)),
            ("Avg Trade %", format!("{:.2}", self.avg_trade_pct)),
            ("Max Drawdown %", format!("{:.2}", self.max_drawdown_pct)),
            ("Trades", self.total_trades.to_string()),
        ]
    }
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
