use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keys the POP backtest understands, in display order
pub const PARAMETER_KEYS: [&str; 6] = [
    "GapPct", "MinRVOL", "MaxFloat", "PriceMax", "DateStart", "DateEnd",
];

/// Filter parameters for a POP backtest run
///
/// Every field is optional; `None` means the filter is unconstrained and the
/// key is left out of the serialized form entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestParameters {
    #[serde(rename = "GapPct", default, skip_serializing_if = "Option::is_none")]
    pub gap_pct: Option<f64>,
    #[serde(rename = "MinRVOL", default, skip_serializing_if = "Option::is_none")]
    pub min_rvol: Option<f64>,
    /// Millions of shares
    #[serde(rename = "MaxFloat", default, skip_serializing_if = "Option::is_none")]
    pub max_float: Option<f64>,
    #[serde(rename = "PriceMax", default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
    #[serde(rename = "DateStart", default, skip_serializing_if = "Option::is_none")]
    pub date_start: Option<NaiveDate>,
    #[serde(rename = "DateEnd", default, skip_serializing_if = "Option::is_none")]
    pub date_end: Option<NaiveDate>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("DateStart {start} is after DateEnd {end}")]
    DateRange { start: NaiveDate, end: NaiveDate },

    #[error("{field} must be a non-negative number, got {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

impl BacktestParameters {
    /// Number of keys that are set
    pub fn len(&self) -> usize {
        [
            self.gap_pct.is_some(),
            self.min_rvol.is_some(),
            self.max_float.is_some(),
            self.price_max.is_some(),
            self.date_start.is_some(),
            self.date_end.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overlay `overrides` on top of `self`, key by key
    pub fn merge(&self, overrides: &BacktestParameters) -> BacktestParameters {
        BacktestParameters {
            gap_pct: overrides.gap_pct.or(self.gap_pct),
            min_rvol: overrides.min_rvol.or(self.min_rvol),
            max_float: overrides.max_float.or(self.max_float),
            price_max: overrides.price_max.or(self.price_max),
            date_start: overrides.date_start.or(self.date_start),
            date_end: overrides.date_end.or(self.date_end),
        }
    }

    /// Check the date window and the filters that cannot be negative.
    ///
    /// `GapPct` is left unchecked: a negative gap is a gap down, which is a
    /// meaningful (if unusual) filter.
    pub fn validate(&self) -> Result<(), ParameterError> {
        for (field, value) in [
            ("MinRVOL", self.min_rvol),
            ("MaxFloat", self.max_float),
            ("PriceMax", self.price_max),
        ] {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(ParameterError::OutOfRange { field, value });
                }
            }
        }

        if let (Some(start), Some(end)) = (self.date_start, self.date_end) {
            if start > end {
                return Err(ParameterError::DateRange { start, end });
            }
        }

        Ok(())
    }
}

/// One closed position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Entry")]
    pub entry_price: f64,
    #[serde(rename = "Exit")]
    pub exit_price: f64,
    #[serde(rename = "PnL%")]
    pub pnl_pct: f64,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.pnl_pct > 0.0
    }
}

/// Account value at the close of one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Ordered by strictly increasing date
pub type EquitySeries = Vec<EquityPoint>;
