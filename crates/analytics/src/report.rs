use crate::series::{
    CumulativeReturnSeries, DailyReturns, NormalizedSeries, RollingVolatilitySeries,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Headline statistics for one instrument over the selected range.
///
/// Return and volatility figures are plain fractions except `total_return_pct`,
/// which is already a percentage. Volatility is daily, not annualized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_price: f64,
    pub end_price: f64,
    /// Number of price observations the summary was computed from.
    pub observations: usize,
    pub total_return_pct: f64,
    /// `None` when the series has no daily returns (a single observation).
    pub average_daily_return: Option<f64>,
    /// `None` when there are fewer than two daily returns.
    pub volatility: Option<f64>,
}

/// Every derived series for one instrument, computed from the same input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentAnalysis {
    pub normalized: NormalizedSeries,
    pub cumulative_return: CumulativeReturnSeries,
    pub daily_returns: DailyReturns,
    pub rolling_volatility: RollingVolatilitySeries,
    pub summary: SummaryRecord,
}

/// The result of one analysis request: the selected instruments, in selection order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub window: usize,
    pub instruments: Vec<InstrumentAnalysis>,
}

impl AnalysisReport {
    pub fn summaries(&self) -> Vec<SummaryRecord> {
        self.instruments.iter().map(|i| i.summary.clone()).collect()
    }

    pub fn normalized(&self) -> Vec<&NormalizedSeries> {
        self.instruments.iter().map(|i| &i.normalized).collect()
    }

    pub fn cumulative_returns(&self) -> Vec<&CumulativeReturnSeries> {
        self.instruments.iter().map(|i| &i.cumulative_return).collect()
    }

    pub fn rolling_volatility(&self) -> Vec<&RollingVolatilitySeries> {
        self.instruments.iter().map(|i| &i.rolling_volatility).collect()
    }
}
