use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dated value of a derived series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation<T> {
    pub date: NaiveDate,
    pub value: T,
}

impl<T> Observation<T> {
    pub fn new(date: NaiveDate, value: T) -> Self {
        Self { date, value }
    }
}

/// A date-indexed series where every position has a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    pub name: String,
    pub observations: Vec<Observation<f64>>,
}

/// Prices rebased so the first observation is 100.
pub type NormalizedSeries = DerivedSeries;

/// Percentage change relative to the first observed price.
pub type CumulativeReturnSeries = DerivedSeries;

/// Simple day-over-day returns, dated by the later of the two days.
pub type DailyReturns = DerivedSeries;

impl DerivedSeries {
    pub fn new(name: impl Into<String>, observations: Vec<Observation<f64>>) -> Self {
        Self {
            name: name.into(),
            observations,
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn last_value(&self) -> Option<f64> {
        self.observations.last().map(|o| o.value)
    }
}

/// Trailing-window sample standard deviation of daily returns.
///
/// Positions before the first full window hold `None`: "not yet computable"
/// is a different statement from "zero volatility".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingVolatilitySeries {
    pub name: String,
    pub window: usize,
    pub observations: Vec<Observation<Option<f64>>>,
}

impl RollingVolatilitySeries {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Number of positions that have a full window behind them.
    pub fn defined_count(&self) -> usize {
        self.observations.iter().filter(|o| o.value.is_some()).count()
    }
}

/// A named, date-indexed column of optional values, ready to be laid out
/// next to other instruments in a table.
pub trait DatedColumn {
    fn column_name(&self) -> &str;
    fn column(&self) -> Vec<(NaiveDate, Option<f64>)>;
}

impl DatedColumn for DerivedSeries {
    fn column_name(&self) -> &str {
        &self.name
    }

    fn column(&self) -> Vec<(NaiveDate, Option<f64>)> {
        self.observations
            .iter()
            .map(|o| (o.date, Some(o.value)))
            .collect()
    }
}

impl DatedColumn for RollingVolatilitySeries {
    fn column_name(&self) -> &str {
        &self.name
    }

    fn column(&self) -> Vec<(NaiveDate, Option<f64>)> {
        self.observations.iter().map(|o| (o.date, o.value)).collect()
    }
}
