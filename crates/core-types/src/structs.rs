use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A market index as presented to the user, paired with the symbol the data source knows it by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    /// The display name, e.g. "S&P 500".
    pub name: String,
    /// The data-source symbol, e.g. "^GSPC".
    pub ticker: String,
}

impl Instrument {
    pub fn new(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
        }
    }
}

/// One trading day's adjusted close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// An ordered daily price series for a single instrument.
///
/// Construction guarantees that dates are strictly increasing and that every
/// price is finite and not negative. A zero price is accepted here and left to
/// the calculations that divide by it. Deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedPriceSeries")]
pub struct PriceSeries {
    name: String,
    points: Vec<PricePoint>,
}

#[derive(Deserialize)]
struct UncheckedPriceSeries {
    name: String,
    points: Vec<PricePoint>,
}

impl TryFrom<UncheckedPriceSeries> for PriceSeries {
    type Error = CoreError;

    fn try_from(raw: UncheckedPriceSeries) -> Result<Self, Self::Error> {
        PriceSeries::new(raw.name, raw.points)
    }
}

impl PriceSeries {
    /// Creates a validated series from already-ordered points.
    pub fn new(name: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, CoreError> {
        let name = name.into();

        for point in &points {
            if !point.close.is_finite() {
                return Err(CoreError::InvalidInput(
                    format!("{} close on {}", name, point.date),
                    format!("price must be finite, got {}", point.close),
                ));
            }
            if point.close < 0.0 {
                return Err(CoreError::InvalidInput(
                    format!("{} close on {}", name, point.date),
                    format!("price must not be negative, got {}", point.close),
                ));
            }
        }

        if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(CoreError::Unordered {
                series: name,
                date: pair[1].date,
            });
        }

        Ok(Self { name, points })
    }

    /// Builds a series from a raw download where some days may have no close.
    ///
    /// Rows are sorted by date and a repeated date keeps its last row. Gaps are
    /// forward-filled from the previous close; gaps before the first real close
    /// have nothing to fill from and are dropped. Non-finite and negative closes
    /// count as gaps.
    pub fn from_raw_closes(
        name: impl Into<String>,
        mut raw: Vec<(NaiveDate, Option<f64>)>,
    ) -> Self {
        raw.sort_by_key(|(date, _)| *date);

        let mut deduped: Vec<(NaiveDate, Option<f64>)> = Vec::with_capacity(raw.len());
        for (date, close) in raw {
            match deduped.last_mut() {
                Some(last) if last.0 == date => *last = (date, close),
                _ => deduped.push((date, close)),
            }
        }

        let mut points = Vec::with_capacity(deduped.len());
        let mut carried: Option<f64> = None;
        for (date, close) in deduped {
            let close = close.filter(|c| c.is_finite() && *c >= 0.0).or(carried);
            if let Some(close) = close {
                points.push(PricePoint::new(date, close));
                carried = Some(close);
            }
        }

        Self {
            name: name.into(),
            points,
        }
    }

    /// Returns the sub-series whose dates fall within `[start, end]`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            name: self.name.clone(),
            points: self
                .points
                .iter()
                .filter(|p| p.date >= start && p.date <= end)
                .copied()
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }
}
