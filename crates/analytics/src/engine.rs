use crate::error::AnalyticsError;
use crate::report::{AnalysisReport, InstrumentAnalysis, SummaryRecord};
use crate::series::{
    CumulativeReturnSeries, DailyReturns, DerivedSeries, NormalizedSeries, Observation,
    RollingVolatilitySeries,
};
use crate::stats::{mean, sample_std_dev};
use core_types::{PricePoint, PriceSeries};

/// Trading days in the rolling volatility window when none is configured.
pub const DEFAULT_VOLATILITY_WINDOW: usize = 20;

/// A stateless calculator for deriving comparison series from daily prices.
#[derive(Debug, Default)]
pub struct TimeSeriesAnalyzer {}

impl TimeSeriesAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebases a price series so that its first observation is exactly 100.
    ///
    /// # Errors
    ///
    /// * `InsufficientData` if the series is empty.
    /// * `DivisionByZero` if the first price is zero.
    pub fn normalize(&self, series: &PriceSeries) -> Result<NormalizedSeries, AnalyticsError> {
        let base = base_price(series)?;
        Ok(derive(series, |close| close / base * 100.0))
    }

    /// Percentage change of every price relative to the first one.
    ///
    /// Same preconditions as [`normalize`](Self::normalize). The first value is exactly 0.
    pub fn cumulative_return(
        &self,
        series: &PriceSeries,
    ) -> Result<CumulativeReturnSeries, AnalyticsError> {
        let base = base_price(series)?;
        Ok(derive(series, |close| (close / base - 1.0) * 100.0))
    }

    /// Day-over-day simple returns, `price[i] / price[i - 1] - 1`.
    ///
    /// A series with fewer than two points yields an empty result rather than an error.
    pub fn daily_returns(&self, series: &PriceSeries) -> Result<DailyReturns, AnalyticsError> {
        let observations = series
            .points()
            .windows(2)
            .map(|w| {
                let previous = checked_divisor(series.name(), &w[0])?;
                Ok(Observation::new(w[1].date, w[1].close / previous - 1.0))
            })
            .collect::<Result<Vec<_>, AnalyticsError>>()?;

        Ok(DerivedSeries::new(series.name(), observations))
    }

    /// Sample standard deviation of the trailing `window` returns at every position.
    ///
    /// The output has one entry per input return. The first `window - 1` entries are
    /// `None`, and if there are fewer returns than `window` every entry is `None`.
    pub fn rolling_volatility(
        &self,
        returns: &DailyReturns,
        window: usize,
    ) -> Result<RollingVolatilitySeries, AnalyticsError> {
        if window < 2 {
            return Err(AnalyticsError::InvalidInput(format!(
                "rolling volatility window must be at least 2, got {}",
                window
            )));
        }

        let values = returns.values();
        let warmup = (window - 1).min(values.len());

        let undefined = returns.observations[..warmup]
            .iter()
            .map(|o| Observation::new(o.date, None));
        let computed = values
            .windows(window)
            .zip(&returns.observations[warmup..])
            .map(|(slice, o)| Observation::new(o.date, sample_std_dev(slice)));

        Ok(RollingVolatilitySeries {
            name: returns.name.clone(),
            window,
            observations: undefined.chain(computed).collect(),
        })
    }

    /// Computes the headline statistics for one instrument.
    ///
    /// A single-point series has a total return of 0 and no average return or
    /// volatility. Two points give an average return but still no volatility,
    /// because the sample standard deviation of one value is undefined.
    pub fn summarize(&self, series: &PriceSeries) -> Result<SummaryRecord, AnalyticsError> {
        let cumulative = self.cumulative_return(series)?;
        let returns = self.daily_returns(series)?.values();

        // `cumulative_return` has already rejected an empty series.
        let (first, last) = match (series.first(), series.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(insufficient(series)),
        };

        Ok(SummaryRecord {
            name: series.name().to_string(),
            start_date: first.date,
            end_date: last.date,
            start_price: first.close,
            end_price: last.close,
            observations: series.len(),
            total_return_pct: cumulative.last_value().unwrap_or(0.0),
            average_daily_return: mean(&returns),
            volatility: sample_std_dev(&returns),
        })
    }

    /// Runs every calculation for one instrument.
    pub fn analyze(
        &self,
        series: &PriceSeries,
        window: usize,
    ) -> Result<InstrumentAnalysis, AnalyticsError> {
        let daily_returns = self.daily_returns(series)?;
        let rolling_volatility = self.rolling_volatility(&daily_returns, window)?;

        Ok(InstrumentAnalysis {
            normalized: self.normalize(series)?,
            cumulative_return: self.cumulative_return(series)?,
            summary: self.summarize(series)?,
            daily_returns,
            rolling_volatility,
        })
    }

    /// The main entry point for one comparison request.
    ///
    /// Instruments keep the order they were selected in. The first failing
    /// instrument aborts the whole request.
    pub fn analyze_all(
        &self,
        series: &[PriceSeries],
        window: usize,
    ) -> Result<AnalysisReport, AnalyticsError> {
        let instruments = series
            .iter()
            .map(|s| self.analyze(s, window))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AnalysisReport {
            window,
            instruments,
        })
    }
}

/// Maps every price of the series through `f`, keeping the dates.
fn derive(series: &PriceSeries, f: impl Fn(f64) -> f64) -> DerivedSeries {
    let observations = series
        .points()
        .iter()
        .map(|p| Observation::new(p.date, f(p.close)))
        .collect();
    DerivedSeries::new(series.name(), observations)
}

fn base_price(series: &PriceSeries) -> Result<f64, AnalyticsError> {
    let first = series.first().ok_or_else(|| insufficient(series))?;
    checked_divisor(series.name(), first)
}

/// `PriceSeries` already rules out negative prices; zero is the one divisor left to reject.
fn checked_divisor(name: &str, point: &PricePoint) -> Result<f64, AnalyticsError> {
    if point.close == 0.0 {
        return Err(AnalyticsError::DivisionByZero(format!(
            "'{}' has a zero price on {}",
            name, point.date
        )));
    }
    Ok(point.close)
}

fn insufficient(series: &PriceSeries) -> AnalyticsError {
    AnalyticsError::InsufficientData(format!("'{}' has no price observations", series.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    const EPS: f64 = 1e-9;

    fn series(prices: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint::new(start + Duration::days(i as i64), p))
            .collect();
        PriceSeries::new("TEST", points).unwrap()
    }

    fn returns(values: &[f64]) -> DailyReturns {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Observation::new(start + Duration::days(i as i64), v))
            .collect();
        DerivedSeries::new("TEST", observations)
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < EPS, "expected {:?}, got {:?}", expected, actual);
        }
    }

    #[test]
    fn normalize_rebases_to_one_hundred() {
        let analyzer = TimeSeriesAnalyzer::new();
        let normalized = analyzer.normalize(&series(&[100.0, 110.0, 99.0])).unwrap();

        assert_eq!(normalized.observations[0].value, 100.0);
        assert_close(&normalized.values(), &[100.0, 110.0, 99.0]);
    }

    #[test]
    fn normalize_first_value_is_exact_for_awkward_prices() {
        let analyzer = TimeSeriesAnalyzer::new();
        let normalized = analyzer.normalize(&series(&[3.3333, 7.1])).unwrap();
        assert_eq!(normalized.observations[0].value, 100.0);
    }

    #[test]
    fn cumulative_return_starts_at_zero() {
        let analyzer = TimeSeriesAnalyzer::new();
        let cumulative = analyzer
            .cumulative_return(&series(&[100.0, 110.0, 99.0]))
            .unwrap();

        assert_eq!(cumulative.observations[0].value, 0.0);
        assert_close(&cumulative.values(), &[0.0, 10.0, -1.0]);
    }

    #[test]
    fn normalize_rejects_empty_series() {
        let analyzer = TimeSeriesAnalyzer::new();
        assert!(matches!(
            analyzer.normalize(&series(&[])),
            Err(AnalyticsError::InsufficientData(_))
        ));
        assert!(matches!(
            analyzer.cumulative_return(&series(&[])),
            Err(AnalyticsError::InsufficientData(_))
        ));
    }

    #[test]
    fn normalize_rejects_zero_base_price() {
        let analyzer = TimeSeriesAnalyzer::new();
        assert!(matches!(
            analyzer.normalize(&series(&[0.0, 5.0])),
            Err(AnalyticsError::DivisionByZero(_))
        ));
    }

    #[test]
    fn daily_returns_are_dated_by_the_later_day() {
        let analyzer = TimeSeriesAnalyzer::new();
        let prices = series(&[100.0, 105.0, 103.0, 110.0]);
        let daily = analyzer.daily_returns(&prices).unwrap();

        assert_eq!(daily.len(), 3);
        assert_eq!(daily.observations[0].date, prices.points()[1].date);
        assert_close(
            &daily.values(),
            &[0.05, 103.0 / 105.0 - 1.0, 110.0 / 103.0 - 1.0],
        );
    }

    #[test]
    fn daily_returns_of_single_point_is_empty() {
        let analyzer = TimeSeriesAnalyzer::new();
        assert!(analyzer.daily_returns(&series(&[42.0])).unwrap().is_empty());
        assert!(analyzer.daily_returns(&series(&[])).unwrap().is_empty());
    }

    #[test]
    fn daily_returns_reject_zero_previous_price() {
        let analyzer = TimeSeriesAnalyzer::new();
        assert!(matches!(
            analyzer.daily_returns(&series(&[10.0, 0.0, 5.0])),
            Err(AnalyticsError::DivisionByZero(_))
        ));
    }

    #[test]
    fn rolling_volatility_full_window_yields_one_value() {
        let analyzer = TimeSeriesAnalyzer::new();
        let values: Vec<f64> = [0.05, -0.02, 0.03, 0.01]
            .iter()
            .cycle()
            .take(20)
            .copied()
            .collect();
        let vol = analyzer.rolling_volatility(&returns(&values), 20).unwrap();

        assert_eq!(vol.len(), 20);
        assert_eq!(vol.defined_count(), 1);
        assert!(vol.observations[..19].iter().all(|o| o.value.is_none()));
        let expected = sample_std_dev(&values).unwrap();
        assert!((vol.observations[19].value.unwrap() - expected).abs() < EPS);
    }

    #[test]
    fn rolling_volatility_short_history_is_all_undefined() {
        let analyzer = TimeSeriesAnalyzer::new();
        let values = vec![0.01; 19];
        let vol = analyzer.rolling_volatility(&returns(&values), 20).unwrap();

        assert_eq!(vol.len(), 19);
        assert_eq!(vol.defined_count(), 0);

        let empty = analyzer.rolling_volatility(&returns(&[]), 20).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn rolling_volatility_distinguishes_zero_from_undefined() {
        let analyzer = TimeSeriesAnalyzer::new();
        let vol = analyzer
            .rolling_volatility(&returns(&[0.01, 0.01, 0.01]), 2)
            .unwrap();

        assert_eq!(vol.observations[0].value, None);
        assert_eq!(vol.observations[1].value, Some(0.0));
        assert_eq!(vol.observations[2].value, Some(0.0));
    }

    #[test]
    fn rolling_volatility_each_value_covers_exactly_one_window() {
        let analyzer = TimeSeriesAnalyzer::new();
        let values = [0.01, -0.02, 0.04, 0.0, 0.03];
        let vol = analyzer.rolling_volatility(&returns(&values), 3).unwrap();

        assert_eq!(vol.defined_count(), 3);
        for (i, slice) in values.windows(3).enumerate() {
            let expected = sample_std_dev(slice).unwrap();
            assert!((vol.observations[i + 2].value.unwrap() - expected).abs() < EPS);
        }
    }

    #[test]
    fn rolling_volatility_rejects_window_below_two() {
        let analyzer = TimeSeriesAnalyzer::new();
        assert!(matches!(
            analyzer.rolling_volatility(&returns(&[0.01, 0.02]), 1),
            Err(AnalyticsError::InvalidInput(_))
        ));
    }

    #[test]
    fn summarize_computes_headline_statistics() {
        let analyzer = TimeSeriesAnalyzer::new();
        let summary = analyzer.summarize(&series(&[100.0, 105.0, 110.0])).unwrap();

        let r1: f64 = 0.05;
        let r2 = 110.0 / 105.0 - 1.0;
        let avg = (r1 + r2) / 2.0;
        let vol = (((r1 - avg).powi(2) + (r2 - avg).powi(2)) / 1.0).sqrt();

        assert!((summary.total_return_pct - 10.0).abs() < EPS);
        assert!((summary.average_daily_return.unwrap() - avg).abs() < EPS);
        assert!((summary.average_daily_return.unwrap() - 0.0488).abs() < 1e-4);
        assert!((summary.volatility.unwrap() - vol).abs() < EPS);
        assert_eq!(summary.start_price, 100.0);
        assert_eq!(summary.end_price, 110.0);
        assert_eq!(summary.observations, 3);
    }

    #[test]
    fn summarize_single_point_has_no_return_statistics() {
        let analyzer = TimeSeriesAnalyzer::new();
        let summary = analyzer.summarize(&series(&[50.0])).unwrap();

        assert_eq!(summary.total_return_pct, 0.0);
        assert_eq!(summary.average_daily_return, None);
        assert_eq!(summary.volatility, None);
        assert_eq!(summary.start_date, summary.end_date);
    }

    #[test]
    fn summarize_two_points_has_average_but_no_volatility() {
        let analyzer = TimeSeriesAnalyzer::new();
        let summary = analyzer.summarize(&series(&[50.0, 55.0])).unwrap();

        assert!((summary.average_daily_return.unwrap() - 0.1).abs() < EPS);
        assert_eq!(summary.volatility, None);
    }

    #[test]
    fn summarize_empty_series_is_insufficient_data() {
        let analyzer = TimeSeriesAnalyzer::new();
        assert!(matches!(
            analyzer.summarize(&series(&[])),
            Err(AnalyticsError::InsufficientData(_))
        ));
    }

    #[test]
    fn analyze_all_keeps_selection_order_and_stops_on_first_error() {
        let analyzer = TimeSeriesAnalyzer::new();
        let a = PriceSeries::new("A", series(&[1.0, 2.0]).points().to_vec()).unwrap();
        let b = PriceSeries::new("B", series(&[4.0, 2.0]).points().to_vec()).unwrap();

        let report = analyzer.analyze_all(&[b.clone(), a.clone()], 2).unwrap();
        let names: Vec<_> = report.summaries().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(report.window, 2);

        let broken = PriceSeries::new("Z", series(&[0.0, 1.0]).points().to_vec()).unwrap();
        assert!(analyzer.analyze_all(&[a, broken, b], 2).is_err());
    }
}
