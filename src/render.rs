use analytics::AnalysisReport;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use exporter::{SUMMARY_HEADER, summary_cells};

/// Builds the performance summary table, one row per instrument.
pub fn summary_table(report: &AnalysisReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(SUMMARY_HEADER);

    for instrument in &report.instruments {
        table.add_row(summary_cells(&instrument.summary));
    }
    table
}

/// Builds the "where does each instrument stand today" table: the last point of every chart.
///
/// A rolling volatility that has no full window yet is shown as `n/a`, not `0`.
pub fn latest_table(report: &AnalysisReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec![
            "Index".to_string(),
            "As Of".to_string(),
            "Indexed Value (Start = 100)".to_string(),
            "Cumulative Return (%)".to_string(),
            format!("{}-Day Volatility (%)", report.window),
        ]);

    for instrument in &report.instruments {
        let as_of = instrument
            .normalized
            .observations
            .last()
            .map(|o| o.date.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let normalized = instrument
            .normalized
            .last_value()
            .map(|v| format!("{:.2}", v))
            .unwrap_or_default();
        let cumulative = instrument
            .cumulative_return
            .last_value()
            .map(|v| format!("{:.2}", v))
            .unwrap_or_default();
        let volatility = instrument
            .rolling_volatility
            .observations
            .last()
            .and_then(|o| o.value)
            .map(|v| format!("{:.2}", v * 100.0))
            .unwrap_or_else(|| "n/a".to_string());

        table.add_row(vec![
            instrument.summary.name.clone(),
            as_of,
            normalized,
            cumulative,
            volatility,
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::TimeSeriesAnalyzer;
    use chrono::{Duration, NaiveDate};
    use core_types::{PricePoint, PriceSeries};

    fn report(prices: &[f64], window: usize) -> AnalysisReport {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint::new(start + Duration::days(i as i64), p))
            .collect();
        let series = PriceSeries::new("S&P 500", points).unwrap();
        TimeSeriesAnalyzer::new().analyze_all(&[series], window).unwrap()
    }

    #[test]
    fn summary_table_has_one_row_per_instrument() {
        let table = summary_table(&report(&[100.0, 105.0, 110.0], 20));
        let rendered = table.to_string();

        assert_eq!(table.row_iter().count(), 1);
        assert!(rendered.contains("Volatility (%)"));
        assert!(rendered.contains("10.00"));
    }

    #[test]
    fn latest_table_marks_incomplete_window_as_not_available() {
        let rendered = latest_table(&report(&[100.0, 105.0, 110.0], 20)).to_string();
        assert!(rendered.contains("20-Day Volatility (%)"));
        assert!(rendered.contains("n/a"));
    }
}
