use crate::error::ExportError;
use analytics::SummaryRecord;

pub const SUMMARY_HEADER: [&str; 8] = [
    "Index",
    "Start Date",
    "End Date",
    "Start Price",
    "End Price",
    "Total Return (%)",
    "Avg Daily Return (%)",
    "Volatility (%)",
];

/// The display cells of one summary row, shared by the CSV export and the terminal table.
///
/// Fractions are shown as percentages. Undefined statistics become empty cells, never `0`.
pub fn summary_cells(record: &SummaryRecord) -> [String; 8] {
    let pct3 = |v: Option<f64>| v.map(|v| format!("{:.3}", v * 100.0)).unwrap_or_default();

    [
        record.name.clone(),
        record.start_date.format("%Y-%m-%d").to_string(),
        record.end_date.format("%Y-%m-%d").to_string(),
        format!("{:.2}", record.start_price),
        format!("{:.2}", record.end_price),
        format!("{:.2}", record.total_return_pct),
        pct3(record.average_daily_return),
        pct3(record.volatility),
    ]
}

/// Serializes the performance summary, one row per instrument.
pub fn summary_csv(records: &[SummaryRecord]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(SUMMARY_HEADER)?;

    for record in records {
        wtr.write_record(summary_cells(record))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| ExportError::IntoInner(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
