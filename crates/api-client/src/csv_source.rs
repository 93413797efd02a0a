use crate::PriceSource;
use crate::error::ApiError;
use async_trait::async_trait;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::path::PathBuf;

/// Reads prices from a local long-format CSV file (`date,ticker,close`).
///
/// An `adj_close` (or `adj close`) column is used instead of `close` when present.
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    path: PathBuf,
}

impl CsvPriceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PriceSource for CsvPriceSource {
    async fn fetch_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Option<f64>)>, ApiError> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        parse_long_csv(&contents, ticker, start, end)
    }
}

struct Columns {
    date: usize,
    ticker: usize,
    close: usize,
}

fn locate_columns(headers: &csv::StringRecord) -> Result<Columns, ApiError> {
    let find = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
    };

    let date = find(&["date"]).ok_or_else(|| ApiError::MissingColumn("date".to_string()))?;
    let ticker = find(&["ticker"]).ok_or_else(|| ApiError::MissingColumn("ticker".to_string()))?;
    let close = find(&["adj_close", "adj close"])
        .or_else(|| find(&["close"]))
        .ok_or_else(|| ApiError::MissingColumn("close".to_string()))?;

    Ok(Columns {
        date,
        ticker,
        close,
    })
}

/// Selects one ticker's rows within `[start, end]` from long-format CSV text.
///
/// Empty or non-numeric closes become gaps for the caller to forward-fill.
pub fn parse_long_csv(
    contents: &str,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<(NaiveDate, Option<f64>)>, ApiError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let columns = locate_columns(rdr.headers()?)?;

    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let row_ticker = record.get(columns.ticker).unwrap_or_default();
        if !row_ticker.eq_ignore_ascii_case(ticker) {
            continue;
        }

        let raw_date = record.get(columns.date).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
            ApiError::InvalidData(format!("row {}: bad date '{}': {}", line + 2, raw_date, e))
        })?;
        if date < start || date > end {
            continue;
        }

        let close = record
            .get(columns.close)
            .and_then(|c| c.parse::<f64>().ok());
        rows.push((date, close));
    }

    Ok(rows)
}
