use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use configuration::DataSource;
use core_types::{Instrument, PriceSeries};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

pub mod csv_source;
pub mod error;
pub mod responses;
// --- Public API ---
pub use csv_source::CsvPriceSource;
pub use responses::parse_chart_response;

/// The abstract interface for anything that can supply daily closes.
/// The comparison pipeline only talks to this trait, so the network client
/// and a local file can be swapped for one another.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetches one row per trading day in `[start, end]`. A `None` close marks a
    /// day the source listed without a price.
    async fn fetch_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Option<f64>)>, ApiError>;
}

/// Fetches an instrument's closes and cleans them into a `PriceSeries`.
///
/// Gaps are forward-filled and the result is clipped to `[start, end]`. An
/// instrument with no data comes back as an empty series; the caller decides
/// whether to skip it.
pub async fn fetch_series(
    source: &dyn PriceSource,
    instrument: &Instrument,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, ApiError> {
    if start > end {
        return Err(ApiError::InvalidData(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }

    let raw = source.fetch_closes(&instrument.ticker, start, end).await?;
    let series = PriceSeries::from_raw_closes(instrument.name.clone(), raw).between(start, end);

    if series.is_empty() {
        tracing::warn!(ticker = %instrument.ticker, "No data returned for {}.", instrument.name);
    } else {
        tracing::debug!(
            ticker = %instrument.ticker,
            points = series.len(),
            "Fetched price series for {}.",
            instrument.name
        );
    }

    Ok(series)
}

/// A concrete implementation of the `PriceSource` for the Yahoo Finance chart API.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(settings: &DataSource) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&settings.user_agent)
            .map_err(|e| ApiError::InvalidData(format!("Invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, agent);

        Ok(Self {
            client: reqwest::Client::builder()
                .default_headers(headers)
                .build()?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Midnight UTC of `date` as unix seconds.
fn unix_midnight(date: NaiveDate) -> Result<i64, ApiError> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| ApiError::InvalidData(format!("Invalid date: {}", date)))
}

#[async_trait]
impl PriceSource for YahooClient {
    async fn fetch_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Option<f64>)>, ApiError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);

        // `period2` is exclusive, so ask for everything before the day after `end`.
        let next_day = end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| ApiError::InvalidData(format!("Invalid end date: {}", end)))?;
        let period1 = unix_midnight(start)?.to_string();
        let period2 = unix_midnight(next_day)?.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
                ("events", "history"),
                ("includeAdjustedClose", "true"),
            ])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        match parse_chart_response(&text) {
            Ok(rows) => Ok(rows),
            // Non-JSON error pages: report the HTTP status instead.
            Err(ApiError::Deserialization(_)) if !status.is_success() => Err(ApiError::Provider(
                format!("{} returned HTTP {}", url, status),
            )),
            Err(e) => Err(e),
        }
    }
}
