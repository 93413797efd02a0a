use crate::error::ApiError;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

// Only the fields of `GET /v8/finance/chart/{symbol}` that the comparison needs.

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: Option<ChartMeta>,
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartMeta {
    /// Offset of the exchange's timezone from UTC, in seconds.
    #[serde(default)]
    pub gmtoffset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
    #[serde(default)]
    pub adjclose: Option<Vec<ChartAdjClose>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartAdjClose {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

/// Extracts one `(trading date, close)` row per timestamp from a chart response body.
///
/// Adjusted closes are preferred; plain closes are used when the provider sent none.
/// A response without timestamps means "no data for this range" and yields no rows.
pub fn parse_chart_response(body: &str) -> Result<Vec<(NaiveDate, Option<f64>)>, ApiError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;

    if let Some(error) = response.chart.error {
        return Err(ApiError::Provider(format!(
            "{}: {}",
            error.code, error.description
        )));
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let Some(timestamps) = result.timestamp else {
        return Ok(Vec::new());
    };

    let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

    let adjusted = result
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .map(|a| a.adjclose)
        .filter(|closes| !closes.is_empty());
    let closes = match adjusted {
        Some(closes) => closes,
        None => result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .ok_or_else(|| {
                ApiError::InvalidData("chart response has no close prices".to_string())
            })?,
    };

    if closes.len() != timestamps.len() {
        return Err(ApiError::InvalidData(format!(
            "chart response has {} timestamps but {} closes",
            timestamps.len(),
            closes.len()
        )));
    }

    timestamps
        .into_iter()
        .zip(closes)
        .map(|(ts, close)| {
            let date = DateTime::from_timestamp(ts + offset, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| ApiError::InvalidData(format!("Invalid timestamp: {}", ts)))?;
            Ok((date, close))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn prefers_adjusted_closes_and_applies_exchange_offset() {
        // 1704205800 is 2024-01-02 14:30 UTC, the NYSE open.
        let body = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":-18000},
            "timestamp":[1704205800,1704292200,1704378600],
            "indicators":{
                "quote":[{"close":[4742.83,4704.81,null]}],
                "adjclose":[{"adjclose":[4742.0,4704.0,null]}]
            }}],"error":null}}"#;

        let rows = parse_chart_response(body).unwrap();
        assert_eq!(
            rows,
            vec![
                (date(2024, 1, 2), Some(4742.0)),
                (date(2024, 1, 3), Some(4704.0)),
                (date(2024, 1, 4), None),
            ]
        );
    }

    #[test]
    fn falls_back_to_plain_closes() {
        let body = r#"{"chart":{"result":[{
            "timestamp":[1704205800],
            "indicators":{"quote":[{"close":[4742.83]}]}
            }],"error":null}}"#;

        let rows = parse_chart_response(body).unwrap();
        assert_eq!(rows, vec![(date(2024, 1, 2), Some(4742.83))]);
    }

    #[test]
    fn missing_timestamps_mean_no_data() {
        let body = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse_chart_response(body).unwrap().is_empty());
    }

    #[test]
    fn provider_error_is_surfaced() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart_response(body).unwrap_err();
        assert!(matches!(err, ApiError::Provider(msg) if msg.contains("delisted")));
    }

    #[test]
    fn mismatched_lengths_are_invalid() {
        let body = r#"{"chart":{"result":[{
            "timestamp":[1704205800,1704292200],
            "indicators":{"quote":[{"close":[1.0]}]}
            }],"error":null}}"#;
        assert!(matches!(
            parse_chart_response(body),
            Err(ApiError::InvalidData(_))
        ));
    }

    #[test]
    fn garbage_body_is_a_deserialization_error() {
        assert!(matches!(
            parse_chart_response("<html>rate limited</html>"),
            Err(ApiError::Deserialization(_))
        ));
    }
}
