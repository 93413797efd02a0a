use chrono::NaiveDate;
use core_types::Instrument;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: Analysis,
    #[serde(default)]
    pub data_source: DataSource,
    /// The catalog of indices the user can choose from, in display order.
    #[serde(default = "default_indices")]
    pub indices: Vec<Instrument>,
}

/// Defaults applied to a comparison request when the user does not override them.
#[derive(Debug, Clone, Deserialize)]
pub struct Analysis {
    /// Number of daily returns in each rolling volatility window.
    pub volatility_window: usize,
    /// The start of the comparison range when none is given.
    pub default_start_date: NaiveDate,
    /// Index names selected when the user does not pick any.
    pub default_selection: Vec<String>,
}

/// Where price series are loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SourceKind {
    /// The Yahoo Finance chart API.
    #[default]
    Yahoo,
    /// A local long-format CSV file with `date,ticker,close` columns.
    Csv,
}

/// Settings for the market-data source.
#[derive(Debug, Clone, Deserialize)]
pub struct DataSource {
    #[serde(default)]
    pub kind: SourceKind,
    /// Base URL of the chart API, without a trailing slash.
    pub base_url: String,
    /// The chart API rejects requests without a browser-like user agent.
    pub user_agent: String,
    /// Path of the price file used when `kind = "csv"`.
    #[serde(default)]
    pub csv_path: Option<String>,
}

impl Default for Analysis {
    fn default() -> Self {
        Self {
            volatility_window: 20,
            default_start_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            default_selection: vec!["S&P 500".to_string(), "NASDAQ".to_string()],
        }
    }
}

impl Default for DataSource {
    fn default() -> Self {
        Self {
            kind: SourceKind::Yahoo,
            base_url: "https://query1.finance.yahoo.com".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            csv_path: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: Analysis::default(),
            data_source: DataSource::default(),
            indices: default_indices(),
        }
    }
}

fn default_indices() -> Vec<Instrument> {
    vec![
        Instrument::new("S&P 500", "^GSPC"),
        Instrument::new("NASDAQ", "^IXIC"),
        Instrument::new("Dow Jones", "^DJI"),
        Instrument::new("Russell 2000", "^RUT"),
        Instrument::new("NYSE Composite", "^NYA"),
    ]
}

impl Config {
    /// Looks up a catalog entry by display name or ticker, ignoring case.
    pub fn find_index(&self, name: &str) -> Option<&Instrument> {
        let name = name.trim();
        self.indices.iter().find(|i| {
            i.name.eq_ignore_ascii_case(name) || i.ticker.eq_ignore_ascii_case(name)
        })
    }

    pub fn index_names(&self) -> Vec<&str> {
        self.indices.iter().map(|i| i.name.as_str()).collect()
    }
}
