use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Analysis, Config, DataSource, SourceKind};

/// Prefix for environment overrides, e.g. `INDEX_COMPARE__ANALYSIS__VOLATILITY_WINDOW=30`.
const ENV_PREFIX: &str = "INDEX_COMPARE";

/// Loads the application configuration from `config.toml` in the working directory.
///
/// The file is optional: built-in defaults reproduce the standard index catalog.
/// Environment variables override both.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from("config.toml", false)
}

/// Loads the configuration from an explicit file.
pub fn load_config_from(path: impl AsRef<Path>, required: bool) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path.as_ref()).required(required))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    tracing::debug!(indices = config.indices.len(), "Configuration loaded.");
    Ok(config)
}

/// Parses a configuration from TOML text, without consulting the environment.
pub fn from_toml_str(contents: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(contents, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;

    validate(&config)?;
    Ok(config)
}

/// Rejects configurations the analysis could never run with.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.analysis.volatility_window < 2 {
        return Err(ConfigError::ValidationError(format!(
            "analysis.volatility_window must be at least 2, got {}",
            config.analysis.volatility_window
        )));
    }

    if config.indices.is_empty() {
        return Err(ConfigError::ValidationError(
            "at least one index must be configured".to_string(),
        ));
    }

    if let Some(missing) = config
        .analysis
        .default_selection
        .iter()
        .find(|name| config.find_index(name).is_none())
    {
        return Err(ConfigError::ValidationError(format!(
            "default selection '{}' is not in the index catalog",
            missing
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_file_falls_back_to_defaults() {
        let config = from_toml_str("").unwrap();

        assert_eq!(config.analysis.volatility_window, 20);
        assert_eq!(
            config.analysis.default_start_date,
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
        );
        assert_eq!(
            config.index_names(),
            vec!["S&P 500", "NASDAQ", "Dow Jones", "Russell 2000", "NYSE Composite"]
        );
        assert_eq!(config.data_source.kind, SourceKind::Yahoo);
    }

    #[test]
    fn file_overrides_catalog_and_analysis() {
        let config = from_toml_str(
            r#"
            [analysis]
            volatility_window = 10
            default_start_date = "2020-06-01"
            default_selection = ["DAX"]

            [data_source]
            kind = "csv"
            base_url = "http://localhost:9000"
            user_agent = "test"
            csv_path = "prices.csv"

            [[indices]]
            name = "DAX"
            ticker = "^GDAXI"
            "#,
        )
        .unwrap();

        assert_eq!(config.analysis.volatility_window, 10);
        assert_eq!(config.data_source.kind, SourceKind::Csv);
        assert_eq!(config.data_source.csv_path.as_deref(), Some("prices.csv"));
        assert_eq!(config.find_index("dax").unwrap().ticker, "^GDAXI");
        assert_eq!(config.find_index("^gdaxi").unwrap().name, "DAX");
        assert!(config.find_index("S&P 500").is_none());
    }

    #[test]
    fn window_below_two_is_rejected() {
        let err = from_toml_str(
            r#"
            [analysis]
            volatility_window = 1
            default_start_date = "2022-01-01"
            default_selection = []
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn unknown_default_selection_is_rejected() {
        let err = from_toml_str(
            r#"
            [analysis]
            volatility_window = 20
            default_start_date = "2022-01-01"
            default_selection = ["FTSE 100"]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("FTSE 100"));
    }
}
