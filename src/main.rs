use analytics::TimeSeriesAnalyzer;
use anyhow::{Context, bail};
use api_client::{CsvPriceSource, PriceSource, YahooClient, fetch_series};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use configuration::{Config, SourceKind};
use core_types::{Instrument, PriceSeries};
use exporter::WideTable;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod render;

/// The main entry point for the index comparison tool.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; it only carries optional overrides.
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => configuration::load_config_from(path, true),
        None => configuration::load_config(),
    }
    .context("Failed to load configuration")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Indices => handle_indices(&config),
        Commands::Compare(args) => handle_compare(args, &config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Compare the performance of market indices over a date range.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a configuration file (defaults to an optional `config.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the indices that can be compared.
    Indices,
    /// Fetch, normalize and summarize the selected indices.
    Compare(CompareArgs),
}

#[derive(Parser)]
struct CompareArgs {
    /// An index to include, by name or ticker (repeatable, e.g. --index "S&P 500" --index NASDAQ).
    #[arg(short, long = "index")]
    indices: Vec<String>,

    /// The start date (format: YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// The end date, inclusive (format: YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Number of daily returns in each rolling volatility window.
    #[arg(long)]
    window: Option<usize>,

    /// Where to load prices from.
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// A local long-format price file (date,ticker,close). Implies `--source csv`.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print the normalized data table as CSV.
    #[arg(long)]
    raw: bool,

    /// Directory to write the summary and data tables into as CSV files.
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_indices(config: &Config) -> anyhow::Result<()> {
    for instrument in &config.indices {
        println!("{:<16} {}", instrument.name, instrument.ticker);
    }
    Ok(())
}

/// Handles the orchestration of one comparison request.
async fn handle_compare(args: CompareArgs, config: &Config) -> anyhow::Result<()> {
    let names = if args.indices.is_empty() {
        config.analysis.default_selection.clone()
    } else {
        args.indices.clone()
    };
    if names.is_empty() {
        tracing::warn!("Please select at least one index to display the comparison.");
        return Ok(());
    }
    let instruments = resolve_instruments(config, &names)?;

    let from = args.from.unwrap_or(config.analysis.default_start_date);
    let to = args.to.unwrap_or_else(|| Utc::now().date_naive());
    if from > to {
        bail!("Start date {} is after end date {}", from, to);
    }
    let window = args.window.unwrap_or(config.analysis.volatility_window);

    let source = build_source(&args, config)?;

    tracing::info!(
        "Comparing {} from {} to {} ({}-day volatility window)",
        names.join(", "),
        from,
        to,
        window
    );

    let series = fetch_all(source.as_ref(), &instruments, from, to).await?;
    if series.is_empty() {
        tracing::warn!("None of the selected indices returned data for this range.");
        return Ok(());
    }

    let report = TimeSeriesAnalyzer::new()
        .analyze_all(&series, window)
        .context("Failed to analyze price series")?;

    println!("Performance Summary");
    println!("{}", render::summary_table(&report));
    println!("Latest Values");
    println!("{}", render::latest_table(&report));

    if args.raw {
        print!("{}", WideTable::from_columns(&report.normalized()).to_csv()?);
    }

    if let Some(dir) = &args.export_dir {
        let written = exporter::export_report(dir, &report)
            .with_context(|| format!("Failed to export results to {}", dir.display()))?;
        tracing::info!("Exported {} files to {}", written.len(), dir.display());
    }

    Ok(())
}

/// Maps user-supplied names onto catalog entries, keeping the user's order.
fn resolve_instruments(config: &Config, names: &[String]) -> anyhow::Result<Vec<Instrument>> {
    names
        .iter()
        .map(|name| {
            config.find_index(name).cloned().with_context(|| {
                format!(
                    "Unknown index '{}'. Known indices: {}",
                    name,
                    config.index_names().join(", ")
                )
            })
        })
        .collect()
}

/// An explicit `--source` wins, then `--csv`, then the configured kind.
fn source_kind(args: &CompareArgs, config: &Config) -> SourceKind {
    match (&args.source, &args.csv) {
        (Some(kind), _) => *kind,
        (None, Some(_)) => SourceKind::Csv,
        (None, None) => config.data_source.kind,
    }
}

fn build_source(args: &CompareArgs, config: &Config) -> anyhow::Result<Box<dyn PriceSource>> {
    let source: Box<dyn PriceSource> = match source_kind(args, config) {
        SourceKind::Yahoo => Box::new(YahooClient::new(&config.data_source)?),
        SourceKind::Csv => {
            let path = args
                .csv
                .clone()
                .or_else(|| config.data_source.csv_path.as_ref().map(PathBuf::from))
                .context("The csv source needs --csv or data_source.csv_path")?;
            Box::new(CsvPriceSource::new(path))
        }
    };
    Ok(source)
}

/// Fetches every instrument concurrently and drops the ones without data.
async fn fetch_all(
    source: &dyn PriceSource,
    instruments: &[Instrument],
    from: NaiveDate,
    to: NaiveDate,
) -> anyhow::Result<Vec<PriceSeries>> {
    let progress_bar = ProgressBar::new(instruments.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let tasks = instruments.iter().map(|instrument| {
        let pb = progress_bar.clone();
        async move {
            pb.set_message(format!("Fetching {}...", instrument.name));
            let result = fetch_series(source, instrument, from, to)
                .await
                .with_context(|| {
                    format!("Failed to fetch {} ({})", instrument.name, instrument.ticker)
                });
            pb.inc(1);
            result
        }
    });
    let results = join_all(tasks).await;

    progress_bar.finish_and_clear();

    let mut series = Vec::with_capacity(results.len());
    for result in results {
        let s = result?;
        if !s.is_empty() {
            series.push(s);
        }
    }
    Ok(series)
}
