//! CSV export of comparison results.
//!
//! Everything here serializes values produced by `analytics`; nothing is
//! recomputed.

use analytics::AnalysisReport;
use std::fs;
use std::path::{Path, PathBuf};

pub mod error;
pub mod summary;
pub mod table;

pub use error::ExportError;
pub use summary::{SUMMARY_HEADER, summary_cells, summary_csv};
pub use table::WideTable;

pub const SUMMARY_FILE: &str = "performance_summary.csv";
pub const NORMALIZED_FILE: &str = "index_data.csv";
pub const CUMULATIVE_FILE: &str = "cumulative_returns.csv";
pub const VOLATILITY_FILE: &str = "rolling_volatility.csv";

/// Writes `contents` to `path`, creating parent directories as needed.
pub fn write_to_file(path: impl AsRef<Path>, contents: &str) -> Result<(), ExportError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

/// Writes the summary and the three date-indexed tables into `dir`.
///
/// Returns the paths written, in a stable order.
pub fn export_report(
    dir: impl AsRef<Path>,
    report: &AnalysisReport,
) -> Result<Vec<PathBuf>, ExportError> {
    let dir = dir.as_ref();
    let files = [
        (SUMMARY_FILE, summary_csv(&report.summaries())?),
        (
            NORMALIZED_FILE,
            WideTable::from_columns(&report.normalized()).to_csv()?,
        ),
        (
            CUMULATIVE_FILE,
            WideTable::from_columns(&report.cumulative_returns()).to_csv()?,
        ),
        (
            VOLATILITY_FILE,
            WideTable::from_columns(&report.rolling_volatility()).to_csv()?,
        ),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, contents) in files {
        let path = dir.join(name);
        write_to_file(&path, &contents)?;
        written.push(path);
    }
    Ok(written)
}
