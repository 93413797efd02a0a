//! # Index Compare Analytics Engine
//!
//! This crate turns raw daily price series into the derived tables that the
//! comparison tool charts, tabulates and exports.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of data
//!   sources, terminals or files. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `TimeSeriesAnalyzer` takes a `PriceSeries`
//!   as input and produces fresh, immutable derived series as output. Running
//!   the same input twice yields the same output.
//!
//! ## Public API
//!
//! - `TimeSeriesAnalyzer`: normalization, cumulative return, daily returns,
//!   rolling volatility and summary statistics.
//! - `NormalizedSeries`, `CumulativeReturnSeries`, `DailyReturns`,
//!   `RollingVolatilitySeries`: the derived, date-indexed series.
//! - `SummaryRecord`, `InstrumentAnalysis`, `AnalysisReport`: the per-request results.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;
pub mod series;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{DEFAULT_VOLATILITY_WINDOW, TimeSeriesAnalyzer};
pub use error::AnalyticsError;
pub use report::{AnalysisReport, InstrumentAnalysis, SummaryRecord};
pub use series::{
    CumulativeReturnSeries, DailyReturns, DatedColumn, DerivedSeries, NormalizedSeries,
    Observation, RollingVolatilitySeries,
};
