//! Holdings Core - summary statistics and risk scoring for holdings dashboards.
//!
//! This crate provides the computation behind the holdings and MBTI-by-country
//! dashboards:
//!
//! - **Loading**: CSV decoding (UTF-8 or CP949), column detection, numeric cleaning
//! - **Descriptive statistics**: mean, Pearson correlation, quantiles, standard deviation
//! - **Concentration**: Gini coefficient over portfolio weights
//! - **Risk**: volatility and an advisory blended risk score
//! - **Selection**: stable top-N selection with aggregate weight share
//!
//! # Example
//!
//! ```rust,no_run
//! use holdings_core::loader::{load_portfolio, Schema};
//! use holdings_core::report::{build_report, DashboardParams};
//! use holdings_core::Settings;
//!
//! let settings = Settings::default();
//! let schema = Schema::holdings("평가액", Some("지분율"));
//! let portfolio = load_portfolio("nps_holdings.csv", &schema, &settings.input)?;
//!
//! let params = DashboardParams::new("valuation", 10);
//! let report = build_report(&portfolio, &params, &settings)?;
//! println!("{}", report.headline);
//! # Ok::<(), holdings_core::Error>(())
//! ```

pub mod config;
pub mod loader;
pub mod report;
pub mod stats;
pub mod types;

pub use config::Settings;
pub use types::{
    ApiResponse, Field, Holding, MetricOutcome, Portfolio, RiskSummary, TopSelection,
};

pub use stats::{
    correlation, gini, mean, quantile, risk_score, std_dev, top_n, Estimator,
};

/// Error types for holdings-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File format error: {0}")]
    FileFormat(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for holdings-core operations.
pub type Result<T> = std::result::Result<T, Error>;
