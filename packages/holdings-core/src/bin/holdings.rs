//! Holdings CLI - dashboard computations from the command line.
//!
//! Prints JSON responses on stdout; logs go to stderr (`RUST_LOG` to adjust).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use holdings_core::{
    loader::{build_portfolio, load_portfolio, RawTable, Schema},
    report::{build_report, DashboardParams},
    ApiResponse, Field, MetricOutcome, Portfolio, Settings,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "holdings")]
#[command(about = "Holdings CLI - summary statistics, concentration and risk scoring")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to HOLDINGS_CONFIG_FILE or the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List headers with the detected name and type columns
    Columns {
        /// CSV file
        file: PathBuf,
    },
    /// Full dashboard report for a holdings table
    Summary {
        /// CSV file
        file: PathBuf,
        /// Valuation column
        #[arg(short, long)]
        valuation: String,
        /// Share percent column (derived from weights if omitted)
        #[arg(short, long)]
        share: Option<String>,
        /// Name column (detected if omitted)
        #[arg(long)]
        name: Option<String>,
        /// Field to rank and filter on
        #[arg(short, long, default_value = "valuation")]
        category: String,
        /// Number of holdings to show
        #[arg(short = 'n', long)]
        top_n: Option<usize>,
        /// Upper-bound filter (defaults to the configured quantile)
        #[arg(short, long)]
        max: Option<f64>,
    },
    /// MBTI-by-country dashboard for one type
    Mbti {
        /// CSV file
        file: PathBuf,
        /// MBTI type column, e.g. INTJ
        #[arg(short = 't', long = "type")]
        mbti_type: String,
        /// Number of countries to show
        #[arg(short = 'n', long)]
        top_n: Option<usize>,
        /// Upper-bound filter (defaults to the configured quantile)
        #[arg(short, long)]
        max: Option<f64>,
    },
    /// Descriptive statistics for one field
    Stats {
        /// CSV file
        file: PathBuf,
        /// Valuation column
        #[arg(short, long)]
        valuation: String,
        /// Share percent column
        #[arg(short, long)]
        share: Option<String>,
        /// Field to describe
        #[arg(short, long, default_value = "valuation")]
        field: String,
        /// Second field for Pearson correlation
        #[arg(short, long)]
        against: Option<String>,
        /// Quantile to report (0-1)
        #[arg(short, long)]
        quantile: Option<f64>,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(data) => {
            println!("{}", render(&ApiResponse::ok(data)));
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            println!("{}", render(&ApiResponse::<()>::err(format!("{:#}", e))));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Value> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from_path(path),
        None => Settings::load(),
    }
    .context("failed to load settings")?;

    match cli.command {
        Commands::Columns { file } => handle_columns(file, &settings),
        Commands::Summary {
            file,
            valuation,
            share,
            name,
            category,
            top_n,
            max,
        } => {
            let mut schema = Schema::holdings(&valuation, share.as_deref());
            if let Some(name) = name {
                schema = schema.with_name_column(&name);
            }
            let portfolio = load_portfolio(&file, &schema, &settings.input)
                .with_context(|| format!("failed to load {}", file.display()))?;
            let params = dashboard_params(&category, top_n, max, &settings);
            Ok(serde_json::to_value(build_report(&portfolio, &params, &settings)?)?)
        }
        Commands::Mbti {
            file,
            mbti_type,
            top_n,
            max,
        } => handle_mbti(file, &mbti_type, top_n, max, &settings),
        Commands::Stats {
            file,
            valuation,
            share,
            field,
            against,
            quantile,
        } => {
            let schema = Schema::holdings(&valuation, share.as_deref());
            let portfolio = load_portfolio(&file, &schema, &settings.input)
                .with_context(|| format!("failed to load {}", file.display()))?;
            handle_stats(&portfolio, &field, against.as_deref(), quantile, &settings)
        }
    }
}

fn handle_columns(file: PathBuf, settings: &Settings) -> Result<Value> {
    let table = RawTable::read(&file, &settings.input)
        .with_context(|| format!("failed to read {}", file.display()))?;
    Ok(json!({
        "headers": table.headers,
        "name_column": table.name_column(),
        "type_columns": table.type_columns(),
        "rows": table.rows.len(),
    }))
}

fn handle_mbti(
    file: PathBuf,
    mbti_type: &str,
    top_n: Option<usize>,
    max: Option<f64>,
    settings: &Settings,
) -> Result<Value> {
    let table = RawTable::read(&file, &settings.input)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let schema = Schema::mbti(&table.type_columns(), mbti_type)?;
    let portfolio = build_portfolio(&table, &schema)?;

    let params = dashboard_params(&schema.valuation_column, top_n, max, settings);
    Ok(serde_json::to_value(build_report(&portfolio, &params, settings)?)?)
}

fn handle_stats(
    portfolio: &Portfolio,
    field: &str,
    against: Option<&str>,
    quantile: Option<f64>,
    settings: &Settings,
) -> Result<Value> {
    let field = Field::parse(field);
    let mut stats = json!({
        "field": field,
        "count": portfolio.len(),
        "mean": MetricOutcome::from(portfolio.mean(&field)),
        "std_dev": MetricOutcome::from(
            portfolio.std_dev(&field, settings.risk.estimator)
        ),
    });

    if let Some(q) = quantile {
        stats["quantile"] = json!({
            "q": q,
            "result": MetricOutcome::from(portfolio.quantile(&field, q)),
        });
    }
    if let Some(other) = against {
        let other = Field::parse(other);
        stats["correlation"] = json!({
            "against": other,
            "result": MetricOutcome::from(portfolio.correlation(&field, &other)),
        });
    }

    Ok(stats)
}

fn dashboard_params(
    category: &str,
    top_n: Option<usize>,
    max: Option<f64>,
    settings: &Settings,
) -> DashboardParams {
    let params = DashboardParams::new(category, top_n.unwrap_or(settings.display.top_n_default));
    match max {
        Some(bound) => params.with_upper_bound(bound),
        None => params,
    }
}

fn render<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string_pretty(response)
        .unwrap_or_else(|e| format!("{{\"ok\":false,\"error\":\"{}\"}}", e))
}
