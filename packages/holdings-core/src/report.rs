//! Dashboard report: every metric for one set of user-selected parameters.
//!
//! Parameter errors stop the report. Metric errors are recorded per metric, so
//! a degenerate Gini or volatility never hides the mean or the top-N table.

use crate::config::Settings;
use crate::stats::risk_score;
use crate::types::{Field, MetricOutcome, Portfolio, TopSelection};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User-adjustable controls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardParams {
    /// Field to rank, average and filter on
    pub category: Field,
    /// Number of holdings in the top table
    pub top_n: usize,
    /// Upper-bound filter; defaults to the configured quantile of `category`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
}

impl DashboardParams {
    pub fn new(category: &str, top_n: usize) -> Self {
        Self {
            category: Field::parse(category),
            top_n,
            upper_bound: None,
        }
    }

    /// Set an explicit upper-bound filter.
    pub fn with_upper_bound(mut self, upper_bound: f64) -> Self {
        self.upper_bound = Some(upper_bound);
        self
    }

    /// Check the controls against the configured bounds.
    pub fn validate(&self, settings: &Settings) -> Result<()> {
        let display = &settings.display;
        if !(display.top_n_min..=display.top_n_max).contains(&self.top_n) {
            return Err(Error::InvalidParameter(format!(
                "top_n must be within {}..={}, got {}",
                display.top_n_min, display.top_n_max, self.top_n
            )));
        }
        if let Some(bound) = self.upper_bound {
            if !bound.is_finite() {
                return Err(Error::InvalidParameter(format!(
                    "upper bound must be finite, got {}",
                    bound
                )));
            }
        }
        Ok(())
    }
}

/// Everything a presentation layer needs to render one dashboard state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub generated_at: DateTime<Utc>,
    pub category: Field,
    pub holding_count: usize,
    pub total_valuation: f64,
    /// Mean of `category` over all holdings
    pub mean: MetricOutcome,
    /// Threshold applied to `category`
    pub upper_bound: MetricOutcome,
    /// Holdings with `category <= upper_bound`
    pub filtered_count: usize,
    /// Mean of `category` over the filtered holdings
    pub filtered_mean: MetricOutcome,
    /// Pearson correlation of valuation and share percent
    pub correlation: MetricOutcome,
    pub gini: MetricOutcome,
    pub volatility: MetricOutcome,
    /// Advisory only, not a calibrated risk model
    pub risk_score: MetricOutcome,
    pub top: TopSelection,
    pub headline: String,
}

/// Compute the full report for a portfolio.
pub fn build_report(
    portfolio: &Portfolio,
    params: &DashboardParams,
    settings: &Settings,
) -> Result<PortfolioReport> {
    params.validate(settings)?;
    let category = &params.category;
    // An unknown category is a request error, not a metric error
    portfolio.values(category)?;

    let upper_bound: Result<f64> = match params.upper_bound {
        Some(bound) => Ok(bound),
        None => portfolio.quantile(category, settings.display.upper_quantile),
    };
    let (filtered_count, filtered_mean) = match &upper_bound {
        Ok(bound) => {
            let filtered = portfolio.with_upper_bound(category, *bound)?;
            (filtered.len(), filtered.mean(category).into())
        }
        Err(e) => (
            0,
            MetricOutcome::from(Err(Error::InsufficientData(format!(
                "no upper bound: {}",
                e
            )))),
        ),
    };

    let gini = portfolio.gini();
    let volatility = portfolio.volatility(settings.risk.estimator);
    let score = match (&gini, &volatility) {
        (Ok(g), Ok(v)) => Ok(risk_score(*g, *v, &settings.risk)),
        (Err(e), _) | (_, Err(e)) => Err(Error::InsufficientData(format!(
            "risk score unavailable: {}",
            e
        ))),
    };

    let top = portfolio.top_n(category, params.top_n)?;
    let headline = headline(&top, category, portfolio.len());

    tracing::debug!(
        category = %category,
        holdings = portfolio.len(),
        filtered = filtered_count,
        "Built dashboard report"
    );

    Ok(PortfolioReport {
        generated_at: Utc::now(),
        category: category.clone(),
        holding_count: portfolio.len(),
        total_valuation: portfolio.total_valuation(),
        mean: portfolio.mean(category).into(),
        upper_bound: upper_bound.into(),
        filtered_count,
        filtered_mean,
        correlation: portfolio
            .correlation(&Field::Valuation, &Field::SharePercent)
            .into(),
        gini: gini.into(),
        volatility: volatility.into(),
        risk_score: score.into(),
        top,
        headline,
    })
}

fn headline(top: &TopSelection, category: &Field, total: usize) -> String {
    match top.holdings.first() {
        Some(leader) => format!(
            "Highest {} is {} at {}; the top {} of {} hold {:.1}% of total valuation",
            category,
            leader.name,
            format_value(leader.value(category).unwrap_or_default()),
            top.holdings.len(),
            total,
            top.weight_share * 100.0
        ),
        None => format!("No holdings with {} to summarize", category),
    }
}

/// Format with thousands separators, keeping up to four decimals.
fn format_value(value: f64) -> String {
    let rendered = format!("{:.4}", value.abs());
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Holding;
    use approx::assert_relative_eq;

    fn portfolio() -> Portfolio {
        Portfolio::new(vec![
            Holding::new("Samsung", 5000.0, 7.3),
            Holding::new("SK Hynix", 2000.0, 7.0),
            Holding::new("Naver", 1000.0, 8.9),
            Holding::new("Kakao", 500.0, 6.1),
            Holding::new("LG Chem", 1500.0, 7.5),
        ])
    }

    #[test]
    fn test_full_report() {
        let settings = Settings::default();
        let params = DashboardParams::new("valuation", 5);
        let report = build_report(&portfolio(), &params, &settings).unwrap();

        assert_eq!(report.holding_count, 5);
        assert_eq!(report.total_valuation, 10000.0);
        assert_relative_eq!(report.mean.value.unwrap(), 2000.0);
        assert!(report.gini.is_ok());
        assert!(report.volatility.is_ok());
        assert!(report.risk_score.is_ok());
        assert_eq!(report.top.holdings[0].name, "Samsung");
        assert!(report.headline.starts_with("Highest valuation is Samsung at 5,000"));
    }

    #[test]
    fn test_default_upper_bound_is_quantile() {
        let settings = Settings::default();
        let report =
            build_report(&portfolio(), &DashboardParams::new("valuation", 5), &settings).unwrap();

        // sorted [500, 1000, 1500, 2000, 5000], position 3.8
        assert_relative_eq!(report.upper_bound.value.unwrap(), 4400.0, epsilon = 1e-9);
        assert_eq!(report.filtered_count, 4);
        assert_relative_eq!(report.filtered_mean.value.unwrap(), 1250.0);
    }

    #[test]
    fn test_explicit_upper_bound_at_max_is_noop() {
        let settings = Settings::default();
        let params = DashboardParams::new("valuation", 5).with_upper_bound(5000.0);
        let report = build_report(&portfolio(), &params, &settings).unwrap();

        assert_eq!(report.filtered_count, 5);
        assert_eq!(report.filtered_mean, report.mean);
    }

    #[test]
    fn test_single_holding_reports_metrics_independently() {
        let single = Portfolio::new(vec![Holding::new("Samsung", 5000.0, 7.3)]);
        let report = build_report(
            &single,
            &DashboardParams::new("valuation", 5),
            &Settings::default(),
        )
        .unwrap();

        assert!(report.mean.is_ok());
        assert!(!report.gini.is_ok());
        assert!(!report.volatility.is_ok());
        assert!(!report.risk_score.is_ok());
        assert!(!report.correlation.is_ok());
        assert_eq!(report.top.holdings.len(), 1);
    }

    #[test]
    fn test_empty_portfolio_report() {
        let report = build_report(
            &Portfolio::default(),
            &DashboardParams::new("valuation", 10),
            &Settings::default(),
        )
        .unwrap();

        assert!(!report.mean.is_ok());
        assert!(!report.upper_bound.is_ok());
        assert!(!report.filtered_mean.is_ok());
        assert!(report.top.holdings.is_empty());
        assert_eq!(report.headline, "No holdings with valuation to summarize");
    }

    #[test]
    fn test_parameter_errors_stop_the_report() {
        let settings = Settings::default();

        let too_many = DashboardParams::new("valuation", 31);
        assert!(matches!(
            build_report(&portfolio(), &too_many, &settings),
            Err(Error::InvalidParameter(_))
        ));

        let unknown = DashboardParams::new("ESTP", 10);
        assert!(matches!(
            build_report(&portfolio(), &unknown, &settings),
            Err(Error::MissingColumn(_))
        ));

        let nan = DashboardParams::new("valuation", 10).with_upper_bound(f64::NAN);
        assert!(matches!(
            build_report(&portfolio(), &nan, &settings),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1234567.0), "1,234,567");
        assert_eq!(format_value(999.0), "999");
        assert_eq!(format_value(0.125), "0.125");
        assert_eq!(format_value(-4200.5), "-4,200.5");
    }
}
