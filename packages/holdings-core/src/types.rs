//! Core data types for holdings analysis.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One row of the dataset: a single invested instrument or category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    /// Instrument or country name
    pub name: String,
    /// Valuation in currency units (never negative)
    pub valuation: f64,
    /// Ownership share in percent (0-100)
    pub share_percent: f64,
    /// Fraction of total portfolio valuation, set when the portfolio is built
    pub weight: f64,
    /// Additional declared numeric columns, keyed by header
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, f64>,
}

impl Holding {
    /// Create a holding. The weight stays zero until it joins a [`Portfolio`].
    pub fn new(name: &str, valuation: f64, share_percent: f64) -> Self {
        Self {
            name: name.trim().to_string(),
            valuation,
            share_percent,
            weight: 0.0,
            attributes: BTreeMap::new(),
        }
    }

    /// Attach an extra numeric attribute.
    pub fn with_attribute(mut self, column: &str, value: f64) -> Self {
        self.attributes.insert(column.to_string(), value);
        self
    }

    /// Read the value of a field, `None` if the attribute is absent.
    pub fn value(&self, field: &Field) -> Option<f64> {
        match field {
            Field::Valuation => Some(self.valuation),
            Field::SharePercent => Some(self.share_percent),
            Field::Weight => Some(self.weight),
            Field::Attribute(column) => self.attributes.get(column).copied(),
        }
    }
}

/// A numeric field of a [`Holding`] addressable by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Field {
    Valuation,
    SharePercent,
    Weight,
    Attribute(String),
}

impl Field {
    /// Parse a field name. Anything that is not a built-in field names an attribute column.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "valuation" | "value" => Field::Valuation,
            "share_percent" | "share" => Field::SharePercent,
            "weight" => Field::Weight,
            _ => Field::Attribute(name.trim().to_string()),
        }
    }
}

impl From<String> for Field {
    fn from(name: String) -> Self {
        Field::parse(&name)
    }
}

impl From<Field> for String {
    fn from(field: Field) -> Self {
        field.to_string()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Valuation => write!(f, "valuation"),
            Field::SharePercent => write!(f, "share_percent"),
            Field::Weight => write!(f, "weight"),
            Field::Attribute(column) => write!(f, "{}", column),
        }
    }
}

/// An ordered collection of holdings with derived weights.
///
/// Weights are recomputed every time a portfolio is built, so a filtered
/// subset always carries weights relative to its own total.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Portfolio {
    holdings: Vec<Holding>,
    total_valuation: f64,
}

impl Portfolio {
    /// Build a portfolio, assigning `weight = valuation / total_valuation`.
    pub fn new(mut holdings: Vec<Holding>) -> Self {
        let total_valuation: f64 = holdings.iter().map(|h| h.valuation).sum();
        for holding in &mut holdings {
            holding.weight = if total_valuation > 0.0 {
                holding.valuation / total_valuation
            } else {
                0.0
            };
        }
        Self {
            holdings,
            total_valuation,
        }
    }

    /// Build a portfolio whose `share_percent` is taken from the weight (`weight * 100`).
    ///
    /// Used for tables that carry no explicit share column.
    pub fn with_derived_shares(holdings: Vec<Holding>) -> Self {
        let mut portfolio = Self::new(holdings);
        for holding in &mut portfolio.holdings {
            holding.share_percent = holding.weight * 100.0;
        }
        portfolio
    }

    /// Holdings in input order.
    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// Sum of all valuations.
    pub fn total_valuation(&self) -> f64 {
        self.total_valuation
    }

    /// Number of holdings.
    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Weights in input order.
    pub fn weights(&self) -> Vec<f64> {
        self.holdings.iter().map(|h| h.weight).collect()
    }

    /// Values of a field in input order.
    ///
    /// Fails with [`Error::MissingColumn`] if any holding lacks the attribute.
    pub fn values(&self, field: &Field) -> Result<Vec<f64>> {
        self.holdings
            .iter()
            .map(|h| {
                h.value(field)
                    .ok_or_else(|| Error::MissingColumn(field.to_string()))
            })
            .collect()
    }

    /// Build a subset of the holdings matching a predicate.
    pub fn filter<P>(&self, predicate: P) -> Portfolio
    where
        P: Fn(&Holding) -> bool,
    {
        Portfolio::new(
            self.holdings
                .iter()
                .filter(|h| predicate(h))
                .cloned()
                .collect(),
        )
    }

    /// Build the subset with `field <= threshold`.
    pub fn with_upper_bound(&self, field: &Field, threshold: f64) -> Result<Portfolio> {
        if threshold.is_nan() {
            return Err(Error::InvalidParameter(
                "Upper bound must be a number".to_string(),
            ));
        }
        // Missing column is an error, not an empty subset
        self.values(field)?;
        Ok(self.filter(|h| h.value(field).map(|v| v <= threshold).unwrap_or(false)))
    }

    /// Largest value of a field.
    pub fn max(&self, field: &Field) -> Result<f64> {
        self.values(field)?
            .into_iter()
            .reduce(f64::max)
            .ok_or_else(|| Error::InsufficientData("Portfolio has no holdings".to_string()))
    }
}

/// Concentration and volatility figures for one request. Never cached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RiskSummary {
    /// Gini coefficient of the weights (0 = equal, 1 = fully concentrated)
    pub gini: f64,
    /// Standard deviation of share percent
    pub volatility: f64,
    /// Advisory blended score (0-100), not a calibrated risk model
    pub risk_score: f64,
}

/// The largest holdings by some key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopSelection {
    /// Field used for ranking
    pub key: Field,
    /// Selected holdings, largest key first
    pub holdings: Vec<Holding>,
    /// Sum of the selected holdings' weights
    pub weight_share: f64,
}

/// Outcome of a single metric, reported independently of the others.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MetricOutcome {
    pub fn is_ok(&self) -> bool {
        self.value.is_some()
    }
}

impl From<Result<f64>> for MetricOutcome {
    fn from(result: Result<f64>) -> Self {
        match result {
            Ok(value) => Self {
                value: Some(value),
                error: None,
            },
            Err(e) => Self {
                value: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// API response wrapper for CLI output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> Portfolio {
        Portfolio::new(vec![
            Holding::new("Samsung", 600.0, 7.0),
            Holding::new("SK Hynix", 300.0, 6.5),
            Holding::new("Naver", 100.0, 8.0),
        ])
    }

    #[test]
    fn test_holding_new_trims_name() {
        let holding = Holding::new("  Kakao ", 10.0, 5.0);
        assert_eq!(holding.name, "Kakao");
        assert_eq!(holding.weight, 0.0);
        assert!(holding.attributes.is_empty());
    }

    #[test]
    fn test_portfolio_weights_sum_to_one() {
        let portfolio = sample();
        assert_eq!(portfolio.total_valuation(), 1000.0);
        assert_relative_eq!(portfolio.weights().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(portfolio.holdings()[0].weight, 0.6);
    }

    #[test]
    fn test_zero_total_leaves_zero_weights() {
        let portfolio = Portfolio::new(vec![
            Holding::new("A", 0.0, 1.0),
            Holding::new("B", 0.0, 2.0),
        ]);
        assert_eq!(portfolio.weights(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_derived_shares() {
        let portfolio = Portfolio::with_derived_shares(vec![
            Holding::new("A", 75.0, 0.0),
            Holding::new("B", 25.0, 0.0),
        ]);
        assert_relative_eq!(portfolio.holdings()[0].share_percent, 75.0);
        assert_relative_eq!(portfolio.holdings()[1].share_percent, 25.0);
    }

    #[test]
    fn test_filter_recomputes_weights_without_mutating_source() {
        let portfolio = sample();
        let subset = portfolio.filter(|h| h.valuation < 500.0);

        assert_eq!(subset.len(), 2);
        assert_eq!(subset.total_valuation(), 400.0);
        assert_relative_eq!(subset.holdings()[0].weight, 0.75);
        assert_eq!(portfolio.len(), 3);
        assert_relative_eq!(portfolio.holdings()[1].weight, 0.3);
    }

    #[test]
    fn test_with_upper_bound_missing_attribute() {
        let portfolio = sample();
        let result = portfolio.with_upper_bound(&Field::parse("INTJ"), 1.0);
        assert!(matches!(result, Err(Error::MissingColumn(_))));
    }

    #[test]
    fn test_field_parse_and_display() {
        assert_eq!(Field::parse("Valuation"), Field::Valuation);
        assert_eq!(Field::parse("share"), Field::SharePercent);
        assert_eq!(Field::parse(" ENFP "), Field::Attribute("ENFP".to_string()));
        assert_eq!(Field::SharePercent.to_string(), "share_percent");

        let json = serde_json::to_string(&Field::Weight).unwrap();
        assert_eq!(json, "\"weight\"");
    }

    #[test]
    fn test_max_of_empty_portfolio() {
        let result = Portfolio::default().max(&Field::Valuation);
        assert!(matches!(result, Err(Error::InsufficientData(_))));
    }

    #[test]
    fn test_metric_outcome_from_result() {
        let ok: MetricOutcome = Ok(1.5).into();
        assert!(ok.is_ok());
        assert_eq!(ok.value, Some(1.5));

        let err: MetricOutcome = Err(Error::DegenerateInput("one point".to_string())).into();
        assert!(!err.is_ok());
        assert_eq!(err.error.as_deref(), Some("Degenerate input: one point"));
    }

    #[test]
    fn test_api_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test".to_string());
        assert!(response.ok);
        assert_eq!(response.data, Some("test".to_string()));

        let err_response: ApiResponse<String> = ApiResponse::err("error");
        assert!(!err_response.ok);
        assert_eq!(err_response.error, Some("error".to_string()));
    }
}
