//! Volatility and the blended risk score.
//!
//! The score is an advisory heuristic, not a calibrated risk model:
//!
//! ```text
//! risk_score = gini * gini_weight + min(volatility, volatility_cap)
//! ```
//!
//! With the default weights (70 and 30) the score lies in `[0, 100]`.

use super::descriptive::{std_dev, Estimator};
use crate::config::RiskSettings;
use crate::types::{Field, Portfolio, RiskSummary};
use crate::Result;

/// Standard deviation of share percentages.
pub fn volatility(share_percents: &[f64], estimator: Estimator) -> Result<f64> {
    std_dev(share_percents, estimator)
}

/// Blend concentration and volatility into a single score.
///
/// The volatility term is capped so one extreme outlier cannot dominate.
pub fn risk_score(gini: f64, volatility: f64, settings: &RiskSettings) -> f64 {
    gini * settings.gini_weight + volatility.min(settings.volatility_cap)
}

impl Portfolio {
    /// Standard deviation of `share_percent` across holdings.
    pub fn volatility(&self, estimator: Estimator) -> Result<f64> {
        volatility(&self.values(&Field::SharePercent)?, estimator)
    }

    /// Compute gini, volatility and the risk score in one go.
    ///
    /// Fails if either input metric fails; use the individual methods to
    /// report them separately.
    pub fn risk_summary(&self, settings: &RiskSettings) -> Result<RiskSummary> {
        let gini = self.gini()?;
        let volatility = self.volatility(settings.estimator)?;

        tracing::debug!(gini, volatility, "Computed risk inputs");

        Ok(RiskSummary {
            gini,
            volatility,
            risk_score: risk_score(gini, volatility, settings),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Holding;
    use crate::Error;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_equal_portfolio_scores_zero() {
        let portfolio = Portfolio::new(vec![
            Holding::new("A", 100.0, 10.0),
            Holding::new("B", 100.0, 10.0),
            Holding::new("C", 100.0, 10.0),
        ]);

        let summary = portfolio.risk_summary(&RiskSettings::default()).unwrap();
        assert_eq!(summary.gini, 0.0);
        assert_eq!(summary.volatility, 0.0);
        assert_eq!(summary.risk_score, 0.0);
    }

    #[test]
    fn test_two_holding_summary() {
        let portfolio = Portfolio::new(vec![
            Holding::new("A", 900.0, 5.0),
            Holding::new("B", 100.0, 95.0),
        ]);

        let summary = portfolio.risk_summary(&RiskSettings::default()).unwrap();
        assert_relative_eq!(summary.gini, 0.8, epsilon = 1e-12);
        // sample std-dev of [5, 95] = 90 / sqrt(2)
        assert_relative_eq!(summary.volatility, 90.0 / 2.0_f64.sqrt(), epsilon = 1e-9);
        // volatility capped at 30
        assert_relative_eq!(summary.risk_score, 0.8 * 70.0 + 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_single_holding_is_degenerate() {
        let portfolio = Portfolio::new(vec![Holding::new("A", 1.0, 100.0)]);
        let result = portfolio.risk_summary(&RiskSettings::default());
        assert!(matches!(result, Err(Error::DegenerateInput(_))));
    }

    #[test]
    fn test_custom_weights() {
        let settings = RiskSettings {
            gini_weight: 50.0,
            volatility_cap: 10.0,
            ..Default::default()
        };
        assert_relative_eq!(risk_score(0.5, 4.0, &settings), 29.0);
        assert_relative_eq!(risk_score(0.5, 40.0, &settings), 35.0);
    }

    proptest! {
        #[test]
        fn prop_monotone_in_gini(a in 0.0..1.0f64, b in 0.0..1.0f64, vol in 0.0..100.0f64) {
            let settings = RiskSettings::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(risk_score(lo, vol, &settings) <= risk_score(hi, vol, &settings));
        }

        #[test]
        fn prop_monotone_in_volatility(g in 0.0..1.0f64, a in 0.0..100.0f64, b in 0.0..100.0f64) {
            let settings = RiskSettings::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(risk_score(g, lo, &settings) <= risk_score(g, hi, &settings));
        }

        #[test]
        fn prop_constant_beyond_cap(g in 0.0..1.0f64, a in 30.0..1000.0f64, b in 30.0..1000.0f64) {
            let settings = RiskSettings::default();
            prop_assert_eq!(risk_score(g, a, &settings), risk_score(g, b, &settings));
        }

        #[test]
        fn prop_bounded(g in 0.0..=1.0f64, vol in 0.0..1000.0f64) {
            let score = risk_score(g, vol, &RiskSettings::default());
            prop_assert!((0.0..=100.0).contains(&score));
        }
    }
}
