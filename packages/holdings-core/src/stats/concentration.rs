//! Gini coefficient over portfolio weights.

use crate::types::Portfolio;
use crate::{Error, Result};

/// Gini coefficient of a weight distribution.
///
/// Weights are sorted ascending and `C_i` is the cumulative share up to `i`.
/// The coefficient is
///
/// ```text
/// gini = (n + 1 - 2 * Σ C_i) / (n - 1)
/// ```
///
/// which is the `(n - 1)`-normalised discrete Gini: equal weights give 0 and a
/// single holding owning everything gives 1. The sum is evaluated over
/// mirrored pairs of sorted weights so that equal weights cancel exactly.
/// The result is not clamped.
///
/// Weights are expected to sum to 1; any positive total is accepted and
/// normalised.
pub fn gini(weights: &[f64]) -> Result<f64> {
    let n = weights.len();
    if n <= 1 {
        return Err(Error::DegenerateInput(format!(
            "Gini requires at least 2 weights, got {}",
            n
        )));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(Error::DegenerateInput(
            "Gini weights must be finite and non-negative".to_string(),
        ));
    }

    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(Error::DegenerateInput(
            "Gini weights sum to zero".to_string(),
        ));
    }

    let mut sorted = weights.to_vec();
    sorted.sort_by(f64::total_cmp);

    // n + 1 - 2 Σ C_i == Σ (2i - n - 1) w_(i) for 1-based ascending i;
    // pair index k with n-1-k so equal weights contribute exactly zero.
    let numerator: f64 = (0..n / 2)
        .map(|k| (n - 1 - 2 * k) as f64 * (sorted[n - 1 - k] - sorted[k]))
        .sum();

    Ok(numerator / ((n - 1) as f64 * total))
}

impl Portfolio {
    /// Gini coefficient of the holding weights.
    pub fn gini(&self) -> Result<f64> {
        if self.is_empty() {
            return Err(Error::InsufficientData(
                "Portfolio has no holdings".to_string(),
            ));
        }
        gini(&self.weights())
    }
}
