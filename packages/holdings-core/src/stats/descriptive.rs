//! Descriptive statistics: mean, standard deviation, Pearson correlation, quantiles.

use crate::types::{Field, Portfolio};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Standard deviation estimator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Estimator {
    /// Divide by `n - 1`
    #[default]
    Sample,
    /// Divide by `n`
    Population,
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::InsufficientData(
            "Mean requires at least one value".to_string(),
        ));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation. Fewer than two values is degenerate for either estimator.
pub fn std_dev(values: &[f64], estimator: Estimator) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::InsufficientData(
            "Standard deviation requires data".to_string(),
        ));
    }
    if values.len() < 2 {
        return Err(Error::DegenerateInput(
            "Standard deviation requires at least 2 data points".to_string(),
        ));
    }

    let n = values.len() as f64;
    let m = mean(values)?;
    let sum_sq = values.iter().map(|v| (v - m).powi(2)).sum::<f64>();
    let divisor = match estimator {
        Estimator::Sample => n - 1.0,
        Estimator::Population => n,
    };

    Ok((sum_sq / divisor).sqrt())
}

/// Pearson correlation coefficient of two equally long series.
pub fn correlation(xs: &[f64], ys: &[f64]) -> Result<f64> {
    if xs.len() != ys.len() {
        return Err(Error::InvalidParameter(format!(
            "Series lengths differ: {} vs {}",
            xs.len(),
            ys.len()
        )));
    }
    if xs.is_empty() {
        return Err(Error::InsufficientData(
            "Correlation requires data".to_string(),
        ));
    }
    if xs.len() < 2 {
        return Err(Error::DegenerateInput(
            "Correlation requires at least 2 data points".to_string(),
        ));
    }

    let mean_x = mean(xs)?;
    let mean_y = mean(ys)?;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return Err(Error::DegenerateInput(
            "Correlation is undefined for a constant series".to_string(),
        ));
    }

    Ok(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Quantile with linear interpolation between closest ranks.
///
/// `q = 0.5` is the median; `q = 0.95` the usual default upper-bound filter.
pub fn quantile(values: &[f64], q: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&q) {
        return Err(Error::InvalidParameter(format!(
            "Quantile must be within [0, 1], got {}",
            q
        )));
    }
    if values.is_empty() {
        return Err(Error::InsufficientData(
            "Quantile requires at least one value".to_string(),
        ));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

impl Portfolio {
    /// Mean of a field across all holdings.
    pub fn mean(&self, field: &Field) -> Result<f64> {
        mean(&self.values(field)?)
    }

    /// Standard deviation of a field.
    pub fn std_dev(&self, field: &Field, estimator: Estimator) -> Result<f64> {
        std_dev(&self.values(field)?, estimator)
    }

    /// Pearson correlation between two fields.
    pub fn correlation(&self, field_a: &Field, field_b: &Field) -> Result<f64> {
        correlation(&self.values(field_a)?, &self.values(field_b)?)
    }

    /// Quantile of a field.
    pub fn quantile(&self, field: &Field, q: f64) -> Result<f64> {
        quantile(&self.values(field)?, q)
    }
}
