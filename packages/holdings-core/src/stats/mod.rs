//! Statistics over portfolios.
//!
//! Provides descriptive statistics, Gini concentration, the blended risk score
//! and top-N selection. Every function is pure: inputs are borrowed and never
//! mutated.

mod concentration;
mod descriptive;
mod risk;
mod selection;

pub use concentration::gini;
pub use descriptive::{correlation, mean, quantile, std_dev, Estimator};
pub use risk::{risk_score, volatility};
pub use selection::top_n;
