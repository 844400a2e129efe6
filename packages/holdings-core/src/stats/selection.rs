//! Top-N selection.

use crate::types::{Field, Portfolio, TopSelection};
use crate::{Error, Result};

/// Select the `n` holdings with the largest `key`.
///
/// Ties keep input order. The source portfolio is left untouched and the
/// selected holdings keep the weights they have in the full portfolio.
pub fn top_n(portfolio: &Portfolio, key: &Field, n: usize) -> Result<TopSelection> {
    if n == 0 {
        return Err(Error::InvalidParameter(
            "Top-N count must be at least 1".to_string(),
        ));
    }

    let values = portfolio.values(key)?;
    let mut order: Vec<usize> = (0..values.len()).collect();
    // sort_by is stable, so equal keys stay in input order
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order.truncate(n);

    let holdings: Vec<_> = order
        .into_iter()
        .map(|i| portfolio.holdings()[i].clone())
        .collect();
    let weight_share: f64 = holdings.iter().map(|h| h.weight).sum();

    Ok(TopSelection {
        key: key.clone(),
        holdings,
        weight_share,
    })
}

impl Portfolio {
    /// See [`top_n`].
    pub fn top_n(&self, key: &Field, n: usize) -> Result<TopSelection> {
        top_n(self, key, n)
    }
}
