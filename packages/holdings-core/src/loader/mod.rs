//! Portfolio loading.
//!
//! Turns a decoded [`RawTable`] into a [`Portfolio`] according to a [`Schema`]
//! naming the required numeric columns. Rows where any required column fails
//! numeric conversion are dropped; a table with no usable rows yields an empty
//! portfolio rather than an error. Attribute columns are optional per row.

mod cache;
mod encoding;
mod table;

pub use cache::PortfolioCache;
pub use encoding::decode;
pub use table::RawTable;

use crate::config::InputSettings;
use crate::types::{Holding, Portfolio};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Column mapping from a table to holdings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schema {
    /// Name column; detected when `None`
    pub name_column: Option<String>,
    /// Column read as valuation
    pub valuation_column: String,
    /// Column read as share percent; derived from weights when `None`
    pub share_column: Option<String>,
    /// Extra numeric columns carried as attributes; a cell that fails
    /// conversion is left out of that holding's attributes
    pub attribute_columns: Vec<String>,
}

impl Schema {
    /// Holdings table: a valuation column and optionally a share column.
    pub fn holdings(valuation_column: &str, share_column: Option<&str>) -> Self {
        Self {
            name_column: None,
            valuation_column: valuation_column.trim().to_string(),
            share_column: share_column.map(|s| s.trim().to_string()),
            attribute_columns: Vec::new(),
        }
    }

    /// MBTI-by-country table: the selected type is the valuation, every type
    /// column is kept as an attribute.
    ///
    /// The selection matches headers case-insensitively and the schema keeps the
    /// header's own spelling.
    pub fn mbti(type_columns: &[String], selected: &str) -> Result<Self> {
        let selected = selected.trim();
        let Some(column) = type_columns
            .iter()
            .find(|c| c.eq_ignore_ascii_case(selected))
        else {
            return Err(Error::MissingColumn(format!(
                "{} is not a detected type column (available: {})",
                selected,
                type_columns.join(", ")
            )));
        };
        Ok(Self {
            name_column: None,
            valuation_column: column.clone(),
            share_column: None,
            attribute_columns: type_columns.to_vec(),
        })
    }

    /// Use an explicit name column instead of detection.
    pub fn with_name_column(mut self, column: &str) -> Self {
        self.name_column = Some(column.trim().to_string());
        self
    }

    /// Every numeric column that must convert for a row to be kept.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns = vec![self.valuation_column.as_str()];
        columns.extend(self.share_column.as_deref());
        columns
    }
}

/// Read a CSV file and build a portfolio.
pub fn load_portfolio(
    path: impl AsRef<Path>,
    schema: &Schema,
    input: &InputSettings,
) -> Result<Portfolio> {
    let table = RawTable::read(path, input)?;
    build_portfolio(&table, schema)
}

/// Build a portfolio from a decoded table.
pub fn build_portfolio(table: &RawTable, schema: &Schema) -> Result<Portfolio> {
    let name_column = match &schema.name_column {
        Some(column) => column.as_str(),
        None => table
            .name_column()
            .ok_or_else(|| Error::MissingColumn("name".to_string()))?,
    };
    let name_idx = table.column_index(name_column)?;
    let valuation_idx = table.column_index(&schema.valuation_column)?;
    let share_idx = schema
        .share_column
        .as_deref()
        .map(|c| table.column_index(c))
        .transpose()?;
    let attribute_idx = schema
        .attribute_columns
        .iter()
        .map(|c| table.column_index(c).map(|idx| (c.as_str(), idx)))
        .collect::<Result<Vec<_>>>()?;

    let mut holdings = Vec::with_capacity(table.rows.len());
    let mut dropped = 0usize;

    for row in &table.rows {
        let cell = |idx: usize| row.get(idx).map(String::as_str);

        let Some(name) = cell(name_idx) else {
            dropped += 1;
            continue;
        };
        let Some(valuation) = cell(valuation_idx).and_then(parse_number) else {
            dropped += 1;
            continue;
        };
        if valuation < 0.0 {
            dropped += 1;
            continue;
        }
        let share_percent = match share_idx {
            Some(idx) => match cell(idx).and_then(parse_number) {
                Some(value) if (0.0..=100.0).contains(&value) => value,
                _ => {
                    dropped += 1;
                    continue;
                }
            },
            None => 0.0,
        };

        let mut holding = Holding::new(name, valuation, share_percent);
        for &(column, idx) in &attribute_idx {
            if let Some(value) = cell(idx).and_then(parse_number) {
                holding = holding.with_attribute(column, value);
            }
        }
        holdings.push(holding);
    }

    if dropped > 0 {
        tracing::warn!(
            "Dropped {} of {} rows with invalid {:?}",
            dropped,
            table.rows.len(),
            schema.required_columns()
        );
    }
    tracing::debug!("Loaded {} holdings", holdings.len());

    Ok(match schema.share_column {
        Some(_) => Portfolio::new(holdings),
        None => Portfolio::with_derived_shares(holdings),
    })
}

/// Convert a cell to a finite number.
///
/// Accepts surrounding whitespace, thousands separators and a trailing `%`.
pub fn parse_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
