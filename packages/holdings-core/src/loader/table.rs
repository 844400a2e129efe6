//! Raw comma-separated tables with trimmed headers.

use super::encoding::decode;
use crate::config::InputSettings;
use crate::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// A decoded table: header row plus text cells, nothing converted yet.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Read and decode a CSV file.
    pub fn read(path: impl AsRef<Path>, input: &InputSettings) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let text = decode(&bytes, &input.fallback_encoding)?;
        let table = Self::parse(&text)?;

        tracing::debug!(
            "Read {} rows x {} columns from {}",
            table.rows.len(),
            table.headers.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse CSV text. Rows may be ragged; short rows surface as missing cells.
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(Error::FileFormat("table has no header row".to_string()));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Position of a header.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        let name = name.trim();
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Headers that look like MBTI type codes: exactly four ASCII letters.
    pub fn type_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self
            .headers
            .iter()
            .filter(|h| h.chars().count() == 4 && h.chars().all(|c| c.is_ascii_alphabetic()))
            .cloned()
            .collect();
        columns.sort();
        columns
    }

    /// The first header mentioning "country", otherwise the first header.
    pub fn name_column(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.to_lowercase().contains("country"))
            .or_else(|| self.headers.first())
            .map(String::as_str)
    }
}
