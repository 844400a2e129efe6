//! Memoization of parsed portfolios keyed by file identity.

use super::{load_portfolio, Schema};
use crate::config::InputSettings;
use crate::types::Portfolio;
use crate::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SourceKey {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
    schema: Schema,
}

impl SourceKey {
    fn for_file(path: &Path, schema: &Schema) -> Result<Self> {
        let path = fs::canonicalize(path)?;
        let metadata = fs::metadata(&path)?;
        Ok(Self {
            path,
            len: metadata.len(),
            modified: metadata.modified().ok(),
            schema: schema.clone(),
        })
    }
}

/// Cache of parsed portfolios.
///
/// Only the parsed portfolio is kept; statistics are recomputed by callers on
/// every request. A file whose size or modification time changes is parsed
/// again and its stale entries are evicted.
#[derive(Debug, Default)]
pub struct PortfolioCache {
    entries: HashMap<SourceKey, Portfolio>,
    hits: u64,
    misses: u64,
}

impl PortfolioCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached portfolio for this file and schema, loading it if needed.
    pub fn get_or_load(
        &mut self,
        path: impl AsRef<Path>,
        schema: &Schema,
        input: &InputSettings,
    ) -> Result<&Portfolio> {
        let key = SourceKey::for_file(path.as_ref(), schema)?;

        if self.entries.contains_key(&key) {
            self.hits += 1;
            tracing::debug!("Portfolio cache hit for {}", key.path.display());
        } else {
            self.misses += 1;
            let portfolio = load_portfolio(&key.path, schema, input)?;
            self.entries
                .retain(|k, _| !(k.path == key.path && k.schema == key.schema));
            self.entries.insert(key.clone(), portfolio);
        }

        Ok(&self.entries[&key])
    }

    /// Number of cached portfolios.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that parsed the file.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drop every cached portfolio.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_second_load_is_a_hit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("holdings.csv");
        fs::write(&path, "name,value\nA,1\nB,3\n").unwrap();

        let mut cache = PortfolioCache::new();
        let schema = Schema::holdings("value", None);
        let input = InputSettings::default();

        assert_eq!(cache.get_or_load(&path, &schema, &input).unwrap().len(), 2);
        assert_eq!(cache.get_or_load(&path, &schema, &input).unwrap().len(), 2);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_changed_file_is_reloaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("holdings.csv");
        fs::write(&path, "name,value\nA,1\n").unwrap();

        let mut cache = PortfolioCache::new();
        let schema = Schema::holdings("value", None);
        let input = InputSettings::default();
        assert_eq!(cache.get_or_load(&path, &schema, &input).unwrap().len(), 1);

        fs::write(&path, "name,value\nA,1\nB,2\nC,3\n").unwrap();
        assert_eq!(cache.get_or_load(&path, &schema, &input).unwrap().len(), 3);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_schema_is_part_of_the_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mbti.csv");
        fs::write(&path, "Country,INTJ,ENFP\nKorea,0.04,0.09\n").unwrap();

        let mut cache = PortfolioCache::new();
        let input = InputSettings::default();
        let columns = vec!["ENFP".to_string(), "INTJ".to_string()];

        let intj = Schema::mbti(&columns, "INTJ").unwrap();
        let enfp = Schema::mbti(&columns, "ENFP").unwrap();
        let first = cache.get_or_load(&path, &intj, &input).unwrap().holdings()[0].valuation;
        let second = cache.get_or_load(&path, &enfp, &input).unwrap().holdings()[0].valuation;

        assert_eq!(first, 0.04);
        assert_eq!(second, 0.09);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let mut cache = PortfolioCache::new();
        let result = cache.get_or_load(
            dir.path().join("absent.csv"),
            &Schema::holdings("value", None),
            &InputSettings::default(),
        );
        assert!(matches!(result, Err(crate::Error::Io(_))));
        assert!(cache.is_empty());
    }
}
