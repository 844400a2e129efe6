//! Settings loaded from a TOML file.
//!
//! Default path: `<config dir>/holdings/config.toml`, overridden by the
//! `HOLDINGS_CONFIG_FILE` environment variable. A missing file yields defaults.

use crate::stats::Estimator;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// All configurable knobs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub display: DisplaySettings,
    pub risk: RiskSettings,
    pub input: InputSettings,
}

/// Bounds and defaults for the display controls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplaySettings {
    pub top_n_default: usize,
    pub top_n_min: usize,
    pub top_n_max: usize,
    /// Quantile used as the default upper-bound filter
    pub upper_quantile: f64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            top_n_default: 10,
            top_n_min: 5,
            top_n_max: 30,
            upper_quantile: 0.95,
        }
    }
}

/// Risk score weighting. The defaults reproduce the dashboard's ad hoc 70/30 blend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskSettings {
    pub gini_weight: f64,
    pub volatility_cap: f64,
    pub estimator: Estimator,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            gini_weight: 70.0,
            volatility_cap: 30.0,
            estimator: Estimator::Sample,
        }
    }
}

/// Input decoding options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputSettings {
    /// WHATWG label of the encoding tried after UTF-8
    pub fallback_encoding: String,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            fallback_encoding: "windows-949".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default path, falling back to defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Get the default settings file path.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("HOLDINGS_CONFIG_FILE") {
            return PathBuf::from(path);
        }

        directories::ProjectDirs::from("", "", "holdings")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("holdings.toml"))
    }

    /// Load settings from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        let display = &self.display;
        if display.top_n_min == 0 || display.top_n_min > display.top_n_max {
            return Err(Error::Config(format!(
                "top_n bounds must satisfy 1 <= min <= max, got {}..={}",
                display.top_n_min, display.top_n_max
            )));
        }
        if !(display.top_n_min..=display.top_n_max).contains(&display.top_n_default) {
            return Err(Error::Config(format!(
                "top_n_default {} outside {}..={}",
                display.top_n_default, display.top_n_min, display.top_n_max
            )));
        }
        if !(0.0..=1.0).contains(&display.upper_quantile) {
            return Err(Error::Config(format!(
                "upper_quantile must be within [0, 1], got {}",
                display.upper_quantile
            )));
        }
        if self.risk.gini_weight < 0.0 || self.risk.volatility_cap < 0.0 {
            return Err(Error::Config(
                "risk weights must be non-negative".to_string(),
            ));
        }
        if encoding_rs::Encoding::for_label(self.input.fallback_encoding.as_bytes()).is_none() {
            return Err(Error::Config(format!(
                "unknown fallback encoding: {}",
                self.input.fallback_encoding
            )));
        }
        Ok(())
    }
}
