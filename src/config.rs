//! Dashboard settings, read from an optional TOML file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::aggregate::LABEL_THRESHOLD;
use crate::error::Result;
use crate::finance::DEFAULT_BUDGET_TARGET;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory holding flights.csv, drones.csv, projects.csv, finance.csv
    pub data_dir: PathBuf,
    /// Monthly expense target for the finance snapshot
    pub budget_target: f64,
    /// Distribution shares below this are flagged label-suppressed
    pub label_threshold: f64,
    /// Trailing window used when no dates are given
    pub default_window_days: i64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_dir: PathBuf::from("data"),
            budget_target: DEFAULT_BUDGET_TARGET,
            label_threshold: LABEL_THRESHOLD,
            default_window_days: 90,
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = DashboardConfig::from_toml_str("budget_target = 12000.0\n").unwrap();
        assert_eq!(config.budget_target, 12000.0);
        assert_eq!(config.label_threshold, 0.08);
        assert_eq!(config.default_window_days, 90);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(DashboardConfig::from_toml_str("budget_target = \"lots\"").is_err());
    }
}
