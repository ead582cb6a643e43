//! Dashboard settings.
//!
//! Read from an optional `college_scope.json` in the working directory. Every
//! field has a default, so a missing file or a partial one is fine.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::filter::Sector;

/// File name looked up by [`DashboardConfig::discover`].
pub const CONFIG_FILE: &str = "college_scope.json";

/// Narrowest histogram bin accepted from the settings file.
const MIN_BIN_WIDTH: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Institution table loaded at start-up.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Rows shown in each benchmark ranking.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Bin width of the student/faculty ratio histogram.
    #[serde(default = "default_ratio_bin_width")]
    pub ratio_bin_width: f64,

    /// Correlation above which faculty qualification is called a driver of
    /// completion.
    #[serde(default = "default_correlation_threshold")]
    pub correlation_threshold: f64,

    /// Sector selector label applied at start-up.
    #[serde(default = "default_initial_sector")]
    pub initial_sector: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            top_n: default_top_n(),
            ratio_bin_width: default_ratio_bin_width(),
            correlation_threshold: default_correlation_threshold(),
            initial_sector: default_initial_sector(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("Kmeans_assignment_data.csv")
}

fn default_top_n() -> usize {
    10
}

fn default_ratio_bin_width() -> f64 {
    2.0
}

fn default_correlation_threshold() -> f64 {
    0.3
}

fn default_initial_sector() -> String {
    Sector::All.label().to_string()
}

impl DashboardConfig {
    /// Parse a JSON settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config.sanitized())
    }

    /// Settings from [`CONFIG_FILE`] in `dir`, or defaults.
    pub fn discover_in(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No {CONFIG_FILE} found, using defaults");
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded settings from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring settings file: {e:#}");
                Self::default()
            }
        }
    }

    /// Settings from the working directory.
    pub fn discover() -> Self {
        Self::discover_in(Path::new("."))
    }

    fn sanitized(mut self) -> Self {
        if self.top_n == 0 {
            self.top_n = default_top_n();
        }
        if !(self.ratio_bin_width.is_finite() && self.ratio_bin_width >= MIN_BIN_WIDTH) {
            self.ratio_bin_width = default_ratio_bin_width();
        }
        self
    }
}
