use std::path::Path;

use serde::Deserialize;

use crate::dataset::{DETAIL_ARTIFACT_DELIMITER, DETAIL_REPLACEMENT};

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `CATALOG_LENS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_path")]
    pub path: String,
    #[serde(default = "default_detail_delimiter")]
    pub detail_delimiter: String,
    #[serde(default = "default_detail_replacement")]
    pub detail_replacement: String,
    /// JSON file holding a segment plan. The built-in plan is used when unset.
    #[serde(default)]
    pub plan_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,
    /// Rows shown in the rating-sorted listing of the text report.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub chart_dir: Option<String>,
    #[serde(default)]
    pub csv_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_color")]
    pub color: String,
    #[serde(default = "default_chart_opacity")]
    pub opacity: f64,
}

// Default functions
fn default_dataset_path() -> String {
    "etsy.json".to_string()
}
fn default_detail_delimiter() -> String {
    DETAIL_ARTIFACT_DELIMITER.to_string()
}
fn default_detail_replacement() -> String {
    DETAIL_REPLACEMENT.to_string()
}
fn default_top_n() -> usize {
    10
}
fn default_chart_color() -> String {
    "purple".to_string()
}
fn default_chart_opacity() -> f64 {
    0.8
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            detail_delimiter: default_detail_delimiter(),
            detail_replacement: default_detail_replacement(),
            plan_path: None,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::default(),
            top_n: default_top_n(),
            chart_dir: None,
            csv_dir: None,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            color: default_chart_color(),
            opacity: default_chart_opacity(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            report: ReportConfig::default(),
            chart: ChartConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional config file, then environment
    /// variables (which take precedence).
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("CATALOG_LENS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn validate(&self) -> crate::CatalogResult<()> {
        if !(0.0..=1.0).contains(&self.chart.opacity) {
            return Err(crate::CatalogError::Config(format!(
                "chart.opacity must be within 0..=1, got {}",
                self.chart.opacity
            )));
        }
        if self.report.top_n == 0 {
            return Err(crate::CatalogError::Config(
                "report.top_n must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
