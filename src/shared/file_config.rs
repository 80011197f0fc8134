use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::shared::analytics::DEFAULT_DATE_LABEL_FORMAT;
use crate::shared::error::{Result, WbsError};
use crate::shared::hierarchy::ColumnMapping;

/// Default location of the configuration file.
pub const CONFIG_FILE: &str = ".wbs.toml";

/// Configuration loaded from .wbs.toml file
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Where project documents and the activity log live
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Relative paths resolve against `data_dir`.
    #[serde(default = "default_activity_log")]
    pub activity_log: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            activity_log: default_activity_log(),
        }
    }
}

impl StorageConfig {
    pub fn activity_log_path(&self) -> PathBuf {
        if self.activity_log.is_absolute() {
            self.activity_log.clone()
        } else {
            self.data_dir.join(&self.activity_log)
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_activity_log() -> PathBuf {
    PathBuf::from("activity_log.json")
}

/// CSV import settings (`[import]` and `[import.columns]`)
#[derive(Debug, Default, Deserialize)]
pub struct ImportConfig {
    /// Extra chrono formats for planned dates, e.g. "%d/%m/%Y"
    #[serde(default)]
    pub date_formats: Vec<String>,
    #[serde(default)]
    pub columns: ColumnMapping,
}

#[derive(Debug, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_date_label_format")]
    pub date_label_format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            date_label_format: default_date_label_format(),
        }
    }
}

fn default_date_label_format() -> String {
    DEFAULT_DATE_LABEL_FORMAT.to_string()
}

/// UI configuration
#[derive(Debug, Deserialize)]
pub struct UiConfig {
    /// Colored terminal output (default: true)
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

fn default_true() -> bool {
    true
}

impl FileConfig {
    /// Load configuration from a specific path
    /// Returns default config if file doesn't exist
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| WbsError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| WbsError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject strftime patterns chrono cannot render.
    pub fn validate(&self) -> Result<()> {
        let label = &self.report.date_label_format;
        if StrftimeItems::new(label).any(|item| matches!(item, Item::Error)) {
            return Err(WbsError::Config(format!(
                "invalid report.date_label_format: {label:?}"
            )));
        }
        Ok(())
    }
}
