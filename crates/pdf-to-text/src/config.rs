//! Configuration for the extraction pipeline

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{ExtractionMode, FailurePolicy};

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Extraction defaults and file naming
    pub extraction: ExtractionConfig,
    /// Batch behaviour
    pub batch: BatchConfig,
    /// Table detection tolerances
    pub tables: TableConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ExtractConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            Error::Config(message) => Error::config(format!("{}: {}", path.display(), message)),
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, else the default location if present, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// `<config dir>/pdf-to-text/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pdf-to-text").join("config.toml"))
    }

    fn validate(&self) -> Result<()> {
        if self.extraction.input_extension.trim_start_matches('.').is_empty() {
            return Err(Error::config("extraction.input_extension must not be empty"));
        }
        if self.extraction.output_extension.trim_start_matches('.').is_empty() {
            return Err(Error::config("extraction.output_extension must not be empty"));
        }
        if self.tables.min_rows == 0 || self.tables.min_columns < 2 {
            return Err(Error::config(
                "tables.min_rows must be at least 1 and tables.min_columns at least 2",
            ));
        }
        Ok(())
    }
}

/// Extraction defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Mode used when the caller does not pick one
    pub default_mode: ExtractionMode,
    /// Extension of documents picked up by batches (matched case-insensitively)
    pub input_extension: String,
    /// Extension of batch output files
    pub output_extension: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_mode: ExtractionMode::TextOnly,
            input_extension: "pdf".to_string(),
            output_extension: "txt".to_string(),
        }
    }
}

/// Batch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Abort on the first failing document or keep going
    pub failure_policy: FailurePolicy,
    /// Create the destination folder when it does not exist
    pub create_output_dir: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Abort,
            create_output_dir: true,
        }
    }
}

/// Tolerances for the positional table detector, in PDF points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Fragments whose baselines differ by at most this much share a row
    pub row_tolerance: f32,
    /// Cell start positions within this distance share a column
    pub column_tolerance: f32,
    /// Horizontal gap that separates two cells on the same row
    pub cell_gap: f32,
    /// Consecutive multi-cell rows needed to call a block a table
    pub min_rows: usize,
    /// Distinct columns needed to call a block a table
    pub min_columns: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            row_tolerance: 2.0,
            column_tolerance: 8.0,
            cell_gap: 12.0,
            min_rows: 2,
            min_columns: 2,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "pdf_to_text=info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractConfig::default();
        assert_eq!(config.extraction.input_extension, "pdf");
        assert_eq!(config.extraction.output_extension, "txt");
        assert_eq!(config.batch.failure_policy, FailurePolicy::Abort);
        assert!(config.batch.create_output_dir);
    }

    #[test]
    fn test_partial_toml() {
        let config = ExtractConfig::from_toml(
            r#"
            [extraction]
            default_mode = "both"

            [batch]
            failure_policy = "continue"
            "#,
        )
        .unwrap();

        assert_eq!(config.extraction.default_mode, ExtractionMode::Both);
        assert_eq!(config.extraction.input_extension, "pdf");
        assert_eq!(config.batch.failure_policy, FailurePolicy::Continue);
        assert_eq!(config.tables, TableConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ExtractConfig::from_toml("[extraction]\noutput_extension = \"\"").is_err());
        assert!(ExtractConfig::from_toml("[tables]\nmin_columns = 1").is_err());
        assert!(ExtractConfig::from_toml("[batch]\nfailure_policy = \"retry\"").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[logging]\nfilter = \"pdf_to_text=debug\"\n").unwrap();

        let config = ExtractConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.logging.filter, "pdf_to_text=debug");

        let missing = ExtractConfig::from_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(Error::Config(_))));
    }
}
