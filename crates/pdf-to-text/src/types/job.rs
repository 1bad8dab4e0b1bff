//! Job descriptors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Error;

/// Which content kinds to extract
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Page text only
    #[default]
    TextOnly,
    /// Page tables only
    TablesOnly,
    /// Text followed by tables, per page
    Both,
}

impl ExtractionMode {
    pub fn wants_text(&self) -> bool {
        matches!(self, ExtractionMode::TextOnly | ExtractionMode::Both)
    }

    pub fn wants_tables(&self) -> bool {
        matches!(self, ExtractionMode::TablesOnly | ExtractionMode::Both)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExtractionMode::TextOnly => "Text Only",
            ExtractionMode::TablesOnly => "Tables Only",
            ExtractionMode::Both => "Both",
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExtractionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "text" | "textonly" => Ok(Self::TextOnly),
            "tables" | "tablesonly" => Ok(Self::TablesOnly),
            "both" => Ok(Self::Both),
            _ => Err(Error::config(format!(
                "unknown extraction mode '{}' (expected text, tables or both)",
                s
            ))),
        }
    }
}

/// What a batch does when one document fails
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failing document; earlier outputs stay on disk
    #[default]
    Abort,
    /// Record the failure and move on to the next document
    Continue,
}

/// Extract one document and hand the rendered content back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleJob {
    pub source: PathBuf,
    pub mode: ExtractionMode,
}

impl SingleJob {
    pub fn new(source: impl Into<PathBuf>, mode: ExtractionMode) -> Self {
        Self {
            source: source.into(),
            mode,
        }
    }
}

/// Extract every document in a folder, one output file each
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub source_dir: PathBuf,
    pub mode: ExtractionMode,
    pub output_dir: PathBuf,
    pub failure_policy: FailurePolicy,
}

impl BatchJob {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        mode: ExtractionMode,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            mode,
            output_dir: output_dir.into(),
            failure_policy: FailurePolicy::default(),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Output path for a source document: `<output_dir>/<stem>.<extension>`
    pub fn output_path_for(&self, source: &Path, extension: &str) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| "document".into());
        let mut name = stem;
        name.push(".");
        name.push(extension.trim_start_matches('.'));
        self.output_dir.join(name)
    }
}
