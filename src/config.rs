//! Configuration file support for ferro-varload.
//!
//! Settings are read from a `.ferro-varload.toml` file and can be overridden
//! by CLI flags.
//!
//! # Example Configuration
//!
//! ```toml
//! [pipeline]
//! grouping = "adjacent"
//! order-check = "strict"
//!
//! [output]
//! format = "bulk"
//! index = "clinvar_hg38"
//! ```
//!
//! # Config File Locations
//!
//! Configuration is searched in this order (first found wins):
//! 1. `.ferro-varload.toml` in current directory
//! 2. `~/.config/ferro/varload.toml`

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::clinvar::OrderCheck;
use crate::error::VarloadError;

/// How rows with the same canonical ID are brought together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingMode {
    /// Stream; requires the input sorted so equal IDs are contiguous
    #[default]
    Adjacent,
    /// Buffer everything and group by ID; any input order
    Materialized,
}

impl FromStr for GroupingMode {
    type Err = VarloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "adjacent" => Ok(Self::Adjacent),
            "materialized" => Ok(Self::Materialized),
            other => Err(VarloadError::config(format!(
                "unknown grouping '{}': expected adjacent or materialized",
                other
            ))),
        }
    }
}

/// Serialized document layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One `{"_id": ..., "clinvar": ...}` object per line
    #[default]
    Jsonl,
    /// Bulk-API NDJSON: an `index` action line followed by the source line
    Bulk,
}

impl FromStr for OutputFormat {
    type Err = VarloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" | "json" => Ok(Self::Jsonl),
            "bulk" => Ok(Self::Bulk),
            other => Err(VarloadError::config(format!(
                "unknown output format '{}': expected jsonl or bulk",
                other
            ))),
        }
    }
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PipelineConfig {
    pub grouping: GroupingMode,
    pub order_check: OrderCheck,
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Index name written into bulk action lines.
    pub index: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            index: "clinvar".to_string(),
        }
    }
}

/// Parsed configuration from a .ferro-varload.toml file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VarloadConfig {
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
}

impl VarloadConfig {
    /// Load configuration from the default locations, if any exists.
    pub fn load() -> Result<Option<Self>, VarloadError> {
        let cwd_config = PathBuf::from(".ferro-varload.toml");
        if cwd_config.exists() {
            return Self::load_from_path(&cwd_config).map(Some);
        }

        if let Some(home) = dirs_home() {
            let home_config = home.join(".config").join("ferro").join("varload.toml");
            if home_config.exists() {
                return Self::load_from_path(&home_config).map(Some);
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, VarloadError> {
        let content = fs::read_to_string(path).map_err(|e| VarloadError::Io {
            msg: format!("Failed to read config {}: {}", path.display(), e),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML content.
    pub fn parse(content: &str) -> Result<Self, VarloadError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply CLI overrides. `None` keeps the file value.
    pub fn merge_with_cli(
        mut self,
        grouping: Option<&str>,
        order_check: Option<&str>,
        format: Option<&str>,
        index: Option<&str>,
    ) -> Result<Self, VarloadError> {
        if let Some(grouping) = grouping {
            self.pipeline.grouping = grouping.parse()?;
        }
        if let Some(order_check) = order_check {
            self.pipeline.order_check = order_check.parse()?;
        }
        if let Some(format) = format {
            self.output.format = format.parse()?;
        }
        if let Some(index) = index {
            self.output.index = index.to_string();
        }
        Ok(self)
    }
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
