//! Configuration file support
//!
//! Loads merge configuration from TOML files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{GroupingConfig, MergeConfig, OutputConfig};
use crate::error::{MergeError, Result};
use crate::grouping::grouper::DEFAULT_SIMILARITY_THRESHOLD;
use crate::grouping::GroupingPolicy;

/// Configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Input settings
    pub input: InputSettings,
    /// Grouping settings
    pub grouping: GroupingSettings,
    /// Output settings
    pub output: OutputSettings,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSettings {
    /// Directory to process
    pub directory: Option<PathBuf>,
    /// Audio file extensions
    pub extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingSettings {
    /// exact_tag or similarity
    pub policy: GroupingPolicy,
    /// Title similarity threshold
    pub similarity_threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Encoder bitrate in bps
    pub bitrate: Option<u64>,
    /// Replace existing output files
    pub overwrite_existing: Option<bool>,
    /// Plan only
    pub dry_run: Option<bool>,
    /// JSON run report path
    pub report_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| MergeError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| MergeError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        Self {
            input: InputSettings {
                directory: None,
                extensions: Some(vec!["mp3".to_string()]),
            },
            grouping: GroupingSettings {
                policy: GroupingPolicy::ExactTag,
                similarity_threshold: Some(DEFAULT_SIMILARITY_THRESHOLD),
            },
            output: OutputSettings {
                bitrate: None,
                overwrite_existing: Some(true),
                dry_run: Some(false),
                report_path: None,
            },
            logging: Some(LoggingSettings {
                level: "info".to_string(),
                format: Some("pretty".to_string()),
            }),
        }
    }

    /// Convert to MergeConfig
    pub fn into_merge_config(self) -> MergeConfig {
        let defaults = MergeConfig::default();
        MergeConfig {
            directory: self.input.directory,
            extensions: self.input.extensions.unwrap_or(defaults.extensions),
            grouping: GroupingConfig {
                policy: self.grouping.policy,
                similarity_threshold: self
                    .grouping
                    .similarity_threshold
                    .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD),
            },
            output: OutputConfig {
                bitrate: self.output.bitrate,
                overwrite_existing: self.output.overwrite_existing.unwrap_or(true),
                dry_run: self.output.dry_run.unwrap_or(false),
                report_path: self.output.report_path,
            },
            log_level: self
                .logging
                .as_ref()
                .map(|l| l.level.clone())
                .unwrap_or(defaults.log_level),
            log_format: self
                .logging
                .and_then(|l| l.format)
                .unwrap_or(defaults.log_format),
        }
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let config = ConfigFile::default_config();
    config.to_file(path)?;
    Ok(())
}
