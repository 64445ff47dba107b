//! Merge configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{MergeError, Result};
use crate::grouping::grouper::DEFAULT_SIMILARITY_THRESHOLD;
use crate::grouping::GroupingPolicy;

/// Grouping configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupingConfig {
    /// How files are clustered into episodes
    pub policy: GroupingPolicy,

    /// Minimum title similarity (exclusive) for the similarity policy
    pub similarity_threshold: f64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            policy: GroupingPolicy::ExactTag,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OutputConfig {
    /// Encoder bitrate in bps, the first source's bitrate when unset
    pub bitrate: Option<u64>,

    /// Replace an existing output file (with a warning)
    pub overwrite_existing: bool,

    /// Plan and log, but write nothing
    pub dry_run: bool,

    /// Where to write the JSON run report
    pub report_path: Option<PathBuf>,
}

/// Merge configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergeConfig {
    /// Directory to process; prompted for when unset
    pub directory: Option<PathBuf>,

    /// File extensions considered audio input (case-insensitive)
    pub extensions: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format (pretty, json)
    pub log_format: String,

    /// Grouping configuration
    pub grouping: GroupingConfig,

    /// Output configuration
    pub output: OutputConfig,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            directory: None,
            extensions: vec!["mp3".to_string()],
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            grouping: GroupingConfig::default(),
            output: OutputConfig {
                overwrite_existing: true,
                ..Default::default()
            },
        }
    }
}

impl MergeConfig {
    /// Reject settings no run can work with.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.grouping.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(MergeError::Config(format!(
                "similarity threshold must lie in [0, 1], got {}",
                threshold
            )));
        }
        if self.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(MergeError::Config(
                "at least one input extension is required".to_string(),
            ));
        }
        Ok(())
    }
}
