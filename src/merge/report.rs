//! Run report
//!
//! One outcome per group, in group order. Persisted as JSON when a report
//! path is configured.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{MergeError, Result};
use crate::grouping::{GroupKey, GroupingPolicy};

/// What happened to one group
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupOutcome {
    /// Sources were concatenated into `output`
    Merged {
        group: GroupKey,
        output: PathBuf,
        parts: usize,
        duration_secs: f64,
    },
    /// Dry run: the merge that would have happened
    Planned {
        group: GroupKey,
        output: PathBuf,
        sources: Vec<PathBuf>,
    },
    /// Not merged, files left untouched
    Skipped { group: GroupKey, reason: String },
    /// The merge was attempted and failed
    Failed {
        group: GroupKey,
        output: PathBuf,
        error: String,
    },
}

/// Record of one directory run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub directory: PathBuf,
    pub policy: GroupingPolicy,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcomes: Vec<GroupOutcome>,
}

impl RunReport {
    pub fn new(directory: &Path, policy: GroupingPolicy, dry_run: bool) -> Self {
        Self {
            directory: directory.to_path_buf(),
            policy,
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: GroupOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn merged(&self) -> usize {
        self.count(|o| matches!(o, GroupOutcome::Merged { .. }))
    }

    pub fn planned(&self) -> usize {
        self.count(|o| matches!(o, GroupOutcome::Planned { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, GroupOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, GroupOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&GroupOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }

    pub fn log_summary(&self) {
        if self.dry_run {
            tracing::info!(
                planned = self.planned(),
                skipped = self.skipped(),
                "Dry run finished for {:?}",
                self.directory
            );
        } else {
            tracing::info!(
                merged = self.merged(),
                skipped = self.skipped(),
                failed = self.failed(),
                "Run finished for {:?}",
                self.directory
            );
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| MergeError::Report(format!("serialize: {}", e)))?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
