//! Merge orchestration
//!
//! A run has two phases. Planning lists the directory, groups, validates and
//! names every group; it touches nothing and gives the same plan for the same
//! listing. Execution hands each planned merge to the concatenator. A failing
//! group never stops the run.

use std::path::{Path, PathBuf};

use crate::config::MergeConfig;
use crate::error::{MergeError, Result};
use crate::grouping::{group_files, FileRef, GroupKey};
use crate::index::scan_directory;
use crate::naming::{synthesize_name, EpisodeCounter};
use crate::sequence::{validate_group, ValidationFailure};
use crate::transcode::AudioConcatenator;

use super::report::{GroupOutcome, RunReport};

/// One merge the executor will perform
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedMerge {
    pub key: GroupKey,
    /// Canonical base name, without extension
    pub name: String,
    /// Sources in part order
    pub sources: Vec<PathBuf>,
    pub output: PathBuf,
}

/// A group that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedGroup {
    pub key: GroupKey,
    pub files: Vec<PathBuf>,
    pub reason: ValidationFailure,
}

/// Per-group decision, in group order
#[derive(Debug, Clone, PartialEq)]
pub enum PlanEntry {
    Merge(PlannedMerge),
    Skip(SkippedGroup),
}

/// Everything a run will do, decided before any file is written
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    pub directory: PathBuf,
    pub entries: Vec<PlanEntry>,
}

impl MergePlan {
    pub fn merges(&self) -> impl Iterator<Item = &PlannedMerge> {
        self.entries.iter().filter_map(|e| match e {
            PlanEntry::Merge(m) => Some(m),
            PlanEntry::Skip(_) => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SkippedGroup> {
        self.entries.iter().filter_map(|e| match e {
            PlanEntry::Skip(s) => Some(s),
            PlanEntry::Merge(_) => None,
        })
    }
}

/// Drives planning and execution for one directory
pub struct MergeOrchestrator<C: AudioConcatenator> {
    config: MergeConfig,
    concatenator: C,
}

impl<C: AudioConcatenator> MergeOrchestrator<C> {
    pub fn new(config: MergeConfig, concatenator: C) -> Self {
        Self {
            config,
            concatenator,
        }
    }

    pub fn concatenator(&self) -> &C {
        &self.concatenator
    }

    /// Decide what to merge in `directory`.
    ///
    /// Fallback episode numbers are handed out here, in group order, from a
    /// counter that lives for this call only.
    pub fn plan(&self, directory: &Path) -> Result<MergePlan> {
        let paths = scan_directory(directory, &self.config.extensions)?;
        let files: Vec<FileRef> = paths.into_iter().map(FileRef::from_path).collect();

        let grouping = &self.config.grouping;
        let groups = group_files(files, grouping.policy, grouping.similarity_threshold);
        tracing::debug!(
            "{} group(s) in {:?} by {}",
            groups.len(),
            directory,
            grouping.policy
        );

        let mut counter = EpisodeCounter::new();
        let mut entries = Vec::with_capacity(groups.len());

        for group in groups {
            match validate_group(&group) {
                Ok(sequence) => {
                    let first = sequence.first();
                    let name = synthesize_name(&first.stem, &mut counter);
                    let output = directory.join(output_file_name(&name, first));
                    tracing::debug!(
                        "Group {}: {} part(s) -> {:?}",
                        sequence.key,
                        sequence.files.len(),
                        output
                    );
                    entries.push(PlanEntry::Merge(PlannedMerge {
                        key: sequence.key,
                        name,
                        sources: sequence.files.into_iter().map(|f| f.path).collect(),
                        output,
                    }));
                }
                Err(reason) => {
                    let err = MergeError::Validation {
                        group: group.key.to_string(),
                        reason: reason.clone(),
                    };
                    tracing::warn!("{}, skipping", err);
                    entries.push(PlanEntry::Skip(SkippedGroup {
                        key: group.key,
                        files: group.files.into_iter().map(|f| f.path).collect(),
                        reason,
                    }));
                }
            }
        }

        Ok(MergePlan {
            directory: directory.to_path_buf(),
            entries,
        })
    }

    /// Carry out a plan, appending one outcome per group to `report`.
    pub fn execute(&self, plan: &MergePlan, report: &mut RunReport) {
        for entry in &plan.entries {
            let outcome = match entry {
                PlanEntry::Merge(merge) => self.execute_merge(merge),
                PlanEntry::Skip(skip) => skipped_outcome(skip),
            };
            report.push(outcome);
        }
    }

    fn execute_merge(&self, merge: &PlannedMerge) -> GroupOutcome {
        if merge.sources.contains(&merge.output) {
            let err = MergeError::DestinationIsSource(merge.output.clone());
            tracing::error!("Group {}: {}", merge.key, err);
            return GroupOutcome::Failed {
                group: merge.key.clone(),
                output: merge.output.clone(),
                error: err.to_string(),
            };
        }

        if merge.output.exists() {
            if !self.config.output.overwrite_existing {
                tracing::warn!(
                    "Group {}: {:?} already exists, leaving it alone",
                    merge.key,
                    merge.output
                );
                return GroupOutcome::Skipped {
                    group: merge.key.clone(),
                    reason: format!("output {} already exists", merge.output.display()),
                };
            }
            tracing::warn!("Group {}: overwriting {:?}", merge.key, merge.output);
        }

        tracing::debug!(
            "Group {}: joining {} part(s) as {}",
            merge.key,
            merge.sources.len(),
            merge.name
        );
        match self.concatenator.concatenate(&merge.sources, &merge.output) {
            Ok(summary) => {
                tracing::info!(
                    samples = summary.samples_written,
                    "merged → {}",
                    merge.output.display()
                );
                GroupOutcome::Merged {
                    group: merge.key.clone(),
                    output: merge.output.clone(),
                    parts: summary.sources,
                    duration_secs: summary.duration_secs,
                }
            }
            Err(e) => {
                tracing::error!("Group {}: merge into {:?} failed: {}", merge.key, merge.output, e);
                GroupOutcome::Failed {
                    group: merge.key.clone(),
                    output: merge.output.clone(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Plan and, unless this is a dry run, execute.
    ///
    /// Only a missing directory or an unreadable listing fails the run.
    pub fn run(&self, directory: &Path) -> Result<RunReport> {
        let output = &self.config.output;
        let mut report = RunReport::new(directory, self.config.grouping.policy, output.dry_run);
        tracing::info!("Processing {:?}", directory);

        let plan = self.plan(directory)?;
        tracing::info!(
            merges = plan.merges().count(),
            skipped = plan.skipped().count(),
            "Planned {} group(s)",
            plan.entries.len()
        );
        if output.dry_run {
            for entry in &plan.entries {
                report.push(match entry {
                    PlanEntry::Merge(merge) => {
                        tracing::info!(
                            "would merge {} part(s) → {}",
                            merge.sources.len(),
                            merge.output.display()
                        );
                        GroupOutcome::Planned {
                            group: merge.key.clone(),
                            output: merge.output.clone(),
                            sources: merge.sources.clone(),
                        }
                    }
                    PlanEntry::Skip(skip) => skipped_outcome(skip),
                });
            }
        } else {
            self.execute(&plan, &mut report);
        }

        report.finish();
        report.log_summary();

        if let Some(path) = &output.report_path {
            match report.write_to(path) {
                Ok(()) => tracing::info!("Report written to {:?}", path),
                Err(e) => tracing::error!("Failed to write report {:?}: {}", path, e),
            }
        }
        Ok(report)
    }
}

fn skipped_outcome(skip: &SkippedGroup) -> GroupOutcome {
    tracing::debug!(
        "Group {}: leaving {} file(s) untouched",
        skip.key,
        skip.files.len()
    );
    GroupOutcome::Skipped {
        group: skip.key.clone(),
        reason: skip.reason.to_string(),
    }
}

/// Output file name: canonical name plus the first source's extension.
fn output_file_name(name: &str, first: &FileRef) -> String {
    match first.path.extension() {
        Some(ext) => format!("{}.{}", name, ext.to_string_lossy()),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name_keeps_extension() {
        let first = FileRef::from_path("/a/EpA Folge 012 Kapitel 1.MP3");
        assert_eq!(output_file_name("012_EpA", &first), "012_EpA.MP3");
    }

    #[test]
    fn test_output_file_name_without_extension() {
        let first = FileRef::from_path("/a/EpA Folge 012 Kapitel 1");
        assert_eq!(output_file_name("012_EpA", &first), "012_EpA");
    }

    #[test]
    fn test_plan_accessors() {
        let plan = MergePlan {
            directory: PathBuf::from("/a"),
            entries: vec![
                PlanEntry::Skip(SkippedGroup {
                    key: GroupKey::Tag(1),
                    files: vec![PathBuf::from("/a/x Folge 1 Teil 2.mp3")],
                    reason: ValidationFailure::NoStart { first: 2 },
                }),
                PlanEntry::Merge(PlannedMerge {
                    key: GroupKey::Tag(2),
                    name: "002_x".to_string(),
                    sources: vec![],
                    output: PathBuf::from("/a/002_x.mp3"),
                }),
            ],
        };
        assert_eq!(plan.merges().count(), 1);
        assert_eq!(plan.skipped().next().map(|s| &s.key), Some(&GroupKey::Tag(1)));
    }
}
