//! Directory merge runs
//!
//! Ties scanning, grouping, validation and naming together and feeds the
//! resulting plan to an [`AudioConcatenator`](crate::transcode::AudioConcatenator).

pub mod orchestrator;
pub mod report;

pub use orchestrator::{MergeOrchestrator, MergePlan, PlanEntry, PlannedMerge, SkippedGroup};
pub use report::{GroupOutcome, RunReport};
