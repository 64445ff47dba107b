//! End-to-end integration tests
//!
//! Whole directory runs against the recording concatenator, plus one run
//! through FFmpeg on generated WAV parts.

use std::path::PathBuf;

use crate::config::MergeConfig;
use crate::error::MergeError;
use crate::grouping::{GroupKey, GroupingPolicy};
use crate::integration::fixtures::{episode_dir, names, write_wav, RecordingConcatenator};
use crate::merge::{
    GroupOutcome, MergeOrchestrator, MergePlan, PlanEntry, PlannedMerge, RunReport,
};
use crate::sequence::ValidationFailure;
use crate::transcode::FfmpegConcatenator;

fn orchestrator(config: MergeConfig) -> MergeOrchestrator<RecordingConcatenator> {
    MergeOrchestrator::new(config, RecordingConcatenator::new())
}

fn similarity_config() -> MergeConfig {
    let mut config = MergeConfig::default();
    config.grouping.policy = GroupingPolicy::Similarity;
    config
}

#[test]
fn test_single_episode_merged_in_part_order() {
    let dir = episode_dir(&[
        "EpA Folge 012 Kapitel 3.mp3",
        "EpA Folge 012 Kapitel 1.mp3",
        "EpA Folge 012 Kapitel 2.mp3",
    ]);
    let orch = orchestrator(MergeConfig::default());
    let report = orch.run(dir.path()).unwrap();

    let calls = orch.concatenator().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        names(&calls[0].sources),
        vec![
            "EpA Folge 012 Kapitel 1.mp3",
            "EpA Folge 012 Kapitel 2.mp3",
            "EpA Folge 012 Kapitel 3.mp3",
        ]
    );
    assert_eq!(calls[0].destination, dir.path().join("012_EpA.mp3"));
    assert!(dir.path().join("012_EpA.mp3").exists());

    assert_eq!(report.merged(), 1);
    assert_eq!(
        report.outcomes[0],
        GroupOutcome::Merged {
            group: GroupKey::Tag(12),
            output: dir.path().join("012_EpA.mp3"),
            parts: 3,
            duration_secs: 0.0,
        }
    );
}

#[test]
fn test_parts_ordered_numerically_not_by_name() {
    let files: Vec<String> = (1..=11)
        .map(|n| format!("Hörspiel Folge 3 Teil {}.mp3", n))
        .collect();
    let refs: Vec<&str> = files.iter().map(|s| s.as_str()).collect();
    let dir = episode_dir(&refs);

    let plan = orchestrator(MergeConfig::default()).plan(dir.path()).unwrap();
    let merge = plan.merges().next().unwrap();
    assert_eq!(merge.name, "003_Hoerspiel");
    assert_eq!(names(&merge.sources)[1], "Hörspiel Folge 3 Teil 2.mp3");
    assert_eq!(names(&merge.sources)[10], "Hörspiel Folge 3 Teil 11.mp3");
}

#[test]
fn test_planning_is_idempotent() {
    let dir = episode_dir(&[
        "Alpha Teil 2.mp3",
        "Alpha Teil 1.mp3",
        "Omega Teil 1.mp3",
        "Omega Teil 2.mp3",
        "Beta Folge 7 Teil 1.mp3",
        "Beta Folge 7 Teil 2.mp3",
    ]);
    let orch = orchestrator(similarity_config());
    let first = orch.plan(dir.path()).unwrap();
    let second = orch.plan(dir.path()).unwrap();
    assert_eq!(first, second);
    assert!(orch.concatenator().calls().is_empty());
}

#[test]
fn test_untagged_groups_get_counter_numbers() {
    let dir = episode_dir(&[
        "Alpha Teil 1.mp3",
        "Alpha Teil 2.mp3",
        "Beta Folge 7 Teil 1.mp3",
        "Beta Folge 7 Teil 2.mp3",
        "Omega Teil 1.mp3",
        "Omega Teil 2.mp3",
    ]);
    let plan = orchestrator(similarity_config()).plan(dir.path()).unwrap();
    let outputs: Vec<&str> = plan.merges().map(|m| m.name.as_str()).collect();
    // explicit tags do not consume a counter value
    assert_eq!(outputs, vec!["001_Alpha", "007_Beta", "002_Omega"]);
}

#[test]
fn test_exact_tag_untagged_bucket() {
    let dir = episode_dir(&[
        "Krimi Teil 1.mp3",
        "Krimi Teil 2.mp3",
        "Show Folge 2 Kapitel 1.mp3",
        "Show Folge 2 Kapitel 2.mp3",
    ]);
    let plan = orchestrator(MergeConfig::default()).plan(dir.path()).unwrap();
    let keys: Vec<(&GroupKey, &str)> = plan.merges().map(|m| (&m.key, m.name.as_str())).collect();
    assert_eq!(
        keys,
        vec![
            (&GroupKey::Untagged, "001_Krimi"),
            (&GroupKey::Tag(2), "002_Show"),
        ]
    );
}

#[test]
fn test_invalid_groups_skipped_and_untouched() {
    let dir = episode_dir(&[
        "Show Folge 3 Kapitel 2.mp3",
        "Show Folge 3 Kapitel 3.mp3",
        "Show Folge 4 Kapitel 1.mp3",
        "Show Folge 5 Kapitel 1.mp3",
        "Show Folge 5 Kapitel 2.mp3",
        "Show Folge 5 Kapitel 4.mp3",
    ]);
    let orch = orchestrator(MergeConfig::default());

    let plan = orch.plan(dir.path()).unwrap();
    let reasons: Vec<&ValidationFailure> = plan.skipped().map(|s| &s.reason).collect();
    assert_eq!(
        reasons,
        vec![
            &ValidationFailure::NoStart { first: 2 },
            &ValidationFailure::TooFewParts { count: 1 },
            &ValidationFailure::Gap {
                expected: 3,
                found: 4
            },
        ]
    );

    let report = orch.run(dir.path()).unwrap();
    assert_eq!(report.skipped(), 3);
    assert_eq!(report.merged(), 0);
    assert!(orch.concatenator().calls().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 6);
}

#[test]
fn test_codec_failure_only_aborts_its_group() {
    let dir = episode_dir(&[
        "Show Folge 1 Kapitel 1.mp3",
        "Show Folge 1 Kapitel 2.mp3",
        "Show Folge 2 Kapitel 1.mp3",
        "Show Folge 2 Kapitel 2.mp3",
    ]);
    let orch = MergeOrchestrator::new(
        MergeConfig::default(),
        RecordingConcatenator::failing_on(&["001_"]),
    );
    let report = orch.run(dir.path()).unwrap();

    assert_eq!(orch.concatenator().calls().len(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.merged(), 1);
    assert!(matches!(
        &report.outcomes[0],
        GroupOutcome::Failed { error, .. } if error.contains("corrupt frame")
    ));
    assert!(dir.path().join("002_Show.mp3").exists());
}

#[test]
fn test_existing_output_overwritten_by_default() {
    let dir = episode_dir(&[
        "EpA Folge 012 Kapitel 1.mp3",
        "EpA Folge 012 Kapitel 2.mp3",
        "012_EpA.mp3",
    ]);
    let orch = orchestrator(MergeConfig::default());
    let report = orch.run(dir.path()).unwrap();

    assert_eq!(report.merged(), 1);
    assert_eq!(
        std::fs::read(dir.path().join("012_EpA.mp3")).unwrap(),
        b"merged"
    );
}

#[test]
fn test_existing_output_kept_without_overwrite() {
    let dir = episode_dir(&[
        "EpA Folge 012 Kapitel 1.mp3",
        "EpA Folge 012 Kapitel 2.mp3",
        "012_EpA.mp3",
    ]);
    let mut config = MergeConfig::default();
    config.output.overwrite_existing = false;
    let orch = orchestrator(config);
    let report = orch.run(dir.path()).unwrap();

    assert!(orch.concatenator().calls().is_empty());
    assert_eq!(report.merged(), 0);
    assert!(report.outcomes.iter().any(|o| matches!(
        o,
        GroupOutcome::Skipped { group: GroupKey::Tag(12), reason } if reason.contains("already exists")
    )));
    assert!(std::fs::read(dir.path().join("012_EpA.mp3"))
        .unwrap()
        .is_empty());
}

#[test]
fn test_destination_that_is_a_source_refused() {
    let dir = episode_dir(&["001.mp3", "Teil 2.mp3"]);
    let output = dir.path().join("001.mp3");
    let plan = MergePlan {
        directory: dir.path().to_path_buf(),
        entries: vec![PlanEntry::Merge(PlannedMerge {
            key: GroupKey::Untagged,
            name: "001".to_string(),
            sources: vec![output.clone(), dir.path().join("Teil 2.mp3")],
            output,
        })],
    };
    let orch = orchestrator(MergeConfig::default());
    let mut report = RunReport::new(dir.path(), GroupingPolicy::ExactTag, false);
    orch.execute(&plan, &mut report);

    assert!(orch.concatenator().calls().is_empty());
    assert!(matches!(
        &report.outcomes[0],
        GroupOutcome::Failed { error, .. } if error.contains("one of the merge sources")
    ));
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = episode_dir(&["EpA Folge 1 Teil 1.mp3", "EpA Folge 1 Teil 2.mp3"]);
    let mut config = MergeConfig::default();
    config.output.dry_run = true;
    let orch = orchestrator(config);
    let report = orch.run(dir.path()).unwrap();

    assert!(orch.concatenator().calls().is_empty());
    assert_eq!(report.planned(), 1);
    assert!(!dir.path().join("001_EpA.mp3").exists());
    assert!(matches!(
        &report.outcomes[0],
        GroupOutcome::Planned { sources, .. } if sources.len() == 2
    ));
}

#[test]
fn test_report_written_when_configured() {
    let dir = episode_dir(&["EpA Folge 1 Teil 1.mp3", "EpA Folge 1 Teil 2.mp3"]);
    let report_dir = tempfile::tempdir().unwrap();
    let report_path = report_dir.path().join("run.json");

    let mut config = MergeConfig::default();
    config.output.report_path = Some(report_path.clone());
    orchestrator(config).run(dir.path()).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(value["outcomes"][0]["status"], "merged");
    assert_eq!(value["policy"], "exact_tag");
}

#[test]
fn test_missing_directory_fails_run() {
    let dir = tempfile::tempdir().unwrap();
    let missing: PathBuf = dir.path().join("does-not-exist");
    let orch = orchestrator(MergeConfig::default());
    assert!(matches!(
        orch.run(&missing),
        Err(MergeError::DirectoryNotFound(_))
    ));
}

#[test]
fn test_other_extensions_ignored() {
    let dir = episode_dir(&[
        "EpA Folge 1 Teil 1.mp3",
        "EpA Folge 1 Teil 2.MP3",
        "EpA Folge 1 Teil 3.txt",
    ]);
    let plan = orchestrator(MergeConfig::default()).plan(dir.path()).unwrap();
    let merge = plan.merges().next().unwrap();
    assert_eq!(merge.sources.len(), 2);
}

#[cfg(unix)]
#[test]
fn test_symlinked_last_part_completes_episode() {
    let dir = episode_dir(&["EpA Folge 12 Kapitel 1.mp3", "EpA Folge 12 Kapitel 2.mp3"]);
    let store = tempfile::tempdir().unwrap();
    let target = store.path().join("chapter3.mp3");
    std::fs::write(&target, b"").unwrap();
    std::os::unix::fs::symlink(&target, dir.path().join("EpA Folge 12 Kapitel 3.mp3")).unwrap();

    let plan = orchestrator(MergeConfig::default()).plan(dir.path()).unwrap();
    let merge = plan.merges().next().unwrap();
    assert_eq!(
        names(&merge.sources),
        vec![
            "EpA Folge 12 Kapitel 1.mp3",
            "EpA Folge 12 Kapitel 2.mp3",
            "EpA Folge 12 Kapitel 3.mp3",
        ]
    );
}

#[test]
fn test_wav_episode_merged_with_ffmpeg() {
    let dir = tempfile::tempdir().unwrap();
    write_wav(&dir.path().join("Show Folge 5 Teil 2.wav"), 22050, 1, 11025);
    write_wav(&dir.path().join("Show Folge 5 Teil 1.wav"), 22050, 1, 22050);

    let mut config = MergeConfig::default();
    config.extensions = vec!["wav".to_string()];
    let orch = MergeOrchestrator::new(config, FfmpegConcatenator::new(None));
    let report = orch.run(dir.path()).unwrap();

    let output = dir.path().join("005_Show.wav");
    assert_eq!(report.merged(), 1);
    match &report.outcomes[0] {
        GroupOutcome::Merged {
            output: written,
            parts,
            duration_secs,
            ..
        } => {
            assert_eq!(written, &output);
            assert_eq!(*parts, 2);
            assert!((duration_secs - 1.5).abs() < 1e-9);
        }
        other => panic!("expected a merge, got {:?}", other),
    }
    assert!(std::fs::metadata(&output).unwrap().len() > 0);
}
