//! Test fixtures for integration tests
//!
//! Episode directories are filled with empty files: planning only looks at
//! names, and the recording concatenator never opens its sources. Tests that
//! run FFmpeg get real 16-bit PCM WAV files from [`write_wav`].

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{FfmpegError, MergeError, Result};
use crate::transcode::{AudioConcatenator, ConcatSummary};

/// A temporary directory holding empty files with the given names
pub fn episode_dir(names: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for name in names {
        std::fs::write(dir.path().join(name), b"").expect("create fixture file");
    }
    dir
}

/// Write a 16-bit PCM WAV file holding `frames` samples per channel of a
/// quiet sawtooth.
pub fn write_wav(path: &Path, sample_rate: u32, channels: u16, frames: u32) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav fixture");
    for i in 0..frames {
        let sample = ((i % 200) as i16 - 100) * 40;
        for _ in 0..channels {
            writer.write_sample(sample).expect("write wav sample");
        }
    }
    writer.finalize().expect("finalize wav fixture");
}

/// One `concatenate` call as seen by [`RecordingConcatenator`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatCall {
    pub sources: Vec<PathBuf>,
    pub destination: PathBuf,
}

/// Records calls and writes a marker file instead of audio.
///
/// Destinations whose file name contains one of `fail_on` fail with a codec
/// error, which lets a test break a single group.
#[derive(Debug, Default)]
pub struct RecordingConcatenator {
    pub calls: RefCell<Vec<ConcatCall>>,
    pub fail_on: Vec<String>,
}

impl RecordingConcatenator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            fail_on: names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<ConcatCall> {
        self.calls.borrow().clone()
    }
}

impl AudioConcatenator for RecordingConcatenator {
    fn concatenate(&self, sources: &[PathBuf], destination: &Path) -> Result<ConcatSummary> {
        self.calls.borrow_mut().push(ConcatCall {
            sources: sources.to_vec(),
            destination: destination.to_path_buf(),
        });

        let file_name = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.fail_on.iter().any(|f| file_name.contains(f.as_str())) {
            return Err(MergeError::Ffmpeg(FfmpegError::DecodePacket(format!(
                "corrupt frame in {}",
                file_name
            ))));
        }

        std::fs::write(destination, b"merged")?;
        Ok(ConcatSummary {
            sources: sources.len(),
            samples_written: 0,
            duration_secs: 0.0,
        })
    }
}

/// File names of a list of paths
pub fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect()
}
