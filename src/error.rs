use std::path::PathBuf;

use thiserror::Error;

use crate::sequence::ValidationFailure;

/// Main error type for episode merging
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("FFmpeg error: {0}")]
    Ffmpeg(#[from] FfmpegError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Group {group}: {reason}")]
    Validation {
        group: String,
        reason: ValidationFailure,
    },

    #[error("No audio stream found in {}", .0.display())]
    NoAudioStream(PathBuf),

    #[error("Destination {} is one of the merge sources", .0.display())]
    DestinationIsSource(PathBuf),

    #[error("Report error: {0}")]
    Report(String),
}

/// FFmpeg-specific errors
#[derive(Error, Debug)]
pub enum FfmpegError {
    #[error("FFmpeg initialization failed: {0}")]
    InitFailed(String),

    #[error("Failed to open input file: {0}")]
    OpenInput(String),

    #[error("Failed to create decoder: {0}")]
    DecoderCreate(String),

    #[error("Failed to find encoder: {0}")]
    EncoderNotFound(String),

    #[error("Failed to create encoder: {0}")]
    EncoderCreate(String),

    #[error("Failed to create resampler: {0}")]
    ResamplerCreate(String),

    #[error("Failed to create muxer: {0}")]
    MuxerCreate(String),

    #[error("Failed to write header: {0}")]
    WriteHeader(String),

    #[error("Failed to write packet: {0}")]
    WritePacket(String),

    #[error("Failed to write trailer: {0}")]
    WriteTrailer(String),

    #[error("Failed to decode packet: {0}")]
    DecodePacket(String),

    #[error("Failed to encode frame: {0}")]
    EncodeFrame(String),

    #[error("Failed to resample frame: {0}")]
    Resample(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, MergeError>;
