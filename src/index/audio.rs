//! Audio stream probing

use std::path::Path;

use ffmpeg_next as ffmpeg;

use crate::error::{FfmpegError, MergeError, Result};
use crate::ffmpeg::helpers::{codec_params_bit_rate, codec_params_channels, codec_params_sample_rate};

/// Properties of the primary audio stream of a file
#[derive(Debug, Clone, PartialEq)]
pub struct AudioStreamInfo {
    pub codec_id: ffmpeg::codec::Id,
    pub sample_rate: u32,
    pub channels: u16,
    /// 0 when the container does not declare one
    pub bitrate: u64,
    /// Container duration, 0.0 when unknown
    pub duration_secs: f64,
}

/// Open `path` and describe its best audio stream.
pub fn probe_audio<P: AsRef<Path>>(path: P) -> Result<AudioStreamInfo> {
    let path = path.as_ref();
    let input = ffmpeg::format::input(&path)
        .map_err(|e| FfmpegError::OpenInput(format!("Failed to open {:?}: {}", path, e)))?;

    let stream = input
        .streams()
        .best(ffmpeg::media::Type::Audio)
        .ok_or_else(|| MergeError::NoAudioStream(path.to_path_buf()))?;

    let mut info = analyze_audio_stream(&stream);
    if input.duration() > 0 {
        info.duration_secs = input.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
    }
    tracing::debug!(
        "Found audio stream in {:?}: {}Hz, {} channels, codec={:?}, {:.2}s",
        path,
        info.sample_rate,
        info.channels,
        info.codec_id,
        info.duration_secs
    );
    Ok(info)
}

/// Extract stream metadata from the codec parameters
pub fn analyze_audio_stream(stream: &ffmpeg::Stream) -> AudioStreamInfo {
    let params = stream.parameters();
    AudioStreamInfo {
        codec_id: params.id(),
        sample_rate: codec_params_sample_rate(&params),
        channels: codec_params_channels(&params),
        bitrate: codec_params_bit_rate(&params),
        duration_secs: 0.0,
    }
}
