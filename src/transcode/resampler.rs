//! Audio resampler for the merge pipeline
//!
//! Converts decoded PCM frames of any source into the sample format, channel
//! layout and rate the output encoder was opened with. Sources of one episode
//! usually share a format, but nothing guarantees it.

use crate::error::{FfmpegError, MergeError, Result};
use crate::ffmpeg::helpers::frame_channel_layout;
use ffmpeg_next as ffmpeg;
use ffmpeg_next::software::resampling;
use ffmpeg_next::util::channel_layout::ChannelLayout;
use ffmpeg_next::util::format::sample::Sample;

/// Target PCM layout expected by the encoder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PcmFormat {
    pub format: Sample,
    pub layout: ChannelLayout,
    pub rate: u32,
}

/// Audio resampler wrapping FFmpeg's `SwrContext`
pub struct AudioResampler {
    context: resampling::Context,
    target: PcmFormat,
}

impl AudioResampler {
    /// Create a resampler converting frames shaped like `src_frame` into
    /// `target`.
    pub fn new(src_frame: &ffmpeg::util::frame::Audio, target: PcmFormat) -> Result<Self> {
        let context = resampling::Context::get(
            src_frame.format(),
            frame_channel_layout(src_frame),
            src_frame.rate(),
            target.format,
            target.layout,
            target.rate,
        )
        .map_err(|e| {
            MergeError::Ffmpeg(FfmpegError::ResamplerCreate(format!(
                "Failed to create resampling context: {}",
                e
            )))
        })?;

        Ok(Self { context, target })
    }

    /// Convert one input PCM frame.
    ///
    /// Returns `None` when the resampler buffered the input without producing
    /// output yet.
    pub fn convert(
        &mut self,
        frame: &ffmpeg::util::frame::Audio,
    ) -> Result<Option<ffmpeg::util::frame::Audio>> {
        // Output frame must be empty, swr_convert_frame allocates it from the
        // SwrContext configuration.
        let mut out = ffmpeg::util::frame::Audio::empty();

        self.context.run(frame, &mut out).map_err(|e| {
            MergeError::Ffmpeg(FfmpegError::Resample(format!("Resampling error: {}", e)))
        })?;

        if out.samples() == 0 {
            return Ok(None);
        }
        Ok(Some(out))
    }

    /// Flush any remaining samples from the internal resampler buffer.
    ///
    /// A passthrough context has nothing buffered and reports an error on
    /// flush; that is not a failure.
    pub fn flush(&mut self) -> Result<Option<ffmpeg::util::frame::Audio>> {
        let mut out = ffmpeg::util::frame::Audio::empty();
        if let Err(e) = self.context.flush(&mut out) {
            tracing::debug!("Resampler flush returned non-fatal error: {}", e);
            return Ok(None);
        }

        if out.samples() == 0 {
            return Ok(None);
        }
        Ok(Some(out))
    }
}

/// Whether a decoded frame already matches `target`.
pub fn needs_resampling(frame: &ffmpeg::util::frame::Audio, target: &PcmFormat) -> bool {
    frame.rate() != target.rate
        || frame.format() != target.format
        || frame_channel_layout(frame) != target.layout
}
