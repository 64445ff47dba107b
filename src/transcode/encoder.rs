//! Audio encoder for the merge pipeline
//!
//! Wraps an FFmpeg `AVCodecContext` that re-encodes the concatenated PCM
//! stream with the codec of the source files (MP3 for the usual episode
//! collections).

use crate::error::{FfmpegError, MergeError, Result};
use crate::ffmpeg::helpers::default_channel_layout;
use ffmpeg_next as ffmpeg;
use ffmpeg_next::codec;
use ffmpeg_next::util::format::sample::{Sample, Type};

use super::resampler::PcmFormat;

/// Chunk size used when the codec accepts frames of any size
pub const DEFAULT_FRAME_SIZE: usize = 1152;

/// Encoder settings derived from the first source file
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderSettings {
    pub codec_id: codec::Id,
    pub sample_rate: u32,
    pub channels: u16,
    pub bitrate: u64,
    /// The output container wants codec extradata in the stream header
    pub global_header: bool,
}

/// Audio encoder backed by an FFmpeg codec context
pub struct AudioEncoder {
    encoder: codec::encoder::audio::Encoder,
    pcm: PcmFormat,
    frame_size: usize,
    time_base: ffmpeg::Rational,
    pts: i64,
}

impl AudioEncoder {
    /// Open an encoder for `settings`.
    pub fn open(settings: &EncoderSettings) -> Result<Self> {
        let codec = codec::encoder::find(settings.codec_id).ok_or_else(|| {
            MergeError::Ffmpeg(FfmpegError::EncoderNotFound(format!(
                "no encoder for {:?} in this FFmpeg build",
                settings.codec_id
            )))
        })?;

        let format = codec
            .audio()
            .ok()
            .and_then(|audio| audio.formats().and_then(pick_sample_format))
            .unwrap_or(Sample::F32(Type::Planar));
        let layout = default_channel_layout(settings.channels);
        let time_base = ffmpeg::Rational::new(1, settings.sample_rate as i32);

        // Configure the context BEFORE opening
        let mut context = codec::Context::new_with_codec(codec);
        context.set_time_base(time_base);

        let mut audio_enc = context.encoder().audio().map_err(|e| {
            MergeError::Ffmpeg(FfmpegError::EncoderCreate(format!(
                "Cannot get audio encoder handle: {}",
                e
            )))
        })?;

        audio_enc.set_rate(settings.sample_rate as i32);
        audio_enc.set_format(format);
        audio_enc.set_channel_layout(layout);
        audio_enc.set_bit_rate(settings.bitrate as usize);
        if settings.global_header {
            audio_enc.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let encoder = audio_enc.open_as(codec).map_err(|e| {
            MergeError::Ffmpeg(FfmpegError::EncoderCreate(format!(
                "Failed to open {:?} encoder: {}",
                settings.codec_id, e
            )))
        })?;

        let frame_size = match encoder.frame_size() as usize {
            0 => DEFAULT_FRAME_SIZE,
            n => n,
        };

        tracing::debug!(
            codec = ?settings.codec_id,
            sample_rate = settings.sample_rate,
            channels = settings.channels,
            bitrate = settings.bitrate,
            ?format,
            frame_size,
            "encoder opened"
        );

        Ok(Self {
            encoder,
            pcm: PcmFormat {
                format,
                layout,
                rate: settings.sample_rate,
            },
            frame_size,
            time_base,
            pts: 0,
        })
    }

    /// Send one PCM frame. Timestamps are assigned here from the running
    /// sample count so the concatenated stream is continuous.
    pub fn send_frame(&mut self, frame: &mut ffmpeg::util::frame::Audio) -> Result<()> {
        frame.set_pts(Some(self.pts));
        self.pts += frame.samples() as i64;
        self.encoder.send_frame(frame).map_err(|e| {
            MergeError::Ffmpeg(FfmpegError::EncodeFrame(format!(
                "send_frame error: {}",
                e
            )))
        })
    }

    /// Send EOF to flush the encoder's buffered output.
    pub fn send_eof(&mut self) -> Result<()> {
        self.encoder.send_eof().map_err(|e| {
            MergeError::Ffmpeg(FfmpegError::EncodeFrame(format!("send_eof error: {}", e)))
        })
    }

    /// Receive one encoded packet, or `None` if the encoder needs more input.
    pub fn receive_packet(&mut self) -> Result<Option<ffmpeg::codec::packet::Packet>> {
        let mut packet = ffmpeg::codec::packet::Packet::empty();
        match self.encoder.receive_packet(&mut packet) {
            Ok(()) => Ok(Some(packet)),
            Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::error::EAGAIN => Ok(None),
            Err(ffmpeg::Error::Eof) => Ok(None),
            Err(e) => Err(MergeError::Ffmpeg(FfmpegError::EncodeFrame(format!(
                "receive_packet error: {}",
                e
            )))),
        }
    }

    /// PCM layout frames must have before `send_frame`.
    pub fn pcm_format(&self) -> PcmFormat {
        self.pcm
    }

    /// Samples per channel the encoder expects per frame.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// The encoder timebase (1 / sample_rate).
    pub fn time_base(&self) -> ffmpeg::Rational {
        self.time_base
    }

    /// Samples sent so far.
    pub fn samples_sent(&self) -> u64 {
        self.pts as u64
    }

    /// Codec parameters for the output stream.
    pub fn codec_parameters(&self) -> ffmpeg::codec::Parameters {
        let context: &ffmpeg::codec::Context = &self.encoder;
        ffmpeg::codec::Parameters::from(context)
    }
}

/// Prefer planar float, which every resampler path supports losslessly;
/// otherwise take the codec's first supported format.
fn pick_sample_format(formats: impl Iterator<Item = Sample>) -> Option<Sample> {
    let formats: Vec<Sample> = formats.collect();
    if formats.contains(&Sample::F32(Type::Planar)) {
        return Some(Sample::F32(Type::Planar));
    }
    formats.first().copied()
}

/// Bitrate to use when neither the configuration nor the source specifies
/// one.
pub fn get_recommended_bitrate(channels: u16) -> u64 {
    match channels {
        1 => 64_000,
        2 => 128_000,
        6 => 384_000,
        _ => 128_000,
    }
}
