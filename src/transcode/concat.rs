//! Audio concatenation
//!
//! Decodes every source in order, converts it to the encoder's PCM layout,
//! re-chunks through a [`SampleFifo`] and encodes one continuous stream into
//! the destination container.

use std::path::{Path, PathBuf};

use ffmpeg_next as ffmpeg;

use crate::error::{FfmpegError, MergeError, Result};
use crate::index::{probe_audio, AudioStreamInfo};

use super::decoder::AudioDecoder;
use super::encoder::{get_recommended_bitrate, AudioEncoder, EncoderSettings};
use super::fifo::SampleFifo;
use super::resampler::{needs_resampling, AudioResampler};

/// What a finished concatenation produced
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatSummary {
    pub sources: usize,
    pub samples_written: u64,
    pub duration_secs: f64,
}

/// Joins audio files into one output file.
pub trait AudioConcatenator {
    /// Concatenate `sources` in the given order into `destination`.
    fn concatenate(&self, sources: &[PathBuf], destination: &Path) -> Result<ConcatSummary>;
}

/// Re-encoding concatenator built on FFmpeg
#[derive(Debug, Clone, Default)]
pub struct FfmpegConcatenator {
    /// Output bitrate; the first source's bitrate when unset
    pub bitrate: Option<u64>,
}

impl FfmpegConcatenator {
    pub fn new(bitrate: Option<u64>) -> Self {
        Self { bitrate }
    }

    fn settings_for(&self, first: &AudioStreamInfo, global_header: bool) -> EncoderSettings {
        let bitrate = self.bitrate.unwrap_or(match first.bitrate {
            0 => get_recommended_bitrate(first.channels),
            n => n,
        });
        EncoderSettings {
            codec_id: first.codec_id,
            sample_rate: first.sample_rate,
            channels: first.channels,
            bitrate,
            global_header,
        }
    }
}

impl AudioConcatenator for FfmpegConcatenator {
    fn concatenate(&self, sources: &[PathBuf], destination: &Path) -> Result<ConcatSummary> {
        let first = sources
            .first()
            .ok_or_else(|| MergeError::Config("nothing to concatenate".to_string()))?;
        let info = probe_audio(first)?;

        let result = self.write_output(&info, sources, destination);
        if result.is_err() && destination.exists() {
            // a half-written output is worse than none
            if let Err(e) = std::fs::remove_file(destination) {
                tracing::warn!("Failed to remove partial output {:?}: {}", destination, e);
            }
        }
        result
    }
}

impl FfmpegConcatenator {
    fn write_output(
        &self,
        info: &AudioStreamInfo,
        sources: &[PathBuf],
        destination: &Path,
    ) -> Result<ConcatSummary> {
        let mut output = ffmpeg::format::output(&destination).map_err(|e| {
            FfmpegError::MuxerCreate(format!("Failed to create {:?}: {}", destination, e))
        })?;
        let global_header = output
            .format()
            .flags()
            .contains(ffmpeg::format::Flags::GLOBAL_HEADER);

        let mut encoder = AudioEncoder::open(&self.settings_for(info, global_header))?;

        {
            let mut stream = output
                .add_stream(ffmpeg::encoder::find(info.codec_id))
                .map_err(|e| FfmpegError::MuxerCreate(format!("add_stream: {}", e)))?;
            stream.set_parameters(encoder.codec_parameters());
            stream.set_time_base(encoder.time_base());
        }
        output
            .write_header()
            .map_err(|e| FfmpegError::WriteHeader(format!("{:?}: {}", destination, e)))?;

        // The muxer may pick its own timebase while writing the header
        let stream_time_base = output
            .stream(0)
            .map(|s| s.time_base())
            .unwrap_or_else(|| encoder.time_base());

        let mut sink = PacketSink {
            output: &mut output,
            encoder_time_base: encoder.time_base(),
            stream_time_base,
        };
        let mut fifo = SampleFifo::new(encoder.pcm_format());

        for source in sources {
            tracing::debug!("Decoding {:?}", source);
            decode_source(source, &mut encoder, &mut fifo, &mut sink)?;
        }

        if !fifo.is_empty() {
            tracing::debug!("Encoding {} trailing sample(s)", fifo.len());
        }
        while let Some(mut frame) = fifo.pop(encoder.frame_size()) {
            encoder.send_frame(&mut frame)?;
            sink.drain(&mut encoder)?;
        }
        encoder.send_eof()?;
        sink.drain(&mut encoder)?;

        output
            .write_trailer()
            .map_err(|e| FfmpegError::WriteTrailer(format!("{:?}: {}", destination, e)))?;

        let samples_written = encoder.samples_sent();
        Ok(ConcatSummary {
            sources: sources.len(),
            samples_written,
            duration_secs: samples_written as f64 / info.sample_rate.max(1) as f64,
        })
    }
}

/// Encoded packets on their way into the muxer
struct PacketSink<'a> {
    output: &'a mut ffmpeg::format::context::Output,
    encoder_time_base: ffmpeg::Rational,
    stream_time_base: ffmpeg::Rational,
}

impl PacketSink<'_> {
    fn drain(&mut self, encoder: &mut AudioEncoder) -> Result<()> {
        while let Some(mut packet) = encoder.receive_packet()? {
            packet.set_stream(0);
            packet.rescale_ts(self.encoder_time_base, self.stream_time_base);
            packet
                .write_interleaved(&mut *self.output)
                .map_err(|e| FfmpegError::WritePacket(e.to_string()))?;
        }
        Ok(())
    }
}

/// Decode one source file into the FIFO, encoding every full frame.
fn decode_source(
    path: &Path,
    encoder: &mut AudioEncoder,
    fifo: &mut SampleFifo,
    sink: &mut PacketSink<'_>,
) -> Result<()> {
    let mut input = ffmpeg::format::input(&path)
        .map_err(|e| FfmpegError::OpenInput(format!("Failed to open {:?}: {}", path, e)))?;
    let stream = input
        .streams()
        .best(ffmpeg::media::Type::Audio)
        .ok_or_else(|| MergeError::NoAudioStream(path.to_path_buf()))?;
    let mut decoder = AudioDecoder::open(&stream)?;
    let stream_index = decoder.stream_index();

    // created from the first decoded frame, sources may differ in layout
    let mut resampler: Option<AudioResampler> = None;

    for (stream, packet) in input.packets() {
        if stream.index() != stream_index {
            continue;
        }
        decoder.send_packet(&packet)?;
        while let Some(frame) = decoder.receive_frame()? {
            queue_frame(frame, &mut resampler, encoder, fifo, sink)?;
        }
    }

    decoder.send_eof()?;
    while let Some(frame) = decoder.receive_frame()? {
        queue_frame(frame, &mut resampler, encoder, fifo, sink)?;
    }
    if let Some(resampler) = resampler.as_mut() {
        if let Some(tail) = resampler.flush()? {
            fifo.push(&tail);
        }
    }
    encode_full_frames(encoder, fifo, sink)
}

fn queue_frame(
    frame: ffmpeg::util::frame::Audio,
    resampler: &mut Option<AudioResampler>,
    encoder: &mut AudioEncoder,
    fifo: &mut SampleFifo,
    sink: &mut PacketSink<'_>,
) -> Result<()> {
    let target = encoder.pcm_format();
    if resampler.is_none() && needs_resampling(&frame, &target) {
        tracing::debug!(
            "Resampling {}Hz {:?} to {}Hz {:?}",
            frame.rate(),
            frame.format(),
            target.rate,
            target.format
        );
        *resampler = Some(AudioResampler::new(&frame, target)?);
    }

    match resampler.as_mut() {
        Some(resampler) => {
            if let Some(converted) = resampler.convert(&frame)? {
                fifo.push(&converted);
            }
        }
        None => fifo.push(&frame),
    }
    encode_full_frames(encoder, fifo, sink)
}

fn encode_full_frames(
    encoder: &mut AudioEncoder,
    fifo: &mut SampleFifo,
    sink: &mut PacketSink<'_>,
) -> Result<()> {
    let frame_size = encoder.frame_size();
    while fifo.len() >= frame_size {
        if let Some(mut frame) = fifo.pop(frame_size) {
            encoder.send_frame(&mut frame)?;
            sink.drain(encoder)?;
        }
    }
    Ok(())
}
