//! Audio decoder for the merge pipeline
//!
//! Wraps an FFmpeg `AVCodecContext` to decode compressed audio packets
//! (MP3, AAC, Opus, FLAC, …) into raw PCM `AVFrame`s.

use crate::error::{FfmpegError, MergeError, Result};
use ffmpeg_next as ffmpeg;

/// Audio decoder backed by an FFmpeg codec context
pub struct AudioDecoder {
    decoder: ffmpeg::decoder::Audio,
    /// Stream index in the source file
    stream_index: usize,
}

impl AudioDecoder {
    /// Open a decoder for the given stream, configured from the stream's own
    /// codec parameters.
    pub fn open(stream: &ffmpeg::format::stream::Stream) -> Result<Self> {
        let stream_index = stream.index();
        let context =
            ffmpeg::codec::Context::from_parameters(stream.parameters()).map_err(|e| {
                MergeError::Ffmpeg(FfmpegError::DecoderCreate(format!(
                    "Failed to create codec context for stream {}: {}",
                    stream_index, e
                )))
            })?;

        let decoder = context.decoder().audio().map_err(|e| {
            MergeError::Ffmpeg(FfmpegError::DecoderCreate(format!(
                "Failed to open audio decoder for stream {}: {}",
                stream_index, e
            )))
        })?;

        Ok(Self {
            decoder,
            stream_index,
        })
    }

    /// Send a compressed packet to the decoder.
    ///
    /// Every decode error is fatal, corrupt data included: a merge with a
    /// silently dropped stretch of audio is worse than no merge.
    pub fn send_packet(&mut self, packet: &ffmpeg::codec::packet::Packet) -> Result<()> {
        self.decoder.send_packet(packet).map_err(|e| {
            MergeError::Ffmpeg(FfmpegError::DecodePacket(format!(
                "send_packet error on stream {}: {}",
                self.stream_index, e
            )))
        })
    }

    /// Send EOF to flush the decoder's internal buffers.
    ///
    /// EAGAIN and EOF responses mean the decoder is already drained.
    pub fn send_eof(&mut self) -> Result<()> {
        match self.decoder.send_eof() {
            Ok(()) => Ok(()),
            Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::error::EAGAIN => Ok(()),
            Err(ffmpeg::Error::Eof) => Ok(()),
            Err(e) => Err(MergeError::Ffmpeg(FfmpegError::DecodePacket(format!(
                "send_eof error on stream {}: {}",
                self.stream_index, e
            )))),
        }
    }

    /// Receive one decoded PCM frame, or `None` if the decoder needs more
    /// input.
    pub fn receive_frame(&mut self) -> Result<Option<ffmpeg::util::frame::Audio>> {
        let mut frame = ffmpeg::util::frame::Audio::empty();
        match self.decoder.receive_frame(&mut frame) {
            Ok(()) => Ok(Some(frame)),
            Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::error::EAGAIN => Ok(None),
            Err(ffmpeg::Error::Eof) => Ok(None),
            Err(e) => Err(MergeError::Ffmpeg(FfmpegError::DecodePacket(format!(
                "receive_frame error on stream {}: {}",
                self.stream_index, e
            )))),
        }
    }

    /// The source stream index.
    pub fn stream_index(&self) -> usize {
        self.stream_index
    }
}
