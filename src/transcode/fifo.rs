//! PCM sample FIFO
//!
//! Decoders hand out frames of whatever size the source codec uses, while
//! most encoders demand a fixed number of samples per frame. The FIFO
//! collects resampled audio across file boundaries and hands it back in
//! encoder-sized frames.

use ffmpeg_next as ffmpeg;

use crate::ffmpeg::helpers::{
    audio_plane_data, audio_plane_data_mut, layout_channels, plane_count, plane_sample_bytes,
};

use super::resampler::PcmFormat;

/// Byte-level sample queue, one buffer per data plane
pub struct SampleFifo {
    pcm: PcmFormat,
    planes: Vec<Vec<u8>>,
    sample_bytes: usize,
}

impl SampleFifo {
    pub fn new(pcm: PcmFormat) -> Self {
        let channels = layout_channels(pcm.layout);
        Self {
            pcm,
            planes: vec![Vec::new(); plane_count(pcm.format, channels)],
            sample_bytes: plane_sample_bytes(pcm.format, channels),
        }
    }

    /// Queued samples per channel
    pub fn len(&self) -> usize {
        self.planes
            .first()
            .map(|p| p.len() / self.sample_bytes.max(1))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a frame. The frame must already be in the FIFO's format.
    pub fn push(&mut self, frame: &ffmpeg::util::frame::Audio) {
        let bytes = frame.samples() * self.sample_bytes;
        for (index, plane) in self.planes.iter_mut().enumerate() {
            let data = audio_plane_data(frame, index);
            plane.extend_from_slice(&data[..bytes.min(data.len())]);
        }
    }

    /// Take up to `samples` samples as a new frame, or `None` if empty.
    pub fn pop(&mut self, samples: usize) -> Option<ffmpeg::util::frame::Audio> {
        let n = samples.min(self.len());
        if n == 0 {
            return None;
        }
        let bytes = n * self.sample_bytes;

        let mut frame = ffmpeg::util::frame::Audio::new(self.pcm.format, n, self.pcm.layout);
        frame.set_rate(self.pcm.rate);
        for (index, plane) in self.planes.iter_mut().enumerate() {
            let out = audio_plane_data_mut(&mut frame, index);
            out[..bytes].copy_from_slice(&plane[..bytes]);
            plane.drain(..bytes);
        }
        Some(frame)
    }
}
