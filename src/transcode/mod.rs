//! Audio transcoding module
//!
//! - Audio decoder initialization from source streams
//! - Resampling to the encoder's PCM layout
//! - Re-chunking to the encoder frame size
//! - Encoding and muxing the concatenated stream

pub mod concat;
pub mod decoder;
pub mod encoder;
pub mod fifo;
pub mod resampler;

pub use concat::{AudioConcatenator, ConcatSummary, FfmpegConcatenator};
